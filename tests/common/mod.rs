#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use file_store::{
    app,
    models::access::Role,
    services::{
        file_service::FileService,
        identity_service::{Identity, IdentityRegistry},
    },
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin-pw";
pub const VIEWER_USER: &str = "viewer";
pub const VIEWER_PASS: &str = "viewer-pw";

/// Body cap used by the test app (1 MiB).
pub const TEST_MAX_UPLOAD: usize = 1024 * 1024;

pub const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
    b'R', 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
];
pub const PDF: &[u8] = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj\n<< >>\nendobj\n";

const BOUNDARY: &str = "------------------------file-store-test";

/// Application wired against a throwaway storage root.
pub struct TestApp {
    pub router: Router,
    pub dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let registry = IdentityRegistry::new(
            vec![
                Identity::new(ADMIN_USER, ADMIN_PASS, Role::Admin, 4).unwrap(),
                Identity::new(VIEWER_USER, VIEWER_PASS, Role::User, 4).unwrap(),
            ],
            4,
        )
        .unwrap();
        let router = app(
            FileService::new(dir.path()),
            Arc::new(registry),
            TEST_MAX_UPLOAD,
        );
        Self { router, dir }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Put a file straight onto disk, bypassing the HTTP surface.
    pub fn seed(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.dir.path().join(name), bytes).unwrap();
    }

    pub fn on_disk(&self, name: &str) -> Option<Vec<u8>> {
        std::fs::read(self.dir.path().join(name)).ok()
    }
}

pub fn basic(user: &str, pass: &str) -> String {
    format!(
        "Basic {}",
        general_purpose::STANDARD.encode(format!("{}:{}", user, pass))
    )
}

pub fn admin() -> Option<String> {
    Some(basic(ADMIN_USER, ADMIN_PASS))
}

/// Encode a single multipart field.
pub fn multipart(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                field, name
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).as_bytes(),
        ),
    }
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(
    method: &str,
    uri: &str,
    body: Vec<u8>,
    auth: Option<String>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn upload(name: &str, content: &[u8], auth: Option<String>) -> Request<Body> {
    multipart_request(
        "POST",
        "/files/uploadFile",
        multipart("file", Some(name), content),
        auth,
    )
}

pub fn update(name: &str, content: &[u8], auth: Option<String>) -> Request<Body> {
    multipart_request(
        "PUT",
        &format!("/files/updateFile/{}", name),
        multipart("file", Some(name), content),
        auth,
    )
}

pub fn bare(method: &str, uri: &str, auth: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).unwrap()
}
