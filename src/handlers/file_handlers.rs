//! HTTP handlers for the file operations.
//! Each handler translates a request into one `FileService` call and the
//! result into a plain-text or binary response.

use crate::{
    errors::AppError,
    services::file_service::{FileService, is_supported_image, upload_filename},
};
use axum::{
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use bytes::Bytes;
use tokio_util::io::ReaderStream;
use tracing::warn;
use utoipa::ToSchema;

/// Multipart field carrying the payload on upload and update.
pub const FILE_FIELD: &str = "file";

/// Multipart form accepted by upload and update.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct FileForm {
    /// The file to store.
    #[schema(content_media_type = "application/octet-stream")]
    file: Vec<u8>,
}

/// The `file` part of a multipart request.
struct FilePart {
    filename: Option<String>,
    bytes: Bytes,
}

/// Upload a new file; its name comes from the multipart part.
#[utoipa::path(
    post,
    path = "/files/uploadFile",
    request_body(content = FileForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded successfully", body = String),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Admin role required"),
        (status = 500, description = "Internal server error")
    ),
    security(("basic_auth" = [])),
    tag = "Files"
)]
pub async fn upload_file(
    State(service): State<FileService>,
    multipart: Multipart,
) -> Result<String, AppError> {
    let part = read_file_part(multipart).await?;
    let raw_name = part
        .filename
        .ok_or_else(|| AppError::bad_request("Missing file name"))?;

    let stored = service
        .save(upload_filename(&raw_name), &part.bytes)
        .await?;
    Ok(format!("File uploaded successfully: {}", stored))
}

/// Replace the content of an existing file.
#[utoipa::path(
    put,
    path = "/files/updateFile/{filename}",
    params(("filename" = String, Path, description = "Name of the file to replace")),
    request_body(content = FileForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File updated successfully", body = String),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("basic_auth" = [])),
    tag = "Files"
)]
pub async fn update_file(
    State(service): State<FileService>,
    Path(filename): Path<String>,
    multipart: Multipart,
) -> Result<String, AppError> {
    let part = read_file_part(multipart).await?;
    service.overwrite(&filename, &part.bytes).await?;
    Ok(format!("File updated successfully: {}", filename))
}

/// Delete a file.
#[utoipa::path(
    delete,
    path = "/files/deleteFile/{filename}",
    params(("filename" = String, Path, description = "Name of the file to delete")),
    responses(
        (status = 200, description = "File deleted successfully", body = String),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("basic_auth" = [])),
    tag = "Files"
)]
pub async fn delete_file(
    State(service): State<FileService>,
    Path(filename): Path<String>,
) -> Result<String, AppError> {
    service.delete(&filename).await?;
    Ok(format!("File deleted successfully: {}", filename))
}

/// Download a file as an attachment. Streams the body from disk.
#[utoipa::path(
    get,
    path = "/files/getFileByName/{filename}",
    params(("filename" = String, Path, description = "Name of the file to download")),
    responses(
        (status = 200, description = "File retrieved successfully"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Files"
)]
pub async fn get_file(
    State(service): State<FileService>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let (file, len) = service.open(&filename).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    set_content_disposition(headers, "attachment", &filename);

    Ok(response)
}

/// Serve a stored image inline, for use as an `<img src>`.
///
/// Only allow-listed image types are served; anything else is 415 so that
/// arbitrary content is never rendered inline by a browser.
#[utoipa::path(
    get,
    path = "/files/getImageSrc/{filename}",
    params(("filename" = String, Path, description = "Name of the image")),
    responses(
        (status = 200, description = "Image retrieved successfully"),
        (status = 404, description = "Image not found"),
        (status = 415, description = "Unsupported media type"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Files"
)]
pub async fn get_image(
    State(service): State<FileService>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let stored = service.load(&filename).await?;
    if !is_supported_image(&stored.media_type) {
        warn!(
            "refusing to serve {} inline as {}",
            stored.filename, stored.media_type
        );
        return Err(AppError::unsupported_media_type(format!(
            "Unsupported media type: {}",
            stored.media_type
        )));
    }

    let content_type = HeaderValue::from_str(&stored.media_type)
        .map_err(|err| AppError::internal(err.to_string()))?;
    let mut response = Response::new(Body::from(stored.bytes));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    set_content_disposition(headers, "inline", &stored.filename);

    Ok(response)
}

/// Pull the `file` field out of a multipart body, skipping any other fields.
async fn read_file_part(mut multipart: Multipart) -> Result<FilePart, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Err(AppError::bad_request("File is empty"));
        }
        return Ok(FilePart { filename, bytes });
    }

    Err(AppError::bad_request("Missing multipart field `file`"))
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::new(err.status(), err.body_text())
}

fn set_content_disposition(headers: &mut HeaderMap, disposition: &str, filename: &str) {
    let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
    let value = HeaderValue::from_str(&format!("{}; filename=\"{}\"", disposition, escaped))
        .unwrap_or_else(|_| {
            HeaderValue::from_str(disposition).unwrap_or(HeaderValue::from_static("attachment"))
        });
    headers.insert(header::CONTENT_DISPOSITION, value);
}
