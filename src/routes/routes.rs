//! Defines routes for the file operations and composes the full application.
//!
//! ## Structure
//! - `POST   /files/uploadFile`                (admin)
//! - `PUT    /files/updateFile/{filename}`     (admin)
//! - `DELETE /files/deleteFile/{filename}`     (admin)
//! - `GET    /files/getFileByName/{filename}`  (public, attachment)
//! - `GET    /files/getImageSrc/{filename}`    (public, inline)
//! - `GET    /swagger-ui`, `/v3/api-docs/openapi.json` (authenticated)
//!
//! Access control wraps everything, including the fallback, so unknown paths
//! demand credentials before they answer 404.

use crate::{
    docs::ApiDoc,
    handlers::file_handlers::{delete_file, get_file, get_image, update_file, upload_file},
    middleware::access_control::require_access,
    services::{file_service::FileService, identity_service::IdentityRegistry},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the router for the file routes.
///
/// The router carries the shared `FileService` to all handlers.
pub fn routes() -> Router<FileService> {
    Router::new()
        .route("/files/uploadFile", post(upload_file))
        .route("/files/updateFile/{filename}", put(update_file))
        .route("/files/deleteFile/{filename}", delete(delete_file))
        .route("/files/getFileByName/{filename}", get(get_file))
        .route("/files/getImageSrc/{filename}", get(get_image))
}

/// Compose file routes, API docs, body limit, access control and tracing.
pub fn app(
    service: FileService,
    registry: Arc<IdentityRegistry>,
    max_upload_bytes: usize,
) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/v3/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(routes().with_state(service))
        .fallback(|| async { (StatusCode::NOT_FOUND, "Not found") })
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn_with_state(registry, require_access))
        .layer(TraceLayer::new_for_http())
}
