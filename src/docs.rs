use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::file_handlers::FileForm;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::file_handlers::upload_file,
        crate::handlers::file_handlers::update_file,
        crate::handlers::file_handlers::delete_file,
        crate::handlers::file_handlers::get_file,
        crate::handlers::file_handlers::get_image,
    ),
    components(schemas(FileForm)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Files", description = "Upload, replace, delete and fetch stored files")
    ),
    info(
        title = "File Store API",
        version = "0.1.0",
        description = "Single-node file storage over HTTP. Reads are public; writes require the admin identity."
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            )
        }
    }
}
