//! Access-control layer applied in front of the whole router.
//!
//! Each request is evaluated against [`crate::routes::policy`] on its own
//! credentials. Rejected requests are answered here; the inner service never
//! sees them.

use crate::{
    errors::AppError,
    models::access::Capability,
    routes::policy::{Decision, authorize, required_capability},
    services::identity_service::IdentityRegistry,
};
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

pub const BASIC_REALM: &str = r#"Basic realm="file-store""#;

/// Gate a request on the policy table.
///
/// ```rust,ignore
/// let app = Router::new()
///     .merge(file_routes)
///     .layer(middleware::from_fn_with_state(registry.clone(), require_access));
/// ```
pub async fn require_access(
    State(registry): State<Arc<IdentityRegistry>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let decision = if required_capability(&method, &path) == Capability::Public {
        Decision::Allow
    } else {
        // bcrypt verification is CPU bound, keep it off the async workers
        let authorization = req.headers().get(header::AUTHORIZATION).cloned();
        let (method, path) = (method.clone(), path.clone());
        match tokio::task::spawn_blocking(move || {
            authorize(&registry, &method, &path, authorization.as_ref())
        })
        .await
        {
            Ok(decision) => decision,
            Err(err) => {
                return AppError::internal(format!("authorization task failed: {}", err))
                    .into_response();
            }
        }
    };

    match decision {
        Decision::Allow => {
            debug!("access allowed: {} {}", method, path);
            next.run(req).await
        }
        Decision::RejectUnauthenticated => {
            warn!("unauthenticated request rejected: {} {}", method, path);
            unauthorized()
        }
        Decision::RejectForbidden => {
            warn!("forbidden request rejected: {} {}", method, path);
            (StatusCode::FORBIDDEN, "Forbidden").into_response()
        }
    }
}

fn unauthorized() -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(BASIC_REALM),
    );
    response
}
