//! Authorization policy for every route the service answers.
//!
//! ## Table (first match wins)
//! - `GET    /files/getFileByName/**` -> public
//! - `GET    /files/getImageSrc/**`   -> public
//! - `DELETE /files/deleteFile/**`    -> admin
//! - `PUT    /files/updateFile/**`    -> admin
//! - `POST   /files/uploadFile/**`    -> admin
//! - anything else (docs, unknown paths, other methods) -> authenticated
//!
//! Every request is judged on its own `Authorization: Basic` header; no
//! session or cookie is ever consulted.

use crate::{models::access::Capability, services::identity_service::IdentityRegistry};
use axum::http::{HeaderValue, Method};
use base64::{Engine as _, engine::general_purpose};
use std::fmt;

/// One row of the policy table.
#[derive(Debug)]
pub struct PolicyRule {
    pub method: Method,
    /// Matches the path itself or anything beneath it.
    pub pattern: &'static str,
    pub capability: Capability,
}

pub static POLICY: [PolicyRule; 5] = [
    PolicyRule {
        method: Method::GET,
        pattern: "/files/getFileByName",
        capability: Capability::Public,
    },
    PolicyRule {
        method: Method::GET,
        pattern: "/files/getImageSrc",
        capability: Capability::Public,
    },
    PolicyRule {
        method: Method::DELETE,
        pattern: "/files/deleteFile",
        capability: Capability::Admin,
    },
    PolicyRule {
        method: Method::PUT,
        pattern: "/files/updateFile",
        capability: Capability::Admin,
    },
    PolicyRule {
        method: Method::POST,
        pattern: "/files/uploadFile",
        capability: Capability::Admin,
    },
];

/// Applies when no rule in [`POLICY`] matches.
pub const DEFAULT_CAPABILITY: Capability = Capability::Authenticated;

/// Outcome of evaluating a request against the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Missing, malformed or wrong credentials.
    RejectUnauthenticated,
    /// Valid credentials without the required role.
    RejectForbidden,
}

impl PolicyRule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        // HEAD is answered by GET routes, so it shares their policy.
        let method_ok = self.method == *method
            || (self.method == Method::GET && *method == Method::HEAD);

        method_ok
            && path
                .strip_prefix(self.pattern)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// Capability demanded by `method path`.
pub fn required_capability(method: &Method, path: &str) -> Capability {
    POLICY
        .iter()
        .find(|rule| rule.matches(method, path))
        .map(|rule| rule.capability)
        .unwrap_or(DEFAULT_CAPABILITY)
}

/// Username/password pair taken from an HTTP Basic header.
#[derive(PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Parse `Basic base64(username:password)`.
    ///
    /// Returns None for any other scheme, bad base64, non UTF-8 content or a
    /// missing `:` separator.
    pub fn from_basic_header(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decide whether a request may reach its handler.
///
/// Public routes never look at the header, so a broken header there is
/// ignored. Runs bcrypt for non-public routes; call from a blocking context.
pub fn authorize(
    registry: &IdentityRegistry,
    method: &Method,
    path: &str,
    authorization: Option<&HeaderValue>,
) -> Decision {
    let required = required_capability(method, path);
    if required == Capability::Public {
        return Decision::Allow;
    }

    let credentials = authorization
        .and_then(|value| value.to_str().ok())
        .and_then(Credentials::from_basic_header);
    let Some(credentials) = credentials else {
        return Decision::RejectUnauthenticated;
    };

    match registry.verify(&credentials.username, &credentials.password) {
        None => Decision::RejectUnauthenticated,
        Some(role) if role.grants(required) => Decision::Allow,
        Some(_) => Decision::RejectForbidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::access::Role, services::identity_service::Identity};

    fn basic(user: &str, pass: &str) -> HeaderValue {
        let token = general_purpose::STANDARD.encode(format!("{}:{}", user, pass));
        HeaderValue::from_str(&format!("Basic {}", token)).unwrap()
    }

    fn registry() -> IdentityRegistry {
        IdentityRegistry::new(
            vec![
                Identity::new("admin", "admin-pw", Role::Admin, 4).unwrap(),
                Identity::new("viewer", "viewer-pw", Role::User, 4).unwrap(),
            ],
            4,
        )
        .unwrap()
    }

    #[test]
    fn test_capability_table() {
        use Capability::*;
        let cases = [
            (Method::GET, "/files/getFileByName/a.txt", Public),
            (Method::HEAD, "/files/getFileByName/a.txt", Public),
            (Method::GET, "/files/getImageSrc/logo.png", Public),
            (Method::DELETE, "/files/deleteFile/a.txt", Admin),
            (Method::PUT, "/files/updateFile/a.txt", Admin),
            (Method::POST, "/files/uploadFile", Admin),
            (Method::POST, "/files/uploadFile/", Admin),
            (Method::GET, "/swagger-ui/index.html", Authenticated),
            (Method::GET, "/v3/api-docs/openapi.json", Authenticated),
            (Method::GET, "/", Authenticated),
            // wrong method falls through to the default
            (Method::POST, "/files/getFileByName/a.txt", Authenticated),
            (Method::GET, "/files/deleteFile/a.txt", Authenticated),
            // a pattern only matches whole segments
            (Method::GET, "/files/getFileByNameX/a.txt", Authenticated),
        ];
        for (method, path, expected) in cases {
            assert_eq!(
                required_capability(&method, path),
                expected,
                "{} {}",
                method,
                path
            );
        }
    }

    #[test]
    fn test_parse_basic_credentials() {
        let header = basic("admin", "pa:ss");
        let creds = Credentials::from_basic_header(header.to_str().unwrap()).unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "pa:ss");

        let lower = format!("basic {}", general_purpose::STANDARD.encode("u:p"));
        assert!(Credentials::from_basic_header(&lower).is_some());
    }

    #[test]
    fn test_malformed_credentials() {
        let no_colon = format!("Basic {}", general_purpose::STANDARD.encode("nocolon"));
        let bad_utf8 = format!("Basic {}", general_purpose::STANDARD.encode([0xFF, 0xFE, b':']));
        for value in [
            "",
            "Basic",
            "Basic !!!not-base64!!!",
            "Bearer abc.def.ghi",
            no_colon.as_str(),
            bad_utf8.as_str(),
        ] {
            assert!(Credentials::from_basic_header(value).is_none(), "{value:?}");
        }
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            username: "admin".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn test_public_routes_ignore_credentials() {
        let registry = registry();
        let garbage = HeaderValue::from_static("Basic ###");
        for header in [None, Some(&garbage)] {
            assert_eq!(
                authorize(&registry, &Method::GET, "/files/getImageSrc/x.png", header),
                Decision::Allow
            );
        }
    }

    #[test]
    fn test_admin_routes() {
        let registry = registry();
        let path = "/files/deleteFile/a.txt";
        let check = |h: Option<&HeaderValue>| authorize(&registry, &Method::DELETE, path, h);

        assert_eq!(check(None), Decision::RejectUnauthenticated);
        assert_eq!(
            check(Some(&HeaderValue::from_static("Basic ###"))),
            Decision::RejectUnauthenticated
        );
        assert_eq!(
            check(Some(&basic("admin", "wrong"))),
            Decision::RejectUnauthenticated
        );
        assert_eq!(
            check(Some(&basic("viewer", "viewer-pw"))),
            Decision::RejectForbidden
        );
        assert_eq!(check(Some(&basic("admin", "admin-pw"))), Decision::Allow);
    }

    #[test]
    fn test_default_rule_accepts_any_role() {
        let registry = registry();
        let path = "/swagger-ui/";
        assert_eq!(
            authorize(&registry, &Method::GET, path, None),
            Decision::RejectUnauthenticated
        );
        assert_eq!(
            authorize(&registry, &Method::GET, path, Some(&basic("viewer", "viewer-pw"))),
            Decision::Allow
        );
        assert_eq!(
            authorize(&registry, &Method::GET, path, Some(&basic("admin", "admin-pw"))),
            Decision::Allow
        );
    }
}
