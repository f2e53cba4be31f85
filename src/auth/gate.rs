use axum::extract::{FromRef, Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::auth::jwt::TokenKeys;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity resolved by the gate, bound to the request via extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

struct AllowRule {
    method: Method,
    path: &'static str,
    /// also match anything nested under `path`
    prefix: bool,
}

/// Routes reachable without a bearer token. Everything else is rejected at
/// the gate before it reaches a handler.
static PUBLIC_ROUTES: &[AllowRule] = &[
    AllowRule {
        method: Method::POST,
        path: "/api/users/signup",
        prefix: false,
    },
    AllowRule {
        method: Method::POST,
        path: "/api/users/login",
        prefix: false,
    },
    AllowRule {
        method: Method::GET,
        path: "/api/products",
        prefix: true,
    },
    AllowRule {
        method: Method::GET,
        path: "/api/categories",
        prefix: false,
    },
    AllowRule {
        method: Method::GET,
        path: "/uploads",
        prefix: true,
    },
    AllowRule {
        method: Method::GET,
        path: "/health",
        prefix: false,
    },
];

fn route_is_public(method: &Method, path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|rule| {
        if rule.method != *method {
            return false;
        }
        if rule.prefix {
            path.strip_prefix(rule.path)
                .map_or(false, |rest| rest.is_empty() || rest.starts_with('/'))
        } else {
            path == rule.path
        }
    })
}

/// Per-request authentication gate. Public routes pass through without an
/// identity; everything else must carry `Authorization: Bearer <token>`.
/// The resolved username lives in request extensions only, so it never
/// leaks across requests.
pub async fn auth_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if route_is_public(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated("missing Authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthenticated("invalid Authorization header".into()))?;

    let keys = TokenKeys::from_ref(&state);
    let username = keys.extract_subject(token).map_err(|e| {
        warn!(error = %e, "token subject extraction failed");
        ApiError::Unauthenticated("invalid token".into())
    })?;

    if !keys.validate(token, &username) {
        warn!(user = %username, "token validation failed");
        return Err(ApiError::Unauthenticated("invalid or expired token".into()));
    }

    debug!(user = %username, "request authenticated");
    req.extensions_mut().insert(CurrentUser(username));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_and_login_are_public() {
        assert!(route_is_public(&Method::POST, "/api/users/signup"));
        assert!(route_is_public(&Method::POST, "/api/users/login"));
    }

    #[test]
    fn catalog_reads_are_public() {
        assert!(route_is_public(&Method::GET, "/api/products"));
        assert!(route_is_public(&Method::GET, "/api/products/42"));
        assert!(route_is_public(&Method::GET, "/api/categories"));
    }

    #[test]
    fn uploaded_files_and_health_are_public() {
        assert!(route_is_public(&Method::GET, "/uploads/abc123_20250101_120000.png"));
        assert!(route_is_public(&Method::GET, "/health"));
    }

    #[test]
    fn product_mutations_require_auth() {
        assert!(!route_is_public(&Method::POST, "/api/products"));
        assert!(!route_is_public(&Method::POST, "/api/products/json"));
        assert!(!route_is_public(&Method::PUT, "/api/products/42"));
        assert!(!route_is_public(&Method::DELETE, "/api/products/42"));
        assert!(!route_is_public(&Method::POST, "/api/products/upload-image"));
    }

    #[test]
    fn prefix_rules_do_not_match_lookalike_paths() {
        assert!(!route_is_public(&Method::GET, "/api/productsfoo"));
        assert!(!route_is_public(&Method::GET, "/uploadsfoo/x.png"));
    }

    #[test]
    fn unknown_routes_require_auth() {
        assert!(!route_is_public(&Method::GET, "/api/users"));
        assert!(!route_is_public(&Method::POST, "/api/anything"));
    }
}
