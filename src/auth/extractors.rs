use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::auth::gate::CurrentUser;
use crate::error::ApiError;

/// Username bound to the request by the auth gate.
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|user| AuthUser(user.0.clone()))
            .ok_or_else(|| ApiError::Unauthenticated("authentication required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_identity_bound_by_gate() {
        let req = axum::http::Request::builder()
            .uri("/api/products")
            .extension(CurrentUser("alice".into()))
            .body(())
            .expect("request");
        let (mut parts, _) = req.into_parts();

        let AuthUser(username) = AuthUser::from_request_parts(&mut parts, &())
            .await
            .expect("extract");
        assert_eq!(username, "alice");
    }

    #[tokio::test]
    async fn rejects_request_without_identity() {
        let req = axum::http::Request::builder()
            .uri("/api/products")
            .body(())
            .expect("request");
        let (mut parts, _) = req.into_parts();

        let Err(err) = AuthUser::from_request_parts(&mut parts, &()).await else {
            panic!("expected rejection without gate-bound identity");
        };
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }
}
