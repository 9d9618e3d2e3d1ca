use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::jwt::{Claims, JwtKeys};
use crate::auth::repo_types::Role;
use crate::error::AuthError;

/// Extracts and validates the bearer token, handing the decoded claims to
/// the handler. Every request is verified independently.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::Unauthenticated("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::Unauthenticated("Invalid Authorization header"))?;

        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            AuthError::Unauthenticated("Invalid or expired token")
        })?;

        Ok(AuthUser(claims))
    }
}

/// `AuthUser` plus the admin role gate. A valid non-admin token rejects with
/// 403, distinct from the 401 authentication failures.
#[derive(Debug)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if claims.role != Role::Admin {
            warn!(user_id = claims.id, "admin route refused for non-admin");
            return Err(AuthError::Forbidden);
        }
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::User;
    use crate::state::AppState;
    use axum::http::{header::AUTHORIZATION, Request, StatusCode};
    use axum::response::IntoResponse;
    use time::OffsetDateTime;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).expect("request").into_parts();
        parts
    }

    fn token_for(state: &AppState, role: Role) -> String {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: 42,
            name: "t".into(),
            email: "t@example.com".into(),
            password_hash: "unused".into(),
            role,
            created_at: now,
            updated_at: now,
        };
        JwtKeys::from_ref(state).sign(&user).expect("sign")
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let state = AppState::fake();
        let mut parts = parts_with_header(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect_err("should reject");
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthenticated() {
        let state = AppState::fake();
        let mut parts = parts_with_header(Some("Basic dXNlcjpwYXNz"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect_err("should reject");
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthenticated() {
        let state = AppState::fake();
        let mut parts = parts_with_header(Some("Bearer not-a-jwt"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect_err("should reject");
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let state = AppState::fake();
        let token = token_for(&state, Role::User);
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
        let AuthUser(claims) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("should accept");
        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "t@example.com");
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn user_token_is_forbidden_on_admin_gate() {
        let state = AppState::fake();
        let token = token_for(&state, Role::User);
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .expect_err("should reject");
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_token_passes_admin_gate() {
        let state = AppState::fake();
        let token = token_for(&state, Role::Admin);
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
        let AdminUser(claims) = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .expect("should accept");
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn missing_token_beats_role_check_on_admin_gate() {
        let state = AppState::fake();
        let mut parts = parts_with_header(None);
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .expect_err("should reject");
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
