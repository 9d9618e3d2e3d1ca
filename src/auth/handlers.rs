use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, PublicUser, RegisterRequest},
        extractors::{AdminUser, AuthUser},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{Role, User},
    },
    error::AuthError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/users", get(list_users))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Display name defaults to the local part of the email.
pub(crate) fn display_name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AuthError::Validation(
            "Email and password are required".into(),
        ));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::Validation("Invalid email".into()));
    }

    let name = display_name_from_email(&payload.email);
    let hash = hash_password(&payload.password).map_err(AuthError::Internal)?;

    // No existence pre-check: the unique constraint decides, so concurrent
    // registrations of one email cannot both succeed.
    let user = User::create(&state.db, &name, &payload.email, &hash, Role::User).await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(MessageResponse::new("Registration successful")))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AuthError::Validation(
            "Email and password are required".into(),
        ));
    }

    let user = match User::find_by_email(&state.db, &payload.email)
        .await
        .map_err(AuthError::Internal)?
    {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user).map_err(AuthError::Internal)?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: PublicUser::from(user),
    }))
}

/// Stateless: tokens stay valid until expiry, the client just discards its
/// copy. The handler only exists to require a valid token.
#[instrument(skip_all)]
pub async fn logout(AuthUser(claims): AuthUser) -> Json<MessageResponse> {
    info!(user_id = claims.id, "user logged out");
    Json(MessageResponse::new("Logout successful"))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<PublicUser>, AuthError> {
    let user = User::find_by_id(&state.db, claims.id)
        .await
        .map_err(AuthError::Internal)?
        .ok_or(AuthError::Unauthenticated("User not found"))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
) -> Result<Json<Vec<PublicUser>>, AuthError> {
    let users = User::list(&state.db).await.map_err(AuthError::Internal)?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}
