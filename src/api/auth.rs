use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::SharedState;
use crate::auth::{AuthUser, hash_password_blocking, verify_password_blocking};
use crate::db::users::{normalize_email, normalize_username};
use crate::errors::{HubError, Result};
use crate::models::User;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let username = normalize_username(&req.username)?;
    let email = normalize_email(&req.email)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(HubError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let hash = hash_password_blocking(req.password).await?;
    let avatar = state.config.auth.default_avatar.clone();
    let user = state
        .db
        .call(move |db| db.create_user(&username, &email, &hash, &avatar))
        .await?;
    let token = state.keys.issue(user.id, &user.email, &user.username)?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let rejected = || HubError::Authentication("Invalid email or password".into());
    let email = req.email.trim().to_lowercase();
    let creds = state
        .db
        .call(move |db| db.find_credentials(&email))
        .await?
        .ok_or_else(|| {
            tracing::info!("login rejected: unknown email");
            rejected()
        })?;
    if !verify_password_blocking(creds.password_hash.clone(), req.password).await? {
        tracing::info!(user_id = creds.user_id, "login rejected: wrong password");
        return Err(rejected());
    }

    let user_id = creds.user_id;
    let user = state
        .db
        .call(move |db| db.get_user(user_id))
        .await?
        .ok_or_else(|| HubError::not_found("User", user_id))?;
    let token = state.keys.issue(user.id, &user.email, &user.username)?;
    tracing::info!(user_id, "user logged in");
    Ok(Json(AuthResponse { user, token }))
}

async fn me(State(state): State<SharedState>, AuthUser(claims): AuthUser) -> Result<Json<User>> {
    let id = claims.id;
    state
        .db
        .call(move |db| db.get_user(id))
        .await?
        .map(Json)
        .ok_or_else(|| HubError::not_found("User", id))
}
