//! HTTP handlers, one submodule per resource.

pub mod articles;
pub mod auth;
pub mod explore;
pub mod featured;
pub mod interactions;
pub mod posts;
pub mod projects;
pub mod users;

use std::sync::Arc;

use axum::{Router, routing::get};
use serde::Deserialize;

use crate::auth::JwtKeys;
use crate::db::DbHandle;
use crate::hub_config::HubConfig;
use crate::models::InteractionKind;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    pub config: HubConfig,
    pub keys: JwtKeys,
}

impl AppState {
    pub fn new(db: DbHandle, config: HubConfig, jwt_secret: &str) -> Self {
        let keys = JwtKeys::new(jwt_secret, config.auth.token_ttl_hours);
        Self { db, config, keys }
    }
}

pub type SharedState = Arc<AppState>;

// ── Common query types ────────────────────────────────────────────────

/// `?page=&limit=&userId=` for plain listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub user_id: Option<i64>,
}

impl PageQuery {
    /// `(limit, offset)` clamped to the configured bounds.
    pub fn window(&self, config: &HubConfig) -> (i64, i64) {
        let max = i64::from(config.search.max_limit).max(1);
        let limit = self
            .limit
            .unwrap_or(i64::from(config.search.default_limit))
            .clamp(1, max);
        let page = self.page.unwrap_or(1).max(1);
        (limit, (page - 1).saturating_mul(limit))
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(projects::routes())
        .merge(articles::routes())
        .merge(posts::routes())
        .merge(explore::routes())
        .merge(featured::routes())
        .nest("/api/likes", interactions::routes(InteractionKind::Like))
        .nest("/api/follows", interactions::routes(InteractionKind::Follow))
        .nest("/api/watches", interactions::routes(InteractionKind::Watch))
        .route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "ok"
}
