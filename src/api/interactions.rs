//! Like, follow and watch share one surface, mounted once per kind:
//!
//! - `GET  /count?entityType=&entityId=`
//! - `GET  /status?entityType=&entityId=` (auth)
//! - `POST /` with `{entityType, entityId}` (auth), 201 or 409 if present
//! - `DELETE /?entityType=&entityId=` (auth), 204 or 404 if absent

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use super::SharedState;
use crate::auth::AuthUser;
use crate::errors::{HubError, Result};
use crate::models::{EntityKind, InteractionCount, InteractionKind, InteractionStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub entity_type: String,
    pub entity_id: i64,
}

impl EntityRef {
    fn parse(&self) -> Result<(EntityKind, i64)> {
        let kind = EntityKind::from_str(&self.entity_type).map_err(HubError::Validation)?;
        Ok((kind, self.entity_id))
    }
}

pub fn routes(kind: InteractionKind) -> Router<SharedState> {
    Router::new()
        .route(
            "/count",
            get(move |State(state): State<SharedState>, Query(target): Query<EntityRef>| {
                count(state, kind, target)
            }),
        )
        .route(
            "/status",
            get(
                move |State(state): State<SharedState>,
                      AuthUser(claims): AuthUser,
                      Query(target): Query<EntityRef>| {
                    status(state, kind, claims.id, target)
                },
            ),
        )
        .route(
            "/",
            axum::routing::post(
                move |State(state): State<SharedState>,
                      AuthUser(claims): AuthUser,
                      Json(target): Json<EntityRef>| {
                    create(state, kind, claims.id, target)
                },
            )
            .delete(
                move |State(state): State<SharedState>,
                      AuthUser(claims): AuthUser,
                      Query(target): Query<EntityRef>| {
                    remove(state, kind, claims.id, target)
                },
            ),
        )
}

async fn count(
    state: SharedState,
    kind: InteractionKind,
    target: EntityRef,
) -> Result<Json<InteractionCount>> {
    let (entity, id) = target.parse()?;
    let count = state
        .db
        .call(move |db| db.interaction_count(kind, entity, id))
        .await?;
    Ok(Json(InteractionCount { count }))
}

async fn status(
    state: SharedState,
    kind: InteractionKind,
    user_id: i64,
    target: EntityRef,
) -> Result<Json<InteractionStatus>> {
    let (entity, id) = target.parse()?;
    let active = state
        .db
        .call(move |db| db.interaction_active(kind, entity, id, user_id))
        .await?;
    Ok(Json(InteractionStatus { active }))
}

async fn create(
    state: SharedState,
    kind: InteractionKind,
    user_id: i64,
    target: EntityRef,
) -> Result<(StatusCode, Json<InteractionCount>)> {
    let (entity, id) = target.parse()?;
    let count = state
        .db
        .call(move |db| {
            db.create_interaction(kind, entity, id, user_id)?;
            db.interaction_count(kind, entity, id)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(InteractionCount { count })))
}

async fn remove(
    state: SharedState,
    kind: InteractionKind,
    user_id: i64,
    target: EntityRef,
) -> Result<StatusCode> {
    let (entity, id) = target.parse()?;
    state
        .db
        .call(move |db| db.delete_interaction(kind, entity, id, user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
