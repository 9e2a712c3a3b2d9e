use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;

use super::{PageQuery, SharedState};
use crate::auth::AuthUser;
use crate::errors::{HubError, Result};
use crate::models::{Article, ArticleInput, Section};
use crate::sections::Direction;
use crate::uploads;

#[derive(Deserialize)]
pub struct MoveSectionRequest {
    pub direction: Direction,
}

/// Missing `index` appends.
#[derive(Deserialize)]
pub struct InsertSectionRequest {
    pub index: Option<usize>,
    pub section: Section,
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/articles", get(list_articles).post(create_article))
        .route(
            "/api/articles/{id}",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/api/articles/{id}/media", post(upload_section_media))
        .route("/api/articles/{id}/sections", post(insert_section))
        .route("/api/articles/{id}/sections/{index}", delete(remove_section))
        .route("/api/articles/{id}/sections/{index}/move", post(move_section))
}

async fn list_articles(
    State(state): State<SharedState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<Article>>> {
    let (limit, offset) = q.window(&state.config);
    let owner = q.user_id;
    Ok(Json(
        state
            .db
            .call(move |db| db.list_articles(owner, limit, offset))
            .await?,
    ))
}

async fn create_article(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Json(input): Json<ArticleInput>,
) -> Result<impl IntoResponse> {
    if input.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        return Err(HubError::validation("Article title is required"));
    }
    let owner = claims.id;
    let article = state
        .db
        .call(move |db| db.create_article(owner, input))
        .await?;
    Ok((StatusCode::CREATED, Json(article)))
}

async fn get_article(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Article>> {
    state
        .db
        .call(move |db| db.get_article(id))
        .await?
        .map(Json)
        .ok_or_else(|| HubError::not_found("Article", id))
}

async fn update_article(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<ArticleInput>,
) -> Result<Json<Article>> {
    let acting = claims.id;
    Ok(Json(
        state
            .db
            .call(move |db| db.update_article(id, acting, input))
            .await?,
    ))
}

async fn delete_article(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let acting = claims.id;
    state
        .db
        .call(move |db| db.delete_article(id, acting))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Multipart `media` file plus a `sectionIndex` text field.
async fn upload_section_media(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Article>> {
    let acting = claims.id;
    state
        .db
        .call(move |db| db.require_owner("articles", "Article", id, acting))
        .await?;
    let mut form = uploads::receive(
        multipart,
        &state.config.server.upload_dir,
        "articles",
        "media",
        state.config.uploads.max_bytes,
    )
    .await?;
    let raw_index = form.fields.get("sectionIndex").cloned().unwrap_or_default();
    let index: usize = raw_index.trim().parse().map_err(|_| {
        HubError::validation(format!(
            "sectionIndex must be a non-negative integer, got '{}'",
            raw_index
        ))
    })?;
    let file = form.require_file("media")?;
    let media_type = file.media_type();
    Ok(Json(
        state
            .db
            .call(move |db| db.set_section_media(id, acting, index, &file.url, media_type))
            .await?,
    ))
}

async fn move_section(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path((id, index)): Path<(i64, usize)>,
    Json(req): Json<MoveSectionRequest>,
) -> Result<Json<Article>> {
    let acting = claims.id;
    Ok(Json(
        state
            .db
            .call(move |db| db.move_article_section(id, acting, index, req.direction))
            .await?,
    ))
}

async fn insert_section(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<InsertSectionRequest>,
) -> Result<Json<Article>> {
    let acting = claims.id;
    Ok(Json(
        state
            .db
            .call(move |db| {
                let index = match req.index {
                    Some(index) => index,
                    None => db
                        .get_article(id)?
                        .map(|a| a.sections.len())
                        .ok_or_else(|| HubError::not_found("Article", id))?,
                };
                db.insert_article_section(id, acting, index, req.section)
            })
            .await?,
    ))
}

async fn remove_section(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path((id, index)): Path<(i64, usize)>,
) -> Result<Json<Article>> {
    let acting = claims.id;
    Ok(Json(
        state
            .db
            .call(move |db| db.remove_article_section(id, acting, index))
            .await?,
    ))
}
