use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::{PageQuery, SharedState};
use crate::auth::AuthUser;
use crate::errors::{HubError, Result};
use crate::models::{Comment, Post, PostInput};
use crate::uploads;

#[derive(Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub likes: i64,
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/posts/{id}/image", post(upload_image))
        .route("/api/posts/{id}/like", post(like_post))
        .route("/api/posts/{id}/comment", post(add_comment))
        .route("/api/posts/{id}/comments", get(list_comments))
}

async fn list_posts(
    State(state): State<SharedState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<Post>>> {
    let (limit, offset) = q.window(&state.config);
    let owner = q.user_id;
    Ok(Json(
        state
            .db
            .call(move |db| db.list_posts(owner, limit, offset))
            .await?,
    ))
}

async fn create_post(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Json(input): Json<PostInput>,
) -> Result<impl IntoResponse> {
    let owner = claims.id;
    let post = state
        .db
        .call(move |db| db.create_post(owner, input))
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_post(State(state): State<SharedState>, Path(id): Path<i64>) -> Result<Json<Post>> {
    state
        .db
        .call(move |db| db.get_post(id))
        .await?
        .map(Json)
        .ok_or_else(|| HubError::not_found("Post", id))
}

async fn update_post(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<PostInput>,
) -> Result<Json<Post>> {
    let acting = claims.id;
    Ok(Json(
        state
            .db
            .call(move |db| db.update_post(id, acting, input))
            .await?,
    ))
}

async fn delete_post(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let acting = claims.id;
    state.db.call(move |db| db.delete_post(id, acting)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_image(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Post>> {
    let acting = claims.id;
    state
        .db
        .call(move |db| db.require_owner("posts", "Post", id, acting))
        .await?;
    let mut form = uploads::receive(
        multipart,
        &state.config.server.upload_dir,
        "posts",
        "post_image",
        state.config.uploads.max_bytes,
    )
    .await?;
    let url = form.require_file("post_image")?.url;
    Ok(Json(
        state
            .db
            .call(move |db| db.set_post_image(id, acting, &url))
            .await?,
    ))
}

async fn like_post(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<LikeResponse>> {
    let liker = claims.id;
    let likes = state.db.call(move |db| db.like_post(id, liker)).await?;
    Ok(Json(LikeResponse { likes }))
}

async fn add_comment(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse> {
    let author = claims.id;
    let comment = state
        .db
        .call(move |db| db.add_comment(id, author, &req.text))
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Comment>>> {
    Ok(Json(state.db.call(move |db| db.list_comments(id)).await?))
}
