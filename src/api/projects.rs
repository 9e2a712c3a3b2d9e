use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use super::{PageQuery, SharedState};
use crate::auth::AuthUser;
use crate::errors::{HubError, Result};
use crate::models::{Project, ProjectInput};
use crate::uploads;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/projects/{id}/image", post(upload_image))
        .route("/api/projects/{id}/{field}/{index}/media", post(upload_list_media))
}

async fn list_projects(
    State(state): State<SharedState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<Project>>> {
    let (limit, offset) = q.window(&state.config);
    let owner = q.user_id;
    Ok(Json(
        state
            .db
            .call(move |db| db.list_projects(owner, limit, offset))
            .await?,
    ))
}

async fn create_project(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Json(input): Json<ProjectInput>,
) -> Result<impl IntoResponse> {
    let owner = claims.id;
    let project = state
        .db
        .call(move |db| db.create_project(owner, &input))
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>> {
    state
        .db
        .call(move |db| db.get_project(id))
        .await?
        .map(Json)
        .ok_or_else(|| HubError::not_found("Project", id))
}

async fn update_project(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<ProjectInput>,
) -> Result<Json<Project>> {
    let acting = claims.id;
    Ok(Json(
        state
            .db
            .call(move |db| db.update_project(id, acting, &input))
            .await?,
    ))
}

async fn delete_project(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let acting = claims.id;
    state
        .db
        .call(move |db| db.delete_project(id, acting))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn require_owner(state: &SharedState, id: i64, acting: i64) -> Result<()> {
    state
        .db
        .call(move |db| db.require_owner("projects", "Project", id, acting))
        .await
}

async fn upload_image(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Project>> {
    let acting = claims.id;
    require_owner(&state, id, acting).await?;
    let mut form = uploads::receive(
        multipart,
        &state.config.server.upload_dir,
        "projects",
        "project_image",
        state.config.uploads.max_bytes,
    )
    .await?;
    let url = form.require_file("project_image")?.url;
    Ok(Json(
        state
            .db
            .call(move |db| db.set_project_image(id, acting, &url))
            .await?,
    ))
}

/// Attach media to one element of a list field, e.g.
/// `POST /api/projects/3/team_members/0/media`.
async fn upload_list_media(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path((id, field, index)): Path<(i64, String, usize)>,
    multipart: Multipart,
) -> Result<Json<Project>> {
    let acting = claims.id;
    require_owner(&state, id, acting).await?;
    let mut form = uploads::receive(
        multipart,
        &state.config.server.upload_dir,
        "projects",
        "media",
        state.config.uploads.max_bytes,
    )
    .await?;
    let url = form.require_file("media")?.url;
    Ok(Json(
        state
            .db
            .call(move |db| db.set_project_list_media(id, acting, &field, index, &url))
            .await?,
    ))
}
