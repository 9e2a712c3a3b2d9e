use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
};
use serde::Serialize;

use super::{PageQuery, SharedState};
use crate::auth::AuthUser;
use crate::errors::{HubError, Result};
use crate::models::{Article, Post, Project, User, UserPatch, UserSummary};
use crate::uploads;

#[derive(Serialize)]
pub struct ImageResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", get(get_user).put(update_user))
        .route("/api/users/{id}/profile-image", post(upload_profile_image))
        .route("/api/users/{id}/projects", get(user_projects))
        .route("/api/users/{id}/articles", get(user_articles))
        .route("/api/users/{id}/posts", get(user_posts))
}

async fn require_user(state: &SharedState, id: i64) -> Result<()> {
    if state.db.call(move |db| db.user_exists(id)).await? {
        Ok(())
    } else {
        Err(HubError::not_found("User", id))
    }
}

async fn list_users(
    State(state): State<SharedState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<UserSummary>>> {
    let (limit, offset) = q.window(&state.config);
    let users = state.db.call(move |db| db.list_users(limit, offset)).await?;
    Ok(Json(users))
}

async fn get_user(State(state): State<SharedState>, Path(id): Path<i64>) -> Result<Json<User>> {
    state
        .db
        .call(move |db| db.get_user(id))
        .await?
        .map(Json)
        .ok_or_else(|| HubError::not_found("User", id))
}

/// Only the profile's owner may edit it.
async fn update_user(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>> {
    let acting = claims.id;
    let user = state
        .db
        .call(move |db| db.update_user(id, acting, &patch))
        .await?;
    Ok(Json(user))
}

async fn upload_profile_image(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ImageResponse>> {
    require_user(&state, id).await?;
    if claims.id != id {
        return Err(HubError::forbidden("profile"));
    }
    let mut form = uploads::receive(
        multipart,
        &state.config.server.upload_dir,
        "profiles",
        "profile_image",
        state.config.uploads.max_bytes,
    )
    .await?;
    let file = form.require_file("profile_image")?;
    let url = file.url.clone();
    state
        .db
        .call(move |db| db.set_profile_image(id, &url))
        .await?;
    Ok(Json(ImageResponse { image_url: file.url }))
}

async fn user_projects(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<Project>>> {
    require_user(&state, id).await?;
    let (limit, offset) = q.window(&state.config);
    Ok(Json(
        state
            .db
            .call(move |db| db.list_projects(Some(id), limit, offset))
            .await?,
    ))
}

async fn user_articles(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<Article>>> {
    require_user(&state, id).await?;
    let (limit, offset) = q.window(&state.config);
    Ok(Json(
        state
            .db
            .call(move |db| db.list_articles(Some(id), limit, offset))
            .await?,
    ))
}

async fn user_posts(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<Post>>> {
    require_user(&state, id).await?;
    let (limit, offset) = q.window(&state.config);
    Ok(Json(
        state
            .db
            .call(move |db| db.list_posts(Some(id), limit, offset))
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_user_is_404() -> anyhow::Result<()> {
        let app = TestApp::new()?;
        let (status, body) = app.get("/api/users/42", None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User 42 not found");
        Ok(())
    }

    #[tokio::test]
    async fn test_profile_update_is_owner_only_and_partial() -> anyhow::Result<()> {
        let app = TestApp::new()?;
        let (alice, alice_token) = app.register("alice").await?;
        let (_, bob_token) = app.register("bob").await?;

        let (status, body) = app
            .json(
                "PUT",
                &format!("/api/users/{}", alice),
                Some(&alice_token),
                json!({
                    "bio": "hi",
                    "social_links": {"github": "alice-gh"},
                    "work_experience": [{"title": "Editor", "company": "Zine"}],
                }),
            )
            .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["social_links"]["github"], "alice-gh");
        assert_eq!(body["social_links"]["youtube"], "");
        assert_eq!(body["work_experience"][0]["company"], "Zine");

        let (status, body) = app
            .json(
                "PUT",
                &format!("/api/users/{}", alice),
                Some(&alice_token),
                json!({"bio": "updated", "career_experience": "7"}),
            )
            .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["career_experience"], 7);
        assert_eq!(body["work_experience"].as_array().map(Vec::len), Some(1));

        let (status, _) = app
            .json(
                "PUT",
                &format!("/api/users/{}", alice),
                Some(&bob_token),
                json!({"bio": "hacked"}),
            )
            .await?;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, body) = app.get(&format!("/api/users/{}", alice), None).await?;
        assert_eq!(body["bio"], "updated");
        Ok(())
    }

    #[tokio::test]
    async fn test_profile_email_change_follows_registration_rules() -> anyhow::Result<()> {
        let app = TestApp::new()?;
        let (alice, token) = app.register("alice").await?;
        let uri = format!("/api/users/{}", alice);

        let (status, body) = app
            .json("PUT", &uri, Some(&token), json!({"email": "  Carol@Example.com "}))
            .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "carol@example.com");

        // The changed address is taken, whatever its case.
        let (status, _) = app
            .json(
                "POST",
                "/api/auth/register",
                None,
                json!({"username": "carol", "email": "carol@example.com", "password": "secret12"}),
            )
            .await?;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, body) = app
            .json(
                "POST",
                "/api/auth/login",
                None,
                json!({"email": "CAROL@example.com", "password": "secret12"}),
            )
            .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], alice);

        for patch in [
            json!({"email": "not-an-email"}),
            json!({"email": "@example.com"}),
            json!({"username": "   "}),
        ] {
            let (status, _) = app.json("PUT", &uri, Some(&token), patch).await?;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        let (_, body) = app.get(&uri, None).await?;
        assert_eq!(body["email"], "carol@example.com");
        assert_eq!(body["username"], "alice");
        Ok(())
    }

    #[tokio::test]
    async fn test_profile_image_upload() -> anyhow::Result<()> {
        let app = TestApp::new()?;
        let (alice, token) = app.register("alice").await?;
        let (_, bob_token) = app.register("bob").await?;
        let uri = format!("/api/users/{}/profile-image", alice);

        let (status, _) = app
            .upload(&uri, &bob_token, "profile_image", "me.png", b"png-bytes", &[])
            .await?;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .upload(&uri, &token, "profile_image", "me.png", b"png-bytes", &[])
            .await?;
        assert_eq!(status, StatusCode::OK);
        let url = body["imageUrl"].as_str().unwrap_or_default().to_string();
        assert!(url.starts_with("/uploads/profiles/") && url.ends_with(".png"));
        let on_disk = app.upload_dir().join(url.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(on_disk)?, b"png-bytes");

        let (_, user) = app.get(&format!("/api/users/{}", alice), None).await?;
        assert_eq!(user["profile_image"], url.as_str());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_users_and_owned_content() -> anyhow::Result<()> {
        let app = TestApp::new()?;
        let (alice, token) = app.register("alice").await?;
        app.register("bob").await?;
        app.json("POST", "/api/posts", Some(&token), json!({"title": "First"}))
            .await?;

        let (_, users) = app.get("/api/users?limit=1", None).await?;
        assert_eq!(users.as_array().map(Vec::len), Some(1));
        assert_eq!(users[0]["username"], "bob");

        let (status, posts) = app.get(&format!("/api/users/{}/posts", alice), None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(posts[0]["title"], "First");
        let (status, _) = app.get("/api/users/999/projects", None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
