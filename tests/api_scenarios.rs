//! End-to-end scenarios through the full router, static uploads included.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use creatorhub::api::AppState;
use creatorhub::db::{DbHandle, HubDb};
use creatorhub::hub_config::HubConfig;
use creatorhub::server::build_router;

struct Hub {
    router: Router,
    _uploads: TempDir,
}

impl Hub {
    fn start() -> anyhow::Result<Self> {
        let uploads = tempfile::tempdir()?;
        let mut config = HubConfig::default();
        config.server.upload_dir = uploads.path().to_path_buf();
        let state = Arc::new(AppState::new(
            DbHandle::new(HubDb::new_in_memory()?),
            config,
            "scenario-secret",
        ));
        Ok(Self {
            router: build_router(state),
            _uploads: uploads,
        })
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        let resp = self.router.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = resp.into_body().collect().await?.to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok((status, value))
    }

    async fn raw(&self, uri: &str) -> anyhow::Result<(StatusCode, Vec<u8>)> {
        let req = Request::builder().uri(uri).body(Body::empty())?;
        let resp = self.router.clone().oneshot(req).await?;
        let status = resp.status();
        Ok((status, resp.into_body().collect().await?.to_bytes().to_vec()))
    }

    async fn upload(
        &self,
        uri: &str,
        token: &str,
        field: &str,
        content: &[u8],
    ) -> anyhow::Result<(StatusCode, Value)> {
        let boundary = "scenario-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"shot.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))?;
        let resp = self.router.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = resp.into_body().collect().await?.to_bytes();
        Ok((status, serde_json::from_slice(&bytes).unwrap_or(Value::Null)))
    }

    async fn signup(&self, username: &str, user_type: &str) -> anyhow::Result<(i64, String)> {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@Example.com", username),
                    "password": "hunter22",
                })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "signup failed: {}", body);
        let id = body["user"]["id"].as_i64().unwrap_or_default();
        let token = body["token"].as_str().unwrap_or_default().to_string();

        let (status, profile) = self
            .call(
                "PUT",
                &format!("/api/users/{}", id),
                Some(&token),
                Some(json!({"user_type": user_type, "bio": "hello"})),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "profile update failed: {}", profile);
        Ok((id, token))
    }
}

#[tokio::test]
async fn creator_publishes_and_brand_discovers() -> anyhow::Result<()> {
    let hub = Hub::start()?;
    let (creator_id, creator) = hub.signup("lumen", "creator").await?;
    let (_, brand) = hub.signup("acme", "brand").await?;

    let (status, login) = hub
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "LUMEN@example.com", "password": "hunter22"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["id"], creator_id);

    let (status, post) = hub
        .call(
            "POST",
            "/api/posts",
            Some(&creator),
            Some(json!({"title": "Golden hour timelapse", "description": "Shot on film"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = post["id"].as_i64().unwrap_or_default();

    let (status, image) = hub
        .upload(&format!("/api/posts/{}/image", post_id), &creator, "post_image", b"png!")
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(image["post_image_display"], "upload");
    let url = image["post_image_upload"].as_str().unwrap_or_default().to_string();
    assert!(url.starts_with("/uploads/"), "unexpected upload response {}", image);
    let (status, bytes) = hub.raw(&url).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"png!");

    let target = json!({"entityType": "post", "entityId": post_id});
    let (status, _) = hub.call("POST", "/api/likes", Some(&brand), Some(target)).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, follow) = hub
        .call(
            "POST",
            "/api/follows",
            Some(&brand),
            Some(json!({"entityType": "user", "entityId": creator_id})),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(follow["count"], 1);

    let (status, comment) = hub
        .call(
            "POST",
            &format!("/api/posts/{}/comment", post_id),
            Some(&brand),
            Some(json!({"text": "Love the colours"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["username"], "acme");

    let (status, results) = hub
        .call(
            "GET",
            "/api/explore/search?q=golden&contentTypes=posts,users&userTypes=creator",
            None,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["results"]["posts"][0]["id"], post_id);
    assert_eq!(results["results"]["users"], json!([]));

    let (status, featured) = hub.call("GET", "/api/featured", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(featured["posts"][0]["mediaUrl"], url.as_str());
    Ok(())
}

#[tokio::test]
async fn article_sections_keep_their_order() -> anyhow::Result<()> {
    let hub = Hub::start()?;
    let (_, writer) = hub.signup("quill", "creator").await?;
    let (_, other) = hub.signup("lurker", "brand").await?;

    let (status, article) = hub
        .call(
            "POST",
            "/api/articles",
            Some(&writer),
            Some(json!({
                "title": "Lighting basics",
                "sections": [
                    {"type": "full-width-text", "title": "Intro", "text": "Why light matters"},
                    {"type": "full-width-media", "title": "Setup"},
                    {"type": "left-text-right-media", "title": "Outro", "text": "Go shoot"},
                ],
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = article["id"].as_i64().unwrap_or_default();

    let (status, moved) = hub
        .call(
            "POST",
            &format!("/api/articles/{}/sections/2/move", id),
            Some(&writer),
            Some(json!({"direction": "up"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = moved["sections"]
        .as_array()
        .map(|s| s.iter().filter_map(|s| s["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, ["Intro", "Outro", "Setup"]);

    let (status, _) = hub
        .call(
            "POST",
            &format!("/api/articles/{}/sections/0/move", id),
            Some(&other),
            Some(json!({"direction": "down"})),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = hub
        .call("DELETE", &format!("/api/articles/{}", id), Some(&writer), None)
        .await?;
    assert!(status.is_success());
    let (status, _) = hub.call("GET", &format!("/api/articles/{}", id), None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_bad_tokens() -> anyhow::Result<()> {
    let hub = Hub::start()?;
    let (status, _) = hub.call("GET", "/api/auth/me", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = hub.call("GET", "/api/auth/me", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = hub
        .call("POST", "/api/posts", None, Some(json!({"title": "nope"})))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
    Ok(())
}
