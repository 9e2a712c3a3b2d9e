use axum::{Json, Router, extract::State, routing::get};

use super::SharedState;
use crate::featured::featured_content;
use crate::models::FeaturedContent;

pub fn routes() -> Router<SharedState> {
    Router::new().route("/api/featured", get(featured))
}

async fn featured(State(state): State<SharedState>) -> Json<FeaturedContent> {
    Json(featured_content(&state.db, &state.config.featured).await)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_featured_snapshot_shape() -> anyhow::Result<()> {
        let app = TestApp::new()?;
        let (_, token) = app.register("maker").await?;
        app.json(
            "POST",
            "/api/projects",
            Some(&token),
            json!({"project_name": "Reel", "project_image": "/uploads/projects/r.png"}),
        )
        .await?;
        let (status, body) = app.get("/api/featured", None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"][0]["username"], "maker");
        assert_eq!(body["projects"][0]["mediaUrl"], "/uploads/projects/r.png");
        assert_eq!(body["articles"], json!([]));
        assert_eq!(body["posts"], json!([]));
        Ok(())
    }
}
