use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use super::SharedState;
use crate::errors::Result;
use crate::models::SearchResponse;
use crate::search::{ExploreQuery, SearchRequest, search_all};

pub fn routes() -> Router<SharedState> {
    Router::new().route("/api/explore/search", get(search))
}

async fn search(
    State(state): State<SharedState>,
    Query(query): Query<ExploreQuery>,
) -> Result<Json<SearchResponse>> {
    let request = SearchRequest::from_query(&query, &state.config.search)?;
    Ok(Json(search_all(&state.db, request).await?))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_search_across_kinds() -> anyhow::Result<()> {
        let app = TestApp::new()?;
        let (_, token) = app.register("streamer").await?;
        app.json("POST", "/api/posts", Some(&token), json!({"title": "Stream setup"}))
            .await?;
        app.json("POST", "/api/projects", Some(&token), json!({"project_name": "Stream Kit"}))
            .await?;

        let (status, body) = app
            .get("/api/explore/search?q=stream&contentTypes=posts,projects&limit=1", None)
            .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"]["posts"][0]["username"], "streamer");
        assert_eq!(body["results"]["projects"][0]["project_name"], "Stream Kit");
        assert_eq!(body["results"]["users"], json!([]));
        assert_eq!(body["totalPages"], 1);
        assert_eq!(body["page"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_no_content_types_is_empty() -> anyhow::Result<()> {
        let app = TestApp::new()?;
        app.register("someone").await?;
        let (status, body) = app.get("/api/explore/search?q=some", None).await?;
        assert_eq!(status, StatusCode::OK);
        for kind in ["users", "projects", "articles", "posts"] {
            assert_eq!(body["results"][kind], json!([]));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_sort_field_is_400() -> anyhow::Result<()> {
        let app = TestApp::new()?;
        let (status, body) = app
            .get("/api/explore/search?contentTypes=users&sortBy=password_hash", None)
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap_or_default().contains("sortBy"));
        Ok(())
    }
}
