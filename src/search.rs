//! Explore/search across users, projects, articles and posts.
//!
//! Kinds are opt-in: a request that names no `contentTypes` returns four
//! empty arrays and never touches the database. Selected kinds run
//! concurrently, each producing one page of projections plus its total
//! match count.

use std::str::FromStr;

use serde::Deserialize;

use crate::db::DbHandle;
use crate::errors::{HubError, Result};
use crate::hub_config::SearchSection;
use crate::models::{EntityKind, SearchResponse, SearchResults, SearchTotals};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    /// Mapped per kind to its title-bearing column.
    Title,
}

impl FromStr for SortField {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "created_at" | "createdAt" => Ok(Self::CreatedAt),
            "updated_at" | "updatedAt" => Ok(Self::UpdatedAt),
            "title" => Ok(Self::Title),
            other => Err(HubError::validation(format!(
                "Invalid sortBy '{}'; expected created_at, updated_at or title",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(HubError::validation(format!(
                "Invalid sortOrder '{}'; expected asc or desc",
                other
            ))),
        }
    }
}

/// Per-kind query parameters shared by every selected kind.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Lowercased, trimmed free text; `None` matches everything.
    pub q: Option<String>,
    pub user_types: Vec<String>,
    pub sort: SortField,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

/// Raw `/api/explore/search` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreQuery {
    pub q: Option<String>,
    pub content_types: Option<String>,
    pub user_types: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub kinds: Vec<EntityKind>,
    pub filter: SearchFilter,
    pub page: i64,
}

fn csv(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn positive_int(name: &str, raw: Option<&str>) -> Result<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => match s.parse::<i64>() {
            Ok(n) if n >= 1 => Ok(Some(n)),
            _ => Err(HubError::validation(format!(
                "{} must be a positive integer, got '{}'",
                name, s
            ))),
        },
    }
}

impl SearchRequest {
    pub fn from_query(query: &ExploreQuery, limits: &SearchSection) -> Result<Self> {
        let mut kinds = Vec::new();
        for raw in csv(query.content_types.as_deref()) {
            let kind = EntityKind::from_str(raw).map_err(HubError::Validation)?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        let page = positive_int("page", query.page.as_deref())?.unwrap_or(1);
        let limit = positive_int("limit", query.limit.as_deref())?
            .unwrap_or(i64::from(limits.default_limit))
            .min(i64::from(limits.max_limit));
        let sort = match query.sort_by.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => s.parse()?,
            None => SortField::default(),
        };
        let order = match query.sort_order.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => s.parse()?,
            None => SortOrder::default(),
        };
        let q = query
            .q
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        Ok(Self {
            kinds,
            filter: SearchFilter {
                q,
                user_types: csv(query.user_types.as_deref()).map(String::from).collect(),
                sort,
                order,
                limit,
                offset: (page - 1).saturating_mul(limit),
            },
            page,
        })
    }
}

fn pages(count: i64, limit: i64) -> i64 {
    if limit <= 0 { 0 } else { (count + limit - 1) / limit }
}

/// Run every selected kind concurrently and assemble one response.
///
/// `totalPages` is the largest page count among the selected kinds, so
/// paging continues while any kind still has results.
pub async fn search_all(db: &DbHandle, request: SearchRequest) -> Result<SearchResponse> {
    let SearchRequest { kinds, filter, page } = request;
    let mut response = SearchResponse {
        page,
        ..Default::default()
    };
    if kinds.is_empty() {
        return Ok(response);
    }

    let wants = |kind| kinds.contains(&kind);
    let (f1, f2, f3, f4) = (filter.clone(), filter.clone(), filter.clone(), filter.clone());
    let (users, projects, articles, posts) = tokio::join!(
        async {
            if wants(EntityKind::User) {
                db.call(move |db| db.search_users(&f1)).await.map(Some)
            } else {
                Ok(None)
            }
        },
        async {
            if wants(EntityKind::Project) {
                db.call(move |db| db.search_projects(&f2)).await.map(Some)
            } else {
                Ok(None)
            }
        },
        async {
            if wants(EntityKind::Article) {
                db.call(move |db| db.search_articles(&f3)).await.map(Some)
            } else {
                Ok(None)
            }
        },
        async {
            if wants(EntityKind::Post) {
                db.call(move |db| db.search_posts(&f4)).await.map(Some)
            } else {
                Ok(None)
            }
        },
    );

    let mut results = SearchResults::default();
    let mut totals = SearchTotals::default();
    if let Some((rows, count)) = users? {
        results.users = rows;
        totals.users = count;
    }
    if let Some((rows, count)) = projects? {
        results.projects = rows;
        totals.projects = count;
    }
    if let Some((rows, count)) = articles? {
        results.articles = rows;
        totals.articles = count;
    }
    if let Some((rows, count)) = posts? {
        results.posts = rows;
        totals.posts = count;
    }

    response.total_pages = [totals.users, totals.projects, totals.articles, totals.posts]
        .into_iter()
        .map(|count| pages(count, filter.limit))
        .max()
        .unwrap_or(0);
    response.results = results;
    response.totals = totals;
    tracing::debug!(
        kinds = kinds.len(),
        page,
        total_pages = response.total_pages,
        "search completed"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::HubDb;

    fn limits() -> SearchSection {
        SearchSection {
            default_limit: 12,
            max_limit: 50,
        }
    }

    fn query(content_types: &str) -> ExploreQuery {
        ExploreQuery {
            content_types: Some(content_types.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_defaults() -> anyhow::Result<()> {
        let req = SearchRequest::from_query(&ExploreQuery::default(), &limits())?;
        assert!(req.kinds.is_empty());
        assert_eq!(req.page, 1);
        assert_eq!(req.filter.limit, 12);
        assert_eq!(req.filter.offset, 0);
        assert_eq!(req.filter.sort, SortField::CreatedAt);
        assert_eq!(req.filter.order, SortOrder::Desc);
        Ok(())
    }

    #[test]
    fn test_request_parses_lists_and_paging() -> anyhow::Result<()> {
        let req = SearchRequest::from_query(
            &ExploreQuery {
                q: Some("  Rust ".into()),
                content_types: Some("users, posts,users".into()),
                user_types: Some("creator,brand".into()),
                page: Some("3".into()),
                limit: Some("500".into()),
                sort_by: Some("title".into()),
                sort_order: Some("ASC".into()),
            },
            &limits(),
        )?;
        assert_eq!(req.kinds, vec![EntityKind::User, EntityKind::Post]);
        assert_eq!(req.filter.q.as_deref(), Some("rust"));
        assert_eq!(req.filter.user_types, vec!["creator", "brand"]);
        assert_eq!(req.filter.limit, 50);
        assert_eq!(req.filter.offset, 100);
        assert_eq!(req.filter.sort, SortField::Title);
        assert_eq!(req.filter.order, SortOrder::Asc);
        Ok(())
    }

    #[test]
    fn test_request_rejects_bad_values() {
        let bad = [
            ExploreQuery { sort_by: Some("password_hash".into()), ..Default::default() },
            ExploreQuery { sort_order: Some("sideways".into()), ..Default::default() },
            ExploreQuery { page: Some("0".into()), ..Default::default() },
            ExploreQuery { limit: Some("ten".into()), ..Default::default() },
            query("users,comments"),
        ];
        for q in bad {
            assert!(matches!(
                SearchRequest::from_query(&q, &limits()),
                Err(HubError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_pages() {
        assert_eq!(pages(0, 10), 0);
        assert_eq!(pages(10, 10), 1);
        assert_eq!(pages(11, 10), 2);
    }

    #[tokio::test]
    async fn test_no_kinds_runs_no_queries() -> anyhow::Result<()> {
        let db = HubDb::new_in_memory()?;
        db.execute_raw("DROP TABLE post_comments; DROP TABLE posts; DROP TABLE interactions;")?;
        let handle = DbHandle::new(db);
        let req = SearchRequest::from_query(&ExploreQuery::default(), &limits())?;
        let resp = search_all(&handle, req).await?;
        assert!(resp.results.users.is_empty());
        assert!(resp.results.projects.is_empty());
        assert!(resp.results.articles.is_empty());
        assert!(resp.results.posts.is_empty());
        assert_eq!(resp.total_pages, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_selected_kinds_only_and_real_total_pages() -> anyhow::Result<()> {
        let db = HubDb::new_in_memory()?;
        for i in 0..5 {
            db.create_user(&format!("user{}", i), &format!("u{}@x.com", i), "h", "")?;
        }
        let handle = DbHandle::new(db);
        let req = SearchRequest::from_query(
            &ExploreQuery {
                content_types: Some("users".into()),
                limit: Some("2".into()),
                ..Default::default()
            },
            &limits(),
        )?;
        let resp = search_all(&handle, req).await?;
        assert_eq!(resp.results.users.len(), 2);
        assert_eq!(resp.totals.users, 5);
        assert_eq!(resp.total_pages, 3);
        assert!(resp.results.projects.is_empty());
        Ok(())
    }
}
