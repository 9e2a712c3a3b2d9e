//! Landing-page snapshot of the most recent content of every kind.
//!
//! A failing kind degrades to an empty list with a warning; the snapshot
//! itself never fails.

use crate::db::DbHandle;
use crate::errors::Result;
use crate::hub_config::FeaturedSection;
use crate::models::{FeaturedContent, FeaturedItem};

/// Truncate to `max` characters, appending `...` only when something was cut.
pub fn excerpt(text: &str, max: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn degrade(
    kind: &str,
    result: Result<Vec<FeaturedItem>>,
    excerpt_chars: usize,
) -> Vec<FeaturedItem> {
    match result {
        Ok(mut items) => {
            for item in &mut items {
                item.excerpt = excerpt(&item.excerpt, excerpt_chars);
            }
            items
        }
        Err(e) => {
            tracing::warn!(kind, error = %e, "featured content query failed; returning empty list");
            Vec::new()
        }
    }
}

pub async fn featured_content(db: &DbHandle, cfg: &FeaturedSection) -> FeaturedContent {
    let n = i64::from(cfg.per_kind);
    let (users, projects, articles, posts) = tokio::join!(
        db.call(move |db| db.recent_users(n)),
        db.call(move |db| db.recent_projects(n)),
        db.call(move |db| db.recent_articles(n)),
        db.call(move |db| db.recent_posts(n)),
    );
    FeaturedContent {
        users: degrade("users", users, cfg.excerpt_chars),
        projects: degrade("projects", projects, cfg.excerpt_chars),
        articles: degrade("articles", articles, cfg.excerpt_chars),
        posts: degrade("posts", posts, cfg.excerpt_chars),
    }
}
