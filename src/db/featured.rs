use rusqlite::params;

use super::{HubDb, int, query_rows, text};
use crate::codec::Row;
use crate::errors::Result;
use crate::models::FeaturedItem;

/// Columns are aliased to the `FeaturedItem` keys; `excerpt` is raw text,
/// shortened by the caller.
fn item(row: &Row) -> FeaturedItem {
    FeaturedItem {
        id: int(row, "id"),
        title: text(row, "title"),
        media_url: text(row, "media_url"),
        excerpt: text(row, "excerpt"),
        user_id: int(row, "user_id"),
        username: text(row, "username"),
        user_type: text(row, "user_type"),
        created_at: text(row, "created_at"),
    }
}

impl HubDb {
    pub fn recent_users(&self, n: i64) -> Result<Vec<FeaturedItem>> {
        let rows = query_rows(
            &self.conn,
            "SELECT id, username AS title, profile_image AS media_url, bio AS excerpt,
                    id AS user_id, username, user_type, created_at
             FROM users ORDER BY created_at DESC, id DESC LIMIT ?1",
            params![n],
        )?;
        Ok(rows.iter().map(item).collect())
    }

    pub fn recent_projects(&self, n: i64) -> Result<Vec<FeaturedItem>> {
        let rows = query_rows(
            &self.conn,
            "SELECT p.id, p.project_name AS title, p.project_image AS media_url,
                    p.project_description AS excerpt, p.user_id, u.username, u.user_type, p.created_at
             FROM projects p JOIN users u ON u.id = p.user_id
             ORDER BY p.created_at DESC, p.id DESC LIMIT ?1",
            params![n],
        )?;
        Ok(rows.iter().map(item).collect())
    }

    /// Excerpt is the first section's text; media is the first section
    /// carrying a media URL.
    pub fn recent_articles(&self, n: i64) -> Result<Vec<FeaturedItem>> {
        let rows = query_rows(
            &self.conn,
            "SELECT a.id, a.title,
                    COALESCE((SELECT s.media_url FROM article_sections s
                              WHERE s.article_id = a.id AND s.media_url <> ''
                              ORDER BY s.section_order LIMIT 1), '') AS media_url,
                    COALESCE((SELECT s.text FROM article_sections s
                              WHERE s.article_id = a.id
                              ORDER BY s.section_order LIMIT 1), '') AS excerpt,
                    a.user_id, u.username, u.user_type, a.created_at
             FROM articles a JOIN users u ON u.id = a.user_id
             ORDER BY a.created_at DESC, a.id DESC LIMIT ?1",
            params![n],
        )?;
        Ok(rows.iter().map(item).collect())
    }

    pub fn recent_posts(&self, n: i64) -> Result<Vec<FeaturedItem>> {
        let rows = query_rows(
            &self.conn,
            "SELECT p.id, p.title,
                    CASE WHEN p.post_image_display = 'upload' THEN p.post_image_upload
                         ELSE p.post_image_url END AS media_url,
                    p.description AS excerpt, p.user_id, u.username, u.user_type, p.created_at
             FROM posts p JOIN users u ON u.id = p.user_id
             ORDER BY p.created_at DESC, p.id DESC LIMIT ?1",
            params![n],
        )?;
        Ok(rows.iter().map(item).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleInput, ProjectInput, Section, SectionKind};

    #[test]
    fn test_recent_is_bounded_and_newest_first() -> anyhow::Result<()> {
        let db = HubDb::new_in_memory()?;
        for i in 0..5 {
            db.create_user(&format!("u{}", i), &format!("u{}@x.com", i), "h", "/a.png")?;
        }
        let users = db.recent_users(3)?;
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].title, "u4");
        assert_eq!(users[0].media_url, "/a.png");
        Ok(())
    }

    #[test]
    fn test_project_media_aliases_image() -> anyhow::Result<()> {
        let db = HubDb::new_in_memory()?;
        let owner = db.create_user("o", "o@x.com", "h", "")?.id;
        db.create_project(
            owner,
            &ProjectInput {
                project_name: Some("Reel".into()),
                project_image: Some("/uploads/projects/r.png".into()),
                ..Default::default()
            },
        )?;
        let projects = db.recent_projects(3)?;
        assert_eq!(projects[0].title, "Reel");
        assert_eq!(projects[0].media_url, "/uploads/projects/r.png");
        assert_eq!(projects[0].username, "o");
        Ok(())
    }

    #[test]
    fn test_article_excerpt_and_media_come_from_sections() -> anyhow::Result<()> {
        let db = HubDb::new_in_memory()?;
        let owner = db.create_user("o", "o@x.com", "h", "")?.id;
        db.create_article(
            owner,
            ArticleInput {
                title: Some("Story".into()),
                sections: Some(vec![
                    Section {
                        text: "Opening paragraph".into(),
                        order: 0,
                        ..Default::default()
                    },
                    Section {
                        kind: SectionKind::FullWidthMedia,
                        media_url: "/uploads/articles/m.png".into(),
                        order: 1,
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            },
        )?;
        let articles = db.recent_articles(3)?;
        assert_eq!(articles[0].excerpt, "Opening paragraph");
        assert_eq!(articles[0].media_url, "/uploads/articles/m.png");
        Ok(())
    }
}
