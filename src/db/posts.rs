use std::str::FromStr;

use rusqlite::params;

use super::{HubDb, int, now, query_rows, string_list, text};
use crate::codec::Row;
use crate::errors::{HubError, Result};
use crate::models::{Comment, EntityKind, ImageSource, InteractionKind, Post, PostInput};

const POST_SELECT: &str = "SELECT p.*, COALESCE(u.username, '') AS username,
        (SELECT COUNT(*) FROM post_comments c WHERE c.post_id = p.id) AS comment_count
     FROM posts p LEFT JOIN users u ON u.id = p.user_id";

fn post_from_row(row: &Row) -> Post {
    Post {
        id: int(row, "id"),
        user_id: int(row, "user_id"),
        title: text(row, "title"),
        description: text(row, "description"),
        post_image_url: text(row, "post_image_url"),
        post_image_upload: text(row, "post_image_upload"),
        post_image_display: ImageSource::from_str(&text(row, "post_image_display"))
            .unwrap_or_default(),
        tags: string_list(row.get("tags")),
        likes: int(row, "likes"),
        comment_count: int(row, "comment_count"),
        comments: Vec::new(),
        username: text(row, "username"),
        created_at: text(row, "created_at"),
        updated_at: text(row, "updated_at"),
    }
}

impl HubDb {
    pub fn create_post(&self, owner_id: i64, input: PostInput) -> Result<Post> {
        let title = input.title.unwrap_or_default();
        if title.trim().is_empty() {
            return Err(HubError::validation("Post title is required"));
        }
        let ts = now();
        self.conn.execute(
            "INSERT INTO posts (user_id, title, description, post_image_url, post_image_display, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                owner_id,
                title,
                input.description.unwrap_or_default(),
                input.post_image_url.unwrap_or_default(),
                input.post_image_display.unwrap_or_default().as_str(),
                serde_json::to_string(&input.tags.unwrap_or_default())?,
                ts,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(post_id = id, owner_id, "post created");
        self.get_post(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Post not found after insert")))
    }

    /// Single-post read: fills `comments` as well as `comment_count`.
    pub fn get_post(&self, id: i64) -> Result<Option<Post>> {
        let rows = query_rows(
            &self.conn,
            &format!("{} WHERE p.id = ?1", POST_SELECT),
            params![id],
        )?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let mut post = post_from_row(row);
        post.comments = self.list_comments(id)?;
        Ok(Some(post))
    }

    pub fn list_posts(&self, owner: Option<i64>, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let rows = query_rows(
            &self.conn,
            &format!(
                "{} WHERE (?1 IS NULL OR p.user_id = ?1) ORDER BY p.created_at DESC, p.id DESC LIMIT ?2 OFFSET ?3",
                POST_SELECT
            ),
            params![owner, limit, offset],
        )?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    pub fn update_post(&self, id: i64, acting_user: i64, input: PostInput) -> Result<Post> {
        self.require_owner("posts", "Post", id, acting_user)?;
        if let Some(title) = &input.title {
            if title.trim().is_empty() {
                return Err(HubError::validation("Post title cannot be empty"));
            }
        }
        let tags = input.tags.map(|t| serde_json::to_string(&t)).transpose()?;
        self.conn.execute(
            "UPDATE posts SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                post_image_url = COALESCE(?3, post_image_url),
                post_image_display = COALESCE(?4, post_image_display),
                tags = COALESCE(?5, tags),
                updated_at = ?6
             WHERE id = ?7",
            params![
                input.title,
                input.description,
                input.post_image_url,
                input.post_image_display.map(|d| d.as_str()),
                tags,
                now(),
                id,
            ],
        )?;
        self.get_post(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Post not found after update")))
    }

    pub fn delete_post(&self, id: i64, acting_user: i64) -> Result<()> {
        self.delete_content(EntityKind::Post, id, acting_user)
    }

    /// Store an uploaded image and make it the displayed one.
    pub fn set_post_image(&self, id: i64, acting_user: i64, url: &str) -> Result<Post> {
        self.require_owner("posts", "Post", id, acting_user)?;
        self.conn.execute(
            "UPDATE posts SET post_image_upload = ?1, post_image_display = 'upload', updated_at = ?2 WHERE id = ?3",
            params![url, now(), id],
        )?;
        self.get_post(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Post not found after update")))
    }

    /// Record `user_id`'s like on the post and return the new total.
    /// Liking twice is a `Conflict`.
    pub fn like_post(&self, id: i64, user_id: i64) -> Result<i64> {
        self.create_interaction(InteractionKind::Like, EntityKind::Post, id, user_id)?;
        Ok(self
            .conn
            .query_row("SELECT likes FROM posts WHERE id = ?1", params![id], |r| r.get(0))?)
    }

    pub fn add_comment(&self, post_id: i64, user_id: i64, body: &str) -> Result<Comment> {
        let body = body.trim();
        if body.is_empty() {
            return Err(HubError::validation("Comment text is required"));
        }
        let exists: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE id = ?1",
            params![post_id],
            |r| r.get(0),
        )?;
        if exists == 0 {
            return Err(HubError::not_found("Post", post_id));
        }
        self.conn.execute(
            "INSERT INTO post_comments (post_id, user_id, text, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![post_id, user_id, body, now()],
        )?;
        let id = self.conn.last_insert_rowid();
        self.list_comments(post_id)?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Comment not found after insert")))
    }

    /// Comments oldest first, each with its author's username.
    pub fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = query_rows(
            &self.conn,
            "SELECT c.id, c.post_id, c.user_id, COALESCE(u.username, '') AS username, c.text, c.created_at
             FROM post_comments c LEFT JOIN users u ON u.id = c.user_id
             WHERE c.post_id = ?1 ORDER BY c.created_at, c.id",
            params![post_id],
        )?;
        Ok(rows
            .iter()
            .map(|row| Comment {
                id: int(row, "id"),
                post_id: int(row, "post_id"),
                user_id: int(row, "user_id"),
                username: text(row, "username"),
                text: text(row, "text"),
                created_at: text(row, "created_at"),
            })
            .collect())
    }
}
