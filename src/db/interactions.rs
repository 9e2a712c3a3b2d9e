use rusqlite::params;

use super::{HubDb, now};
use crate::errors::{HubError, Result};
use crate::models::{EntityKind, InteractionKind};

fn entity_table(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::User => "users",
        EntityKind::Project => "projects",
        EntityKind::Article => "articles",
        EntityKind::Post => "posts",
    }
}

impl HubDb {
    pub fn interaction_count(
        &self,
        kind: InteractionKind,
        entity: EntityKind,
        entity_id: i64,
    ) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM interactions WHERE kind = ?1 AND entity_type = ?2 AND entity_id = ?3",
            params![kind.as_str(), entity.as_str(), entity_id],
            |r| r.get(0),
        )?)
    }

    pub fn interaction_active(
        &self,
        kind: InteractionKind,
        entity: EntityKind,
        entity_id: i64,
        user_id: i64,
    ) -> Result<bool> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM interactions
             WHERE kind = ?1 AND entity_type = ?2 AND entity_id = ?3 AND user_id = ?4",
            params![kind.as_str(), entity.as_str(), entity_id, user_id],
            |r| r.get(0),
        )?;
        Ok(n > 0)
    }

    /// Record an interaction. A second create for the same
    /// `(kind, entity, user)` hits the unique index and becomes `Conflict`.
    pub fn create_interaction(
        &self,
        kind: InteractionKind,
        entity: EntityKind,
        entity_id: i64,
        user_id: i64,
    ) -> Result<()> {
        let exists: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE id = ?1", entity_table(entity)),
            params![entity_id],
            |r| r.get(0),
        )?;
        if exists == 0 {
            return Err(HubError::not_found(entity_label(entity), entity_id));
        }
        self.conn
            .execute(
                "INSERT INTO interactions (kind, entity_type, entity_id, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![kind.as_str(), entity.as_str(), entity_id, user_id, now()],
            )
            .map_err(|e| match HubError::from(e) {
                HubError::Conflict(_) => HubError::Conflict(format!(
                    "Already a {} on this {}",
                    kind.as_str(),
                    entity.as_str()
                )),
                other => other,
            })?;
        self.sync_post_likes(kind, entity, entity_id)?;
        tracing::debug!(
            kind = kind.as_str(),
            entity = entity.as_str(),
            entity_id,
            user_id,
            "interaction created"
        );
        Ok(())
    }

    pub fn delete_interaction(
        &self,
        kind: InteractionKind,
        entity: EntityKind,
        entity_id: i64,
        user_id: i64,
    ) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM interactions
             WHERE kind = ?1 AND entity_type = ?2 AND entity_id = ?3 AND user_id = ?4",
            params![kind.as_str(), entity.as_str(), entity_id, user_id],
        )?;
        if removed == 0 {
            return Err(HubError::NotFound(format!(
                "No {} on {} {}",
                kind.as_str(),
                entity.as_str(),
                entity_id
            )));
        }
        self.sync_post_likes(kind, entity, entity_id)
    }

    /// `posts.likes` mirrors the number of like rows on the post.
    fn sync_post_likes(
        &self,
        kind: InteractionKind,
        entity: EntityKind,
        entity_id: i64,
    ) -> Result<()> {
        if kind == InteractionKind::Like && entity == EntityKind::Post {
            self.conn.execute(
                "UPDATE posts SET likes = (
                    SELECT COUNT(*) FROM interactions
                    WHERE kind = ?1 AND entity_type = ?2 AND entity_id = ?3
                 ) WHERE id = ?3",
                params![kind.as_str(), entity.as_str(), entity_id],
            )?;
        }
        Ok(())
    }
}

impl HubDb {
    /// Owner-checked hard delete of a content row together with every
    /// like, follow and watch that targets it.
    pub(crate) fn delete_content(
        &self,
        entity: EntityKind,
        id: i64,
        acting_user: i64,
    ) -> Result<()> {
        let table = entity_table(entity);
        self.require_owner(table, entity_label(entity), id, acting_user)?;
        let tx = self.conn.unchecked_transaction()?;
        let purged = tx.execute(
            "DELETE FROM interactions WHERE entity_type = ?1 AND entity_id = ?2",
            params![entity.as_str(), id],
        )?;
        tx.execute(&format!("DELETE FROM {} WHERE id = ?1", table), params![id])?;
        tx.commit()?;
        tracing::info!(entity = entity.as_str(), entity_id = id, purged, "content deleted");
        Ok(())
    }
}

fn entity_label(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::User => "User",
        EntityKind::Project => "Project",
        EntityKind::Article => "Article",
        EntityKind::Post => "Post",
    }
}
