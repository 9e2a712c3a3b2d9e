use std::str::FromStr;

use rusqlite::{Connection, params};

use super::{HubDb, now};
use crate::errors::{HubError, Result};
use crate::models::{Article, ArticleInput, EntityKind, Section, SectionKind};
use crate::sections::{self, Direction};

struct ArticleRow {
    id: i64,
    user_id: i64,
    title: String,
    tags: String,
    citations: String,
    contributors: String,
    related_media: String,
    username: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ArticleRow {
    fn into_article(self, sections: Vec<Section>) -> Article {
        Article {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            tags: decode_list(&self.tags),
            citations: decode_list(&self.citations),
            contributors: decode_list(&self.contributors),
            related_media: decode_list(&self.related_media),
            sections,
            username: self.username.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn encode_list(items: &[String]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}

fn load_sections(conn: &Connection, article_id: i64) -> Result<Vec<Section>> {
    let mut stmt = conn.prepare(
        "SELECT section_type, title, text, media_url, media_type, media_subtext, section_order
         FROM article_sections WHERE article_id = ?1 ORDER BY section_order, id",
    )?;
    let rows = stmt.query_map(params![article_id], |row| {
        let kind: String = row.get(0)?;
        Ok(Section {
            kind: SectionKind::from_str(&kind).unwrap_or_default(),
            title: row.get(1)?,
            text: row.get(2)?,
            media_url: row.get(3)?,
            media_type: row.get(4)?,
            media_subtext: row.get(5)?,
            order: row.get(6)?,
        })
    })?;
    let mut sections = Vec::new();
    for row in rows {
        sections.push(row?);
    }
    Ok(sections)
}

/// Delete-all then re-insert; `order` is renumbered densely first.
fn replace_sections(conn: &Connection, article_id: i64, sections: Vec<Section>) -> Result<()> {
    conn.execute(
        "DELETE FROM article_sections WHERE article_id = ?1",
        params![article_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO article_sections
            (article_id, section_order, section_type, title, text, media_url, media_type, media_subtext)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for section in sections::normalize(sections) {
        stmt.execute(params![
            article_id,
            section.order,
            section.kind.as_str(),
            section.title,
            section.text,
            section.media_url,
            section.media_type,
            section.media_subtext,
        ])?;
    }
    Ok(())
}

const ARTICLE_SELECT: &str = "SELECT a.id, a.user_id, a.title, a.tags, a.citations, a.contributors,
        a.related_media, u.username, a.created_at, a.updated_at
     FROM articles a LEFT JOIN users u ON u.id = a.user_id";

fn map_article_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArticleRow> {
    Ok(ArticleRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        tags: row.get(3)?,
        citations: row.get(4)?,
        contributors: row.get(5)?,
        related_media: row.get(6)?,
        username: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl HubDb {
    pub fn create_article(&self, owner_id: i64, input: ArticleInput) -> Result<Article> {
        let title = input.title.unwrap_or_default();
        let ts = now();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO articles (user_id, title, tags, citations, contributors, related_media, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                owner_id,
                title,
                encode_list(&input.tags.unwrap_or_default())?,
                encode_list(&input.citations.unwrap_or_default())?,
                encode_list(&input.contributors.unwrap_or_default())?,
                encode_list(&input.related_media.unwrap_or_default())?,
                ts,
            ],
        )?;
        let id = tx.last_insert_rowid();
        replace_sections(&tx, id, input.sections.unwrap_or_default())?;
        tx.commit()?;
        tracing::info!(article_id = id, owner_id, "article created");
        self.get_article(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Article not found after insert")))
    }

    pub fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE a.id = ?1", ARTICLE_SELECT))?;
        let mut rows = stmt.query_map(params![id], map_article_row)?;
        match rows.next() {
            Some(row) => {
                let row = row?;
                let sections = load_sections(&self.conn, row.id)?;
                Ok(Some(row.into_article(sections)))
            }
            None => Ok(None),
        }
    }

    pub fn list_articles(
        &self,
        owner: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Article>> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR a.user_id = ?1) ORDER BY a.created_at DESC, a.id DESC LIMIT ?2 OFFSET ?3",
            ARTICLE_SELECT
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner, limit, offset], map_article_row)?;
        let mut articles = Vec::new();
        for row in rows {
            let row = row?;
            let sections = load_sections(&self.conn, row.id)?;
            articles.push(row.into_article(sections));
        }
        Ok(articles)
    }

    /// Update scalar fields that are present; a present `sections` list
    /// replaces every stored section.
    pub fn update_article(
        &self,
        id: i64,
        acting_user: i64,
        input: ArticleInput,
    ) -> Result<Article> {
        self.require_owner("articles", "Article", id, acting_user)?;
        let tx = self.conn.unchecked_transaction()?;
        if let Some(title) = input.title {
            tx.execute("UPDATE articles SET title = ?1 WHERE id = ?2", params![title, id])?;
        }
        for (column, list) in [
            ("tags", input.tags),
            ("citations", input.citations),
            ("contributors", input.contributors),
            ("related_media", input.related_media),
        ] {
            if let Some(list) = list {
                tx.execute(
                    &format!("UPDATE articles SET {} = ?1 WHERE id = ?2", column),
                    params![encode_list(&list)?, id],
                )?;
            }
        }
        if let Some(sections) = input.sections {
            replace_sections(&tx, id, sections)?;
        }
        tx.execute(
            "UPDATE articles SET updated_at = ?1 WHERE id = ?2",
            params![now(), id],
        )?;
        tx.commit()?;
        self.get_article(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Article not found after update")))
    }

    pub fn delete_article(&self, id: i64, acting_user: i64) -> Result<()> {
        self.delete_content(EntityKind::Article, id, acting_user)
    }

    /// Swap one section with its neighbour and persist the new order.
    pub fn move_article_section(
        &self,
        id: i64,
        acting_user: i64,
        index: usize,
        direction: Direction,
    ) -> Result<Article> {
        self.edit_sections(id, acting_user, |list| {
            sections::move_section(list, index, direction)
        })
    }

    pub fn insert_article_section(
        &self,
        id: i64,
        acting_user: i64,
        index: usize,
        section: Section,
    ) -> Result<Article> {
        self.edit_sections(id, acting_user, |list| sections::insert(list, index, section))
    }

    pub fn remove_article_section(
        &self,
        id: i64,
        acting_user: i64,
        index: usize,
    ) -> Result<Article> {
        self.edit_sections(id, acting_user, |list| {
            sections::remove(list, index).map(|_| ())
        })
    }

    /// Load, edit and rewrite the section list in one transaction.
    fn edit_sections<F>(&self, id: i64, acting_user: i64, edit: F) -> Result<Article>
    where
        F: FnOnce(&mut Vec<Section>) -> Result<()>,
    {
        self.require_owner("articles", "Article", id, acting_user)?;
        let tx = self.conn.unchecked_transaction()?;
        let mut current = load_sections(&tx, id)?;
        edit(&mut current)?;
        replace_sections(&tx, id, current)?;
        tx.execute(
            "UPDATE articles SET updated_at = ?1 WHERE id = ?2",
            params![now(), id],
        )?;
        tx.commit()?;
        self.get_article(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Article not found after update")))
    }

    pub fn set_section_media(
        &self,
        id: i64,
        acting_user: i64,
        index: usize,
        url: &str,
        media_type: &str,
    ) -> Result<Article> {
        self.require_owner("articles", "Article", id, acting_user)?;
        let changed = self.conn.execute(
            "UPDATE article_sections SET media_url = ?1, media_type = ?2
             WHERE article_id = ?3 AND section_order = ?4",
            params![url, media_type, id, index as i64],
        )?;
        if changed == 0 {
            return Err(HubError::NotFound(format!(
                "Article {} has no section at index {}",
                id, index
            )));
        }
        self.get_article(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Article not found after update")))
    }
}
