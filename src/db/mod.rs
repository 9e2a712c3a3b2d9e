//! SQLite persistence.
//!
//! `HubDb` owns a single connection; `DbHandle` shares it across request
//! handlers and runs every access on tokio's blocking pool. Entity-specific
//! queries live in the submodules as further `impl HubDb` blocks.

pub mod articles;
pub mod featured;
pub mod interactions;
pub mod posts;
pub mod projects;
pub mod search;
pub mod users;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde_json::Value;

use crate::codec::{EntityLayout, GroupKind, PROJECT_LAYOUT, Row, USER_LAYOUT};
use crate::errors::{HubError, Result};
use crate::models::USER_COLLECTIONS;

/// SQL function folding case over all of Unicode; built-in `LOWER` only
/// folds ASCII.
pub(crate) const UNICODE_LOWER: &str = "unicode_lower";

/// Async-safe handle to the database.
///
/// Wraps `HubDb` behind `Arc<Mutex>`; all access runs via `spawn_blocking`
/// so synchronous SQLite I/O never occupies an async worker.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<HubDb>>,
}

impl DbHandle {
    pub fn new(db: HubDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&HubDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| HubError::Persistence(anyhow::anyhow!("DB lock poisoned: {}", e)))?;
            f(&guard)
        })
        .await
        .map_err(|e| HubError::Persistence(anyhow::Error::new(e).context("DB task panicked")))?
    }
}

pub struct HubDb {
    conn: Connection,
}

impl HubDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> anyhow::Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        self.conn
            .create_scalar_function(
                UNICODE_LOWER,
                1,
                FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
                |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
            )
            .context("Failed to register unicode_lower")?;
        self.run_migrations().context("Failed to run migrations")?;
        Ok(())
    }

    fn run_migrations(&self) -> anyhow::Result<()> {
        let users = format!(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE COLLATE NOCASE,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                {},
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
            layout_column_ddl(&USER_LAYOUT, &["username", "email"])
        );
        self.conn
            .execute_batch(&users)
            .context("Failed to create users table")?;

        for child in USER_COLLECTIONS {
            let cols: Vec<String> = child
                .columns
                .iter()
                .map(|c| format!("{} TEXT NOT NULL DEFAULT ''", c))
                .collect();
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    sort_index INTEGER NOT NULL DEFAULT 0,
                    {cols}
                );
                CREATE INDEX IF NOT EXISTS idx_{table}_user ON {table}(user_id);",
                table = child.table,
                cols = cols.join(",\n                    ")
            );
            self.conn
                .execute_batch(&ddl)
                .with_context(|| format!("Failed to create {} table", child.table))?;
        }

        let projects = format!(
            "CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                {},
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id);",
            layout_column_ddl(&PROJECT_LAYOUT, &[])
        );
        self.conn
            .execute_batch(&projects)
            .context("Failed to create projects table")?;

        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS articles (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    title TEXT NOT NULL,
                    tags TEXT NOT NULL DEFAULT '[]',
                    citations TEXT NOT NULL DEFAULT '[]',
                    contributors TEXT NOT NULL DEFAULT '[]',
                    related_media TEXT NOT NULL DEFAULT '[]',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS article_sections (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
                    section_order INTEGER NOT NULL,
                    section_type TEXT NOT NULL DEFAULT 'full-width-text',
                    title TEXT NOT NULL DEFAULT '',
                    text TEXT NOT NULL DEFAULT '',
                    media_url TEXT NOT NULL DEFAULT '',
                    media_type TEXT NOT NULL DEFAULT '',
                    media_subtext TEXT NOT NULL DEFAULT ''
                );

                CREATE TABLE IF NOT EXISTS posts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    post_image_url TEXT NOT NULL DEFAULT '',
                    post_image_upload TEXT NOT NULL DEFAULT '',
                    post_image_display TEXT NOT NULL DEFAULT 'url',
                    tags TEXT NOT NULL DEFAULT '[]',
                    likes INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS post_comments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    text TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS interactions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    kind TEXT NOT NULL,
                    entity_type TEXT NOT NULL,
                    entity_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL,
                    UNIQUE(kind, entity_type, entity_id, user_id)
                );

                CREATE INDEX IF NOT EXISTS idx_articles_user ON articles(user_id);
                CREATE INDEX IF NOT EXISTS idx_sections_article ON article_sections(article_id, section_order);
                CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id);
                CREATE INDEX IF NOT EXISTS idx_comments_post ON post_comments(post_id);
                CREATE INDEX IF NOT EXISTS idx_interactions_entity ON interactions(kind, entity_type, entity_id);
                ",
            )
            .context("Failed to create content tables")?;

        Ok(())
    }

    /// Ownership gate shared by every mutating operation on user-owned rows.
    /// Missing rows are `NotFound`; rows owned by someone else are
    /// `Authorization`.
    pub(crate) fn require_owner(
        &self,
        table: &str,
        what: &str,
        id: i64,
        acting_user: i64,
    ) -> Result<()> {
        check_ident(table)?;
        let owner: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT user_id FROM {} WHERE id = ?1", table),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        match owner {
            None => Err(HubError::not_found(what, id)),
            Some(owner) if owner != acting_user => Err(HubError::forbidden(&what.to_lowercase())),
            Some(_) => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

// ── Row helpers ───────────────────────────────────────────────────────

/// RFC 3339 UTC timestamp with millisecond precision (sorts lexically).
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Column DDL for every writable column of a layout, minus `skip`.
fn layout_column_ddl(layout: &EntityLayout, skip: &[&str]) -> String {
    let mut cols = Vec::new();
    for &c in layout.text_columns {
        if !skip.contains(&c) {
            cols.push(format!("{} TEXT NOT NULL DEFAULT ''", c));
        }
    }
    for &c in layout.int_columns {
        cols.push(format!("{} INTEGER NOT NULL DEFAULT 0", c));
    }
    for group in layout.groups {
        for &key in group.keys {
            let ddl = match group.kind {
                GroupKind::Text => "TEXT NOT NULL DEFAULT ''",
                GroupKind::Flag => "INTEGER NOT NULL DEFAULT 0",
            };
            cols.push(format!("{} {}", group.column(key), ddl));
        }
    }
    for &c in layout.json_columns {
        cols.push(format!("{} TEXT NOT NULL DEFAULT '[]'", c));
    }
    cols.join(",\n                ")
}

fn to_sql(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
    }
}

/// Column names only ever come from static layouts; reject anything else.
fn check_ident(name: &str) -> Result<()> {
    if !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        Ok(())
    } else {
        Err(HubError::Persistence(anyhow::anyhow!("Invalid column name: {}", name)))
    }
}

/// Run a query and return each row as a column-name → JSON map.
pub(crate) fn query_rows<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut map = Row::new();
        for (idx, name) in names.iter().enumerate() {
            map.insert(name.clone(), from_sql(row.get_ref(idx)?));
        }
        out.push(map);
    }
    Ok(out)
}

/// Insert a flat row and return its rowid.
pub(crate) fn insert_row(conn: &Connection, table: &str, row: &Row) -> Result<i64> {
    check_ident(table)?;
    let mut cols = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (col, v) in row {
        check_ident(col)?;
        cols.push(col.as_str());
        values.push(to_sql(v));
    }
    let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        cols.join(", "),
        placeholders.join(", ")
    );
    conn.execute(&sql, params_from_iter(values))?;
    Ok(conn.last_insert_rowid())
}

/// Update the given columns of one row. Returns the number of rows touched.
pub(crate) fn update_row(conn: &Connection, table: &str, id: i64, row: &Row) -> Result<usize> {
    check_ident(table)?;
    if row.is_empty() {
        return Ok(0);
    }
    let mut sets = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len() + 1);
    for (idx, (col, v)) in row.iter().enumerate() {
        check_ident(col)?;
        sets.push(format!("{} = ?{}", col, idx + 1));
        values.push(to_sql(v));
    }
    values.push(SqlValue::Integer(id));
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        table,
        sets.join(", "),
        values.len()
    );
    Ok(conn.execute(&sql, params_from_iter(values))?)
}

/// Decode a JSON-text column of strings, tolerating garbage.
pub(crate) fn string_list(v: Option<&Value>) -> Vec<String> {
    v.map(crate::codec::parse_json_array)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

pub(crate) fn text(row: &Row, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

pub(crate) fn int(row: &Row, key: &str) -> i64 {
    row.get(key).and_then(Value::as_i64).unwrap_or(0)
}
