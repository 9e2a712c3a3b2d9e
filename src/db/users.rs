//! User aggregate persistence: the `users` row plus seven child tables.

use rusqlite::{Connection, params};
use serde_json::{Map, Value};

use super::{HubDb, insert_row, now, query_rows, update_row};
use crate::codec::{Fill, USER_LAYOUT, flatten, unflatten};
use crate::errors::{HubError, Result};
use crate::models::{ChildTable, USER_COLLECTIONS, User, UserPatch, UserSummary};

/// What login needs to verify a password.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Trimmed username; empty is rejected.
pub fn normalize_username(raw: &str) -> Result<String> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(HubError::validation("Username is required"));
    }
    Ok(username.to_string())
}

/// Trimmed, lowercased email; must contain `@` with text on both sides.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(HubError::validation("A valid email is required")),
    }
}

impl HubDb {
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        profile_image: &str,
    ) -> Result<User> {
        let username = normalize_username(username)?;
        let email = normalize_email(email)?;
        let mut nested = Map::new();
        nested.insert("username".into(), Value::from(username));
        nested.insert("email".into(), Value::from(email));
        nested.insert("profile_image".into(), Value::from(profile_image));

        let mut row = flatten(&USER_LAYOUT, &nested, Fill::All);
        let ts = now();
        row.insert("password_hash".into(), Value::from(password_hash));
        row.insert("created_at".into(), Value::from(ts.clone()));
        row.insert("updated_at".into(), Value::from(ts));

        let id = insert_row(&self.conn, "users", &row).map_err(|e| match e {
            HubError::Conflict(_) => {
                HubError::Conflict("A user with that email or username already exists".into())
            }
            other => other,
        })?;
        self.get_user(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("User not found after insert")))
    }

    pub fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, email, password_hash FROM users WHERE email = ?1 COLLATE NOCASE")?;
        let mut rows = stmt.query_map(params![email], |row| {
            Ok(Credentials {
                user_id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
            })
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn user_exists(&self, id: i64) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM users WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Load a user with every dependent collection, or `None` if absent.
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let mut rows = query_rows(&self.conn, "SELECT * FROM users WHERE id = ?1", params![id])?;
        let Some(row) = rows.pop() else {
            return Ok(None);
        };
        let mut nested = unflatten(&USER_LAYOUT, &row);
        for child in USER_COLLECTIONS {
            let rows = load_children(&self.conn, child, id)?;
            nested.insert(child.field.to_string(), Value::Array(rows));
        }
        Ok(Some(serde_json::from_value(Value::Object(nested))?))
    }

    pub fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<UserSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, user_type, bio, career_title, profile_image, created_at
             FROM users ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(params![limit, offset], |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                username: row.get(1)?,
                user_type: row.get(2)?,
                bio: row.get(3)?,
                career_title: row.get(4)?,
                profile_image: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    /// Apply a profile patch as one transaction.
    ///
    /// Scalar and grouped fields present in the patch overwrite their
    /// columns; each collection present is deleted and re-inserted; absent
    /// collections are left alone.
    pub fn update_user(&self, id: i64, acting_user: i64, patch: &UserPatch) -> Result<User> {
        if !self.user_exists(id)? {
            return Err(HubError::not_found("User", id));
        }
        if id != acting_user {
            return Err(HubError::forbidden("profile"));
        }

        let mut patch = patch.clone();
        if let Some(username) = patch.username.as_deref() {
            patch.username = Some(normalize_username(username)?);
        }
        if let Some(email) = patch.email.as_deref() {
            patch.email = Some(normalize_email(email)?);
        }

        let patch_map = match serde_json::to_value(&patch)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut row = flatten(&USER_LAYOUT, &patch_map, Fill::Present);
        row.insert("updated_at".into(), Value::from(now()));

        // Safety: DbHandle's Mutex already guarantees single-threaded access.
        let tx = self.conn.unchecked_transaction()?;
        update_row(&tx, "users", id, &row).map_err(|e| match e {
            HubError::Conflict(_) => {
                HubError::Conflict("Another user already has that email or username".into())
            }
            other => other,
        })?;
        for child in USER_COLLECTIONS {
            if let Some(Value::Array(items)) = patch_map.get(child.field) {
                replace_children(&tx, child, id, items)?;
            }
        }
        tx.commit()?;

        tracing::info!(user_id = id, "profile updated");
        self.get_user(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("User not found after update")))
    }

    pub fn set_profile_image(&self, id: i64, url: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE users SET profile_image = ?1, updated_at = ?2 WHERE id = ?3",
            params![url, now(), id],
        )?;
        if changed == 0 {
            return Err(HubError::not_found("User", id));
        }
        Ok(())
    }
}

fn load_children(conn: &Connection, child: &ChildTable, user_id: i64) -> Result<Vec<Value>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE user_id = ?1 ORDER BY sort_index, id",
        child.columns.join(", "),
        child.table
    );
    Ok(query_rows(conn, &sql, params![user_id])?
        .into_iter()
        .map(Value::Object)
        .collect())
}

fn replace_children(
    conn: &Connection,
    child: &ChildTable,
    user_id: i64,
    items: &[Value],
) -> Result<()> {
    conn.execute(
        &format!("DELETE FROM {} WHERE user_id = ?1", child.table),
        params![user_id],
    )?;
    for (index, item) in items.iter().enumerate() {
        let mut row = Map::new();
        row.insert("user_id".into(), Value::from(user_id));
        row.insert("sort_index".into(), Value::from(index as i64));
        for &col in child.columns {
            let v = item
                .get(col)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            row.insert(col.to_string(), Value::String(v));
        }
        insert_row(conn, child.table, &row)?;
    }
    Ok(())
}
