use rusqlite::params;
use serde_json::{Map, Value};

use super::{HubDb, insert_row, now, query_rows, update_row};
use crate::codec::{
    Fill, PROJECT_LAYOUT, PROJECT_OBJECT_LISTS, Row, flatten, parse_json_array, unflatten,
};
use crate::errors::{HubError, Result};
use crate::models::{EntityKind, Project, ProjectInput};

fn input_map(input: &ProjectInput) -> Result<Map<String, Value>> {
    match serde_json::to_value(input)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

fn project_from_row(row: &Row) -> Result<Project> {
    Ok(serde_json::from_value(Value::Object(unflatten(&PROJECT_LAYOUT, row)))?)
}

impl HubDb {
    pub fn create_project(&self, owner_id: i64, input: &ProjectInput) -> Result<Project> {
        let mut row = flatten(&PROJECT_LAYOUT, &input_map(input)?, Fill::All);
        let ts = now();
        row.insert("user_id".into(), Value::from(owner_id));
        row.insert("created_at".into(), Value::from(ts.clone()));
        row.insert("updated_at".into(), Value::from(ts));
        let id = insert_row(&self.conn, "projects", &row)?;
        tracing::info!(project_id = id, owner_id, "project created");
        self.get_project(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Project not found after insert")))
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let rows = query_rows(&self.conn, "SELECT * FROM projects WHERE id = ?1", params![id])?;
        rows.first().map(project_from_row).transpose()
    }

    pub fn list_projects(
        &self,
        owner: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Project>> {
        let rows = match owner {
            Some(user_id) => query_rows(
                &self.conn,
                "SELECT * FROM projects WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
                params![user_id, limit, offset],
            )?,
            None => query_rows(
                &self.conn,
                "SELECT * FROM projects ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
                params![limit, offset],
            )?,
        };
        rows.iter().map(project_from_row).collect()
    }

    pub fn update_project(
        &self,
        id: i64,
        acting_user: i64,
        input: &ProjectInput,
    ) -> Result<Project> {
        self.require_owner("projects", "Project", id, acting_user)?;
        let mut row = flatten(&PROJECT_LAYOUT, &input_map(input)?, Fill::Present);
        row.insert("updated_at".into(), Value::from(now()));
        update_row(&self.conn, "projects", id, &row)?;
        self.get_project(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Project not found after update")))
    }

    pub fn delete_project(&self, id: i64, acting_user: i64) -> Result<()> {
        self.delete_content(EntityKind::Project, id, acting_user)
    }

    pub fn set_project_image(&self, id: i64, acting_user: i64, url: &str) -> Result<Project> {
        self.require_owner("projects", "Project", id, acting_user)?;
        self.conn.execute(
            "UPDATE projects SET project_image = ?1, updated_at = ?2 WHERE id = ?3",
            params![url, now(), id],
        )?;
        self.get_project(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Project not found after update")))
    }

    /// Set `media` on one element of a project list field, leaving the
    /// other elements as stored.
    pub fn set_project_list_media(
        &self,
        id: i64,
        acting_user: i64,
        field: &str,
        index: usize,
        url: &str,
    ) -> Result<Project> {
        let Some(&field) = PROJECT_OBJECT_LISTS.iter().find(|f| **f == field) else {
            return Err(HubError::validation(format!(
                "Field '{}' does not accept media; expected one of {}",
                field,
                PROJECT_OBJECT_LISTS.join(", ")
            )));
        };
        self.require_owner("projects", "Project", id, acting_user)?;

        let tx = self.conn.unchecked_transaction()?;
        let stored: String = tx.query_row(
            &format!("SELECT {} FROM projects WHERE id = ?1", field),
            params![id],
            |row| row.get(0),
        )?;
        let mut items = parse_json_array(&Value::String(stored));
        let Some(item) = items.get_mut(index) else {
            return Err(HubError::NotFound(format!(
                "{} has no element at index {}",
                field, index
            )));
        };
        match item {
            Value::Object(obj) => {
                obj.insert("media".into(), Value::from(url));
            }
            other => {
                let mut obj = Map::new();
                obj.insert("media".into(), Value::from(url));
                *other = Value::Object(obj);
            }
        }
        tx.execute(
            &format!("UPDATE projects SET {} = ?1, updated_at = ?2 WHERE id = ?3", field),
            params![Value::Array(items).to_string(), now(), id],
        )?;
        tx.commit()?;

        self.get_project(id)?
            .ok_or_else(|| HubError::Persistence(anyhow::anyhow!("Project not found after update")))
    }
}
