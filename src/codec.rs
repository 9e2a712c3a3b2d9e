//! Entity codec: nested API shapes ⇄ flat persisted rows.
//!
//! The client speaks in nested objects (`social_links.github`,
//! `seeking.brand`, `team_members: [...]`). SQLite stores one scalar per
//! column, so each entity is described by an [`EntityLayout`]:
//!
//! - **text / int columns** copy straight across (ints are coerced
//!   leniently, `"12"` → `12`, `"abc"` → `0`)
//! - **groups** flatten to `{group}_{key}` columns (`social_links_github`)
//! - **json columns** hold arrays serialised as JSON text
//!
//! `flatten` never fails. `unflatten` never fails either: unparseable JSON
//! text degrades to an empty array.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

pub type Row = Map<String, Value>;

/// Value type shared by every key of a flattened group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Strings, defaulting to `""`.
    Text,
    /// Booleans stored as 0/1, defaulting to `false`.
    Flag,
}

#[derive(Debug)]
pub struct Group {
    pub name: &'static str,
    pub kind: GroupKind,
    pub keys: &'static [&'static str],
}

impl Group {
    pub fn column(&self, key: &str) -> String {
        format!("{}_{}", self.name, key)
    }
}

#[derive(Debug)]
pub struct EntityLayout {
    pub table: &'static str,
    /// Copied verbatim in both directions; never written by updates.
    pub passthrough: &'static [&'static str],
    pub text_columns: &'static [&'static str],
    pub int_columns: &'static [&'static str],
    pub groups: &'static [Group],
    pub json_columns: &'static [&'static str],
}

impl EntityLayout {
    /// Every column this layout writes, in a stable order.
    pub fn writable_columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = self
            .text_columns
            .iter()
            .chain(self.int_columns)
            .map(|c| c.to_string())
            .collect();
        for group in self.groups {
            cols.extend(group.keys.iter().map(|k| group.column(k)));
        }
        cols.extend(self.json_columns.iter().map(|c| c.to_string()));
        cols
    }
}

/// How `flatten` treats keys missing from the nested input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Emit every column, defaulting what is absent (inserts).
    All,
    /// Emit only columns whose nested key is present (partial updates).
    /// A present group still emits all of its columns.
    Present,
}

const SOCIAL_KEYS: &[&str] = &["youtube", "instagram", "github", "twitter", "linkedin"];
const NOTIFICATION_KEYS: &[&str] = &["email", "push", "digest"];

pub const SOCIAL_LINKS: Group = Group {
    name: "social_links",
    kind: GroupKind::Text,
    keys: SOCIAL_KEYS,
};

pub const NOTIFICATION_PREFERENCES: Group = Group {
    name: "notification_preferences",
    kind: GroupKind::Flag,
    keys: NOTIFICATION_KEYS,
};

pub const SEEKING: Group = Group {
    name: "seeking",
    kind: GroupKind::Flag,
    keys: &["creator", "brand", "freelancer", "contractor"],
};

pub static USER_LAYOUT: EntityLayout = EntityLayout {
    table: "users",
    passthrough: &["id", "created_at", "updated_at"],
    text_columns: &[
        "username",
        "email",
        "profile_image",
        "bio",
        "user_type",
        "career_title",
        "social_media_handle",
        "company",
        "company_location",
        "company_website",
        "contract_type",
        "contract_duration",
        "contract_rate",
        "availability_status",
        "preferred_work_type",
        "rate_range",
        "currency",
        "standard_rate",
        "rate_type",
        "compensation_type",
        "website",
    ],
    int_columns: &["career_experience", "social_media_followers"],
    groups: &[SOCIAL_LINKS, NOTIFICATION_PREFERENCES],
    json_columns: &[
        "skills",
        "expertise",
        "target_audience",
        "solutions_offered",
        "interest_tags",
        "experience_tags",
        "education_tags",
    ],
};

/// Project list fields whose elements are objects (and may carry `media`).
pub const PROJECT_OBJECT_LISTS: &[&str] = &[
    "team_members",
    "collaborators",
    "advisors",
    "partners",
    "testimonials",
    "deliverables",
    "milestones",
];

pub static PROJECT_LAYOUT: EntityLayout = EntityLayout {
    table: "projects",
    passthrough: &["id", "user_id", "created_at", "updated_at"],
    text_columns: &[
        "project_name",
        "project_description",
        "project_type",
        "project_category",
        "project_image",
        "project_title",
        "project_duration",
        "project_handle",
        "client",
        "client_location",
        "client_website",
        "contract_type",
        "contract_duration",
        "contract_value",
        "project_timeline",
        "budget",
        "project_status",
        "preferred_collaboration_type",
        "budget_range",
        "currency",
        "standard_rate",
        "rate_type",
        "compensation_type",
        "visibility",
    ],
    int_columns: &["project_followers"],
    groups: &[SEEKING, SOCIAL_LINKS, NOTIFICATION_PREFERENCES],
    json_columns: &[
        "skills_required",
        "expertise_needed",
        "target_audience",
        "solutions_offered",
        "project_tags",
        "industry_tags",
        "technology_tags",
        "website_links",
        "team_members",
        "collaborators",
        "advisors",
        "partners",
        "testimonials",
        "deliverables",
        "milestones",
    ],
};

/// Nested → flat. Columns outside the layout are dropped.
pub fn flatten(layout: &EntityLayout, nested: &Map<String, Value>, fill: Fill) -> Row {
    let mut row = Row::new();

    for &col in layout.passthrough {
        if let Some(v) = nested.get(col) {
            row.insert(col.to_string(), v.clone());
        }
    }

    for &col in layout.text_columns {
        match nested.get(col) {
            Some(v) => {
                row.insert(col.to_string(), Value::String(text_of(v)));
            }
            None if fill == Fill::All => {
                row.insert(col.to_string(), Value::String(String::new()));
            }
            None => {}
        }
    }

    for &col in layout.int_columns {
        match nested.get(col) {
            Some(v) => {
                row.insert(col.to_string(), Value::from(coerce_int(v)));
            }
            None if fill == Fill::All => {
                row.insert(col.to_string(), Value::from(0));
            }
            None => {}
        }
    }

    for group in layout.groups {
        let source = nested.get(group.name);
        if source.is_none() && fill == Fill::Present {
            continue;
        }
        let empty = Map::new();
        let obj = source.and_then(Value::as_object).unwrap_or(&empty);
        for &key in group.keys {
            let flat = match group.kind {
                GroupKind::Text => Value::String(obj.get(key).map(text_of).unwrap_or_default()),
                GroupKind::Flag => Value::from(i64::from(obj.get(key).is_some_and(truthy))),
            };
            row.insert(group.column(key), flat);
        }
    }

    for &col in layout.json_columns {
        let encoded = match nested.get(col) {
            Some(Value::Null) => "[]".to_string(),
            Some(v) => v.to_string(),
            None if fill == Fill::All => "[]".to_string(),
            None => continue,
        };
        row.insert(col.to_string(), Value::String(encoded));
    }

    row
}

/// Flat → nested. Columns outside the layout (e.g. `password_hash`) are dropped.
pub fn unflatten(layout: &EntityLayout, row: &Row) -> Map<String, Value> {
    let mut nested = Map::new();

    for &col in layout.passthrough {
        if let Some(v) = row.get(col) {
            nested.insert(col.to_string(), v.clone());
        }
    }

    for &col in layout.text_columns {
        let v = row.get(col).map(text_of).unwrap_or_default();
        nested.insert(col.to_string(), Value::String(v));
    }

    for &col in layout.int_columns {
        let v = row.get(col).map(coerce_int).unwrap_or(0);
        nested.insert(col.to_string(), Value::from(v));
    }

    for group in layout.groups {
        let mut obj = Map::new();
        for &key in group.keys {
            let flat = row.get(&group.column(key));
            let v = match group.kind {
                GroupKind::Text => Value::String(flat.map(text_of).unwrap_or_default()),
                GroupKind::Flag => Value::Bool(flat.is_some_and(truthy)),
            };
            obj.insert(key.to_string(), v);
        }
        nested.insert(group.name.to_string(), Value::Object(obj));
    }

    for &col in layout.json_columns {
        let parsed = row.get(col).map(parse_json_array).unwrap_or_default();
        nested.insert(col.to_string(), Value::Array(parsed));
    }

    nested
}

/// Decode a JSON-text column. Anything that is not a JSON array becomes `[]`.
pub fn parse_json_array(v: &Value) -> Vec<Value> {
    match v {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        Value::Array(items) => items.clone(),
        _ => Vec::new(),
    }
}

/// `parseInt(v, 10) || 0`: leading optional sign and digits, else zero.
pub fn coerce_int(v: &Value) -> i64 {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_leading_int(s),
        _ => 0,
    }
}

fn parse_leading_int(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s == "true" || s == "1",
        _ => false,
    }
}

/// Serde adapter for integer fields the client may send as strings.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(coerce_int(&v))
}

/// Same as [`lenient_int`] for optional patch fields.
pub fn lenient_int_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().map(coerce_int))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    fn full_user() -> Map<String, Value> {
        let mut nested = unflatten(&USER_LAYOUT, &Row::new());
        nested.insert("id".into(), json!(7));
        nested.insert("username".into(), json!("alice"));
        nested.insert("bio".into(), json!("Makes videos"));
        nested.insert("career_experience".into(), json!(6));
        nested.insert(
            "social_links".into(),
            json!({
                "youtube": "yt/alice",
                "instagram": "",
                "github": "gh/alice",
                "twitter": "",
                "linkedin": "in/alice",
            }),
        );
        nested.insert(
            "notification_preferences".into(),
            json!({"email": true, "push": false, "digest": true}),
        );
        nested.insert("skills".into(), json!(["editing", "scripting"]));
        nested
    }

    #[test]
    fn user_roundtrip_is_lossless() {
        let nested = full_user();
        let row = flatten(&USER_LAYOUT, &nested, Fill::All);
        assert_eq!(row["social_links_github"], json!("gh/alice"));
        assert_eq!(row["notification_preferences_digest"], json!(1));
        assert_eq!(row["skills"], json!("[\"editing\",\"scripting\"]"));
        assert_eq!(unflatten(&USER_LAYOUT, &row), nested);
    }

    #[test]
    fn project_roundtrip_keeps_object_lists() {
        let mut nested = unflatten(&PROJECT_LAYOUT, &Row::new());
        nested.insert("project_name".into(), json!("Launch"));
        nested.insert("project_type".into(), json!("freelance_services"));
        nested.insert(
            "team_members".into(),
            json!([
                {"name": "Bob", "role": "dev"},
                {"name": "Eve", "role": "design", "media": "/uploads/x.png"},
            ]),
        );
        nested.insert(
            "seeking".into(),
            json!({"creator": true, "brand": false, "freelancer": true, "contractor": false}),
        );
        let row = flatten(&PROJECT_LAYOUT, &nested, Fill::All);
        assert!(row["team_members"].is_string());
        assert_eq!(unflatten(&PROJECT_LAYOUT, &row), nested);
    }

    #[test]
    fn flatten_defaults_missing_groups() {
        let row = flatten(&USER_LAYOUT, &obj(json!({"username": "bob"})), Fill::All);
        assert_eq!(row["social_links_youtube"], json!(""));
        assert_eq!(row["notification_preferences_email"], json!(0));
        assert_eq!(row["skills"], json!("[]"));
        assert_eq!(row["career_experience"], json!(0));
    }

    #[test]
    fn flatten_partial_group_fills_remaining_keys() {
        let row = flatten(
            &USER_LAYOUT,
            &obj(json!({"social_links": {"github": "gh/x"}})),
            Fill::Present,
        );
        assert_eq!(row["social_links_github"], json!("gh/x"));
        assert_eq!(row["social_links_twitter"], json!(""));
        assert!(!row.contains_key("notification_preferences_email"));
        assert!(!row.contains_key("username"));
    }

    #[test]
    fn flatten_present_only_emits_given_keys() {
        let row = flatten(&USER_LAYOUT, &obj(json!({"bio": "hi"})), Fill::Present);
        assert_eq!(row.len(), 1);
        assert_eq!(row["bio"], json!("hi"));
    }

    #[test]
    fn flatten_null_json_list_becomes_empty_array() {
        let row = flatten(&PROJECT_LAYOUT, &obj(json!({"milestones": null})), Fill::Present);
        assert_eq!(row["milestones"], json!("[]"));
    }

    #[test]
    fn flatten_drops_unknown_columns() {
        let row = flatten(
            &USER_LAYOUT,
            &obj(json!({"password_hash": "x", "bogus; DROP TABLE users": 1})),
            Fill::Present,
        );
        assert!(row.is_empty());
    }

    #[test]
    fn unflatten_bad_json_degrades_to_empty() {
        let row = obj(json!({"team_members": "{not json", "milestones": "{\"a\":1}"}));
        let nested = unflatten(&PROJECT_LAYOUT, &row);
        assert_eq!(nested["team_members"], json!([]));
        assert_eq!(nested["milestones"], json!([]));
    }

    #[test]
    fn unflatten_strips_password_hash() {
        let row = obj(json!({"id": 1, "username": "a", "password_hash": "$argon2id$..."}));
        let nested = unflatten(&USER_LAYOUT, &row);
        assert!(!nested.contains_key("password_hash"));
        assert_eq!(nested["username"], json!("a"));
    }

    #[test]
    fn coerce_int_matches_parse_int_semantics() {
        assert_eq!(coerce_int(&json!("12")), 12);
        assert_eq!(coerce_int(&json!("  42 years")), 42);
        assert_eq!(coerce_int(&json!("-3")), -3);
        assert_eq!(coerce_int(&json!("abc")), 0);
        assert_eq!(coerce_int(&json!("")), 0);
        assert_eq!(coerce_int(&json!(9.7)), 9);
        assert_eq!(coerce_int(&json!(null)), 0);
        assert_eq!(coerce_int(&json!(true)), 0);
    }

    #[test]
    fn lenient_int_deserializes_strings() -> anyhow::Result<()> {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(deserialize_with = "lenient_int")]
            n: i64,
        }
        let p: Probe = serde_json::from_value(json!({"n": "1500"}))?;
        assert_eq!(p.n, 1500);
        Ok(())
    }

    #[test]
    fn writable_columns_cover_groups() {
        let cols = PROJECT_LAYOUT.writable_columns();
        assert!(cols.contains(&"seeking_brand".to_string()));
        assert!(cols.contains(&"team_members".to_string()));
        assert!(!cols.contains(&"id".to_string()));
    }
}
