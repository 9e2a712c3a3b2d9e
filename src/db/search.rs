use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;

use super::{HubDb, UNICODE_LOWER, int, query_rows, string_list, text};
use crate::codec::Row;
use crate::errors::Result;
use crate::models::{ArticleSummary, PostSummary, ProjectSummary, UserSummary};
use crate::search::{SearchFilter, SortField};

/// Static description of how one entity kind is searched.
struct KindQuery {
    select: &'static str,
    from: &'static str,
    /// Columns matched case-insensitively against `q`.
    text_columns: &'static [&'static str],
    user_type_column: &'static str,
    id_column: &'static str,
    created_column: &'static str,
    updated_column: &'static str,
    title_column: &'static str,
}

const USERS: KindQuery = KindQuery {
    select: "u.id, u.username, u.user_type, u.bio, u.career_title, u.profile_image, u.created_at",
    from: "users u",
    text_columns: &["u.username", "u.bio"],
    user_type_column: "u.user_type",
    id_column: "u.id",
    created_column: "u.created_at",
    updated_column: "u.updated_at",
    title_column: "u.username",
};

const PROJECTS: KindQuery = KindQuery {
    select: "p.id, p.project_name, p.project_description, p.project_type, p.project_image,
             p.user_id, u.username, u.user_type, p.created_at",
    from: "projects p JOIN users u ON u.id = p.user_id",
    text_columns: &["p.project_name", "p.project_description"],
    user_type_column: "u.user_type",
    id_column: "p.id",
    created_column: "p.created_at",
    updated_column: "p.updated_at",
    title_column: "p.project_name",
};

const ARTICLES: KindQuery = KindQuery {
    select: "a.id, a.title, a.tags, a.user_id, u.username, u.user_type, a.created_at",
    from: "articles a JOIN users u ON u.id = a.user_id",
    text_columns: &["a.title"],
    user_type_column: "u.user_type",
    id_column: "a.id",
    created_column: "a.created_at",
    updated_column: "a.updated_at",
    title_column: "a.title",
};

const POSTS: KindQuery = KindQuery {
    select: "p.id, p.title, p.description,
             CASE WHEN p.post_image_display = 'upload' THEN p.post_image_upload ELSE p.post_image_url END AS image_url,
             p.tags, p.likes,
             (SELECT COUNT(*) FROM post_comments c WHERE c.post_id = p.id) AS comment_count,
             p.user_id, u.username, u.user_type, p.created_at",
    from: "posts p JOIN users u ON u.id = p.user_id",
    text_columns: &["p.title", "p.description"],
    user_type_column: "u.user_type",
    id_column: "p.id",
    created_column: "p.created_at",
    updated_column: "p.updated_at",
    title_column: "p.title",
};

/// Lowercase and escape LIKE metacharacters so user text matches literally.
fn like_pattern(q: &str) -> String {
    let mut escaped = String::with_capacity(q.len() + 2);
    escaped.push('%');
    for c in q.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl KindQuery {
    fn where_clause(&self, filter: &SearchFilter) -> (String, Vec<SqlValue>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();
        if let Some(q) = &filter.q {
            let pattern = like_pattern(q);
            let ors: Vec<String> = self
                .text_columns
                .iter()
                .map(|col| {
                    values.push(SqlValue::Text(pattern.clone()));
                    format!("{}({}) LIKE ? ESCAPE '\\'", UNICODE_LOWER, col)
                })
                .collect();
            conditions.push(format!("({})", ors.join(" OR ")));
        }
        if !filter.user_types.is_empty() {
            let marks = vec!["?"; filter.user_types.len()].join(", ");
            conditions.push(format!("{} IN ({})", self.user_type_column, marks));
            values.extend(filter.user_types.iter().cloned().map(SqlValue::Text));
        }
        let sql = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        (sql, values)
    }

    fn sort_column(&self, sort: SortField) -> &'static str {
        match sort {
            SortField::CreatedAt => self.created_column,
            SortField::UpdatedAt => self.updated_column,
            SortField::Title => self.title_column,
        }
    }

    /// One page of matching rows plus the total match count.
    fn run(&self, db: &HubDb, filter: &SearchFilter) -> Result<(Vec<Row>, i64)> {
        let (where_sql, values) = self.where_clause(filter);

        let count: i64 = db.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} {}", self.from, where_sql),
            params_from_iter(values.iter()),
            |r| r.get(0),
        )?;

        let dir = filter.order.as_sql();
        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY {} {}, {} {} LIMIT ? OFFSET ?",
            self.select,
            self.from,
            where_sql,
            self.sort_column(filter.sort),
            dir,
            self.id_column,
            dir
        );
        let mut page_values = values;
        page_values.push(SqlValue::Integer(filter.limit));
        page_values.push(SqlValue::Integer(filter.offset));
        let rows = query_rows(&db.conn, &sql, params_from_iter(page_values))?;
        Ok((rows, count))
    }
}

impl HubDb {
    pub fn search_users(&self, filter: &SearchFilter) -> Result<(Vec<UserSummary>, i64)> {
        let (rows, count) = USERS.run(self, filter)?;
        let users = rows
            .iter()
            .map(|r| UserSummary {
                id: int(r, "id"),
                username: text(r, "username"),
                user_type: text(r, "user_type"),
                bio: text(r, "bio"),
                career_title: text(r, "career_title"),
                profile_image: text(r, "profile_image"),
                created_at: text(r, "created_at"),
            })
            .collect();
        Ok((users, count))
    }

    pub fn search_projects(&self, filter: &SearchFilter) -> Result<(Vec<ProjectSummary>, i64)> {
        let (rows, count) = PROJECTS.run(self, filter)?;
        let projects = rows
            .iter()
            .map(|r| ProjectSummary {
                id: int(r, "id"),
                project_name: text(r, "project_name"),
                project_description: text(r, "project_description"),
                project_type: text(r, "project_type"),
                project_image: text(r, "project_image"),
                user_id: int(r, "user_id"),
                username: text(r, "username"),
                user_type: text(r, "user_type"),
                created_at: text(r, "created_at"),
            })
            .collect();
        Ok((projects, count))
    }

    pub fn search_articles(&self, filter: &SearchFilter) -> Result<(Vec<ArticleSummary>, i64)> {
        let (rows, count) = ARTICLES.run(self, filter)?;
        let articles = rows
            .iter()
            .map(|r| ArticleSummary {
                id: int(r, "id"),
                title: text(r, "title"),
                tags: string_list(r.get("tags")),
                user_id: int(r, "user_id"),
                username: text(r, "username"),
                user_type: text(r, "user_type"),
                created_at: text(r, "created_at"),
            })
            .collect();
        Ok((articles, count))
    }

    pub fn search_posts(&self, filter: &SearchFilter) -> Result<(Vec<PostSummary>, i64)> {
        let (rows, count) = POSTS.run(self, filter)?;
        let posts = rows
            .iter()
            .map(|r| PostSummary {
                id: int(r, "id"),
                title: text(r, "title"),
                description: text(r, "description"),
                image_url: text(r, "image_url"),
                tags: string_list(r.get("tags")),
                likes: int(r, "likes"),
                comment_count: int(r, "comment_count"),
                user_id: int(r, "user_id"),
                username: text(r, "username"),
                user_type: text(r, "user_type"),
                created_at: text(r, "created_at"),
            })
            .collect();
        Ok((posts, count))
    }
}
