//! User directory reads for the admin console.
//!
//! DESIGN
//! ======
//! The `"user"` table belongs to the auth service's schema; this module only
//! reads it. Column names follow that schema (quoted camelCase where the
//! ORM uses it). Writes go through the auth service, never through here.

use sqlx::PgPool;
use sqlx::QueryBuilder;
use sqlx::Postgres;

use crate::auth::types::GlobalRole;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, thiserror::Error)]
pub enum UserDirectoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: GlobalRole,
    pub banned: bool,
}

/// Paging and search parameters after clamping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// Case-insensitive substring of name or email.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl UserQuery {
    /// Normalize raw query-string values: blank search is dropped, limit is
    /// clamped to `1..=MAX_PAGE_SIZE`, negative offsets become zero.
    #[must_use]
    pub fn new(search: Option<&str>, limit: Option<i64>, offset: Option<i64>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        Self { search, limit: clamp_limit(limit), offset: offset.unwrap_or(0).max(0) }
    }
}

impl Default for UserQuery {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

#[must_use]
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Escape `LIKE` metacharacters so a search term matches literally.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn push_search_filter(builder: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(term) = search {
        let pattern = like_pattern(term);
        builder.push(" WHERE (name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR email ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

/// One page of users, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_users(pool: &PgPool, query: &UserQuery) -> Result<Vec<UserRow>, UserDirectoryError> {
    let mut builder = QueryBuilder::new(
        r#"SELECT id, name, email, role, COALESCE(banned, false) FROM "user""#,
    );
    push_search_filter(&mut builder, query.search.as_deref());
    builder.push(r#" ORDER BY "createdAt" DESC, id ASC LIMIT "#);
    builder.push_bind(query.limit);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset);

    let rows = builder
        .build_query_as::<(String, String, String, Option<String>, bool)>()
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, email, role, banned)| UserRow {
            id,
            name,
            email,
            role: GlobalRole::from(role),
            banned,
        })
        .collect())
}

/// Total users matching the search, for pagination.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn count_users(pool: &PgPool, search: Option<&str>) -> Result<i64, UserDirectoryError> {
    let mut builder = QueryBuilder::new(r#"SELECT COUNT(*) FROM "user""#);
    push_search_filter(&mut builder, search);
    let total: i64 = builder.build_query_scalar().fetch_one(pool).await?;
    Ok(total)
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
