//! Promote a user to global admin.
//!
//! The `"user"` table belongs to the auth service's schema. Its admin plugin
//! reads the `role` column as a comma-separated list, so `admin` is checked
//! as one entry of that list rather than the whole value.

use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),
    #[error("no user with email {0}")]
    UserNotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoteOutcome {
    Promoted { email: String },
    AlreadyAdmin { email: String },
}

impl PromoteOutcome {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Promoted { email } => format!("{email} is now an admin"),
            Self::AlreadyAdmin { email } => format!("{email} is already an admin"),
        }
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return None;
    }
    if normalized.chars().any(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

/// Whether a stored role list already grants admin.
#[must_use]
pub fn is_admin_role(role: Option<&str>) -> bool {
    role.is_some_and(|r| r.split(',').any(|part| part.trim().eq_ignore_ascii_case("admin")))
}

/// The role list after granting admin: `admin` alone for an empty list,
/// appended otherwise so existing roles survive.
#[must_use]
pub fn promoted_role(existing: Option<&str>) -> String {
    match existing.map(str::trim).filter(|r| !r.is_empty()) {
        Some(roles) => format!("{roles},admin"),
        None => "admin".to_owned(),
    }
}

/// # Errors
///
/// `UserNotFound` when no row matches `email`, `Database` on query failure.
pub async fn promote_user(pool: &PgPool, email: &str) -> Result<PromoteOutcome, CliError> {
    let row = sqlx::query_as::<_, (String, Option<String>)>(r#"SELECT id, role FROM "user" WHERE lower(email) = $1"#)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    let Some((id, role)) = row else {
        return Err(CliError::UserNotFound(email.to_owned()));
    };

    if is_admin_role(role.as_deref()) {
        return Ok(PromoteOutcome::AlreadyAdmin { email: email.to_owned() });
    }

    sqlx::query(r#"UPDATE "user" SET role = $1 WHERE id = $2"#)
        .bind(promoted_role(role.as_deref()))
        .bind(&id)
        .execute(pool)
        .await?;
    Ok(PromoteOutcome::Promoted { email: email.to_owned() })
}

#[cfg(test)]
#[path = "promote_test.rs"]
mod tests;
