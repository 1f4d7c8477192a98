//! Sign-in and sign-up form validation.
//!
//! Invalid input never reaches the auth service. Errors carry the message
//! shown inline next to the form and are returned to the caller as
//! `{ "success": false, "error": "..." }`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::types::{SignInEmail, SignUpEmail};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    #[error("Password must be at most {MAX_PASSWORD_LEN} characters")]
    PasswordTooLong,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be at most {MAX_NAME_LEN} characters")]
    NameTooLong,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub remember_me: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

/// Reads an HTML checkbox value. Browsers send `on` for a checked box
/// without a `value` attribute; scripted clients tend to send `true`/`false`.
#[must_use]
pub fn parse_checkbox(value: &str) -> Option<bool> {
    if value.trim().is_empty() {
        return Some(false);
    }
    crate::config::parse_bool(value)
}

fn checkbox<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|value| {
        parse_checkbox(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized checkbox value `{value}`")))
    })
    .transpose()
}

/// Result body for form actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    #[must_use]
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    #[must_use]
    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, error: Some(message.into()) }
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

fn check_password(password: &str) -> Result<(), FormError> {
    let len = password.chars().count();
    if len == 0 {
        return Err(FormError::PasswordRequired);
    }
    if len < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort);
    }
    if len > MAX_PASSWORD_LEN {
        return Err(FormError::PasswordTooLong);
    }
    Ok(())
}

/// # Errors
///
/// Returns the first failing field's [`FormError`].
pub fn validate_login(form: &LoginForm) -> Result<SignInEmail, FormError> {
    let email = normalize_email(&form.email).ok_or(FormError::InvalidEmail)?;
    if form.password.is_empty() {
        return Err(FormError::PasswordRequired);
    }
    Ok(SignInEmail { email, password: form.password.clone(), remember_me: form.remember_me })
}

/// # Errors
///
/// Returns the first failing field's [`FormError`].
pub fn validate_signup(form: &SignupForm) -> Result<SignUpEmail, FormError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(FormError::NameRequired);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(FormError::NameTooLong);
    }
    let email = normalize_email(&form.email).ok_or(FormError::InvalidEmail)?;
    check_password(&form.password)?;
    if let Some(confirm) = &form.confirm_password {
        if confirm != &form.password {
            return Err(FormError::PasswordMismatch);
        }
    }
    Ok(SignUpEmail { name: name.to_owned(), email, password: form.password.clone() })
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
