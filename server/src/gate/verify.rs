//! Session verification against the auth service.
//!
//! The auth service's answer is mapped onto [`SessionCheck`] so that
//! "no session" and "could not tell" are distinct, explicit branches for the
//! decision logic. Every call is bounded by a timeout; a timeout counts as a
//! failure.

use std::future::Future;
use std::time::Duration;

use axum::http::HeaderMap;

use crate::auth::AuthProvider;
use crate::auth::types::{AuthError, AuthSession};

/// Outcome of asking the auth service for the caller's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    Valid(AuthSession),
    NoSession,
    /// The auth service could not be reached or answered nonsense.
    Failed(String),
}

impl SessionCheck {
    #[must_use]
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            Self::Valid(session) => Some(session),
            Self::NoSession | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Run an auth service call with an upper bound on its duration.
///
/// # Errors
///
/// Returns the call's own error, or [`AuthError::Timeout`] if `limit` elapses.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, AuthError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AuthError::Timeout { ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX) }),
    }
}

/// Ask the auth service whether `headers` carry a valid session.
pub async fn verify(provider: &dyn AuthProvider, headers: &HeaderMap, limit: Duration) -> SessionCheck {
    match with_timeout(limit, provider.get_session(headers)).await {
        Ok(Some(session)) => SessionCheck::Valid(session),
        Ok(None) => SessionCheck::NoSession,
        Err(e) => SessionCheck::Failed(e.to_string()),
    }
}

#[cfg(test)]
#[path = "verify_test.rs"]
mod tests;
