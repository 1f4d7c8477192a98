//! Server configuration parsed from environment variables.
//!
//! `main` loads a `.env` file first (via `dotenvy`), so every value here can
//! come from either source. Parsing goes through a lookup function so tests
//! never touch the process environment.

use std::time::Duration;

use crate::auth::AuthTimeouts;
use crate::auth::client::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::gate::FailurePolicy;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_AUTH_BASE_URL: &str = "http://127.0.0.1:3001";
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "better-auth.session_token";
pub const DEFAULT_VERIFY_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Settings the gate middleware reads on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub session_cookie_name: String,
    pub cookie_secure: bool,
    pub verify_timeout: Duration,
    /// Bound on forwarded sign-in, sign-up and sign-out calls, which may
    /// hash passwords upstream and so run longer than a session lookup.
    pub action_timeout: Duration,
    pub failure_policy: FailurePolicy,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_owned(),
            cookie_secure: false,
            verify_timeout: Duration::from_millis(DEFAULT_VERIFY_TIMEOUT_MS),
            action_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            failure_policy: FailurePolicy::Open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub auth_base_url: String,
    pub auth_timeouts: AuthTimeouts,
    pub gate: GateConfig,
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `AUTH_BASE_URL`: default `http://127.0.0.1:3001`
    /// - `AUTH_REQUEST_TIMEOUT_SECS`: default 10, also bounds form actions
    /// - `AUTH_CONNECT_TIMEOUT_SECS`: default 5
    /// - `SESSION_COOKIE_NAME`: default `better-auth.session_token`
    /// - `COOKIE_SECURE`: default inferred from the `AUTH_BASE_URL` scheme
    /// - `GATE_VERIFY_TIMEOUT_MS`: default 3000
    /// - `GATE_FAILURE_POLICY`: `open` (default) or `closed`
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let auth_base_url = lookup("AUTH_BASE_URL").unwrap_or_else(|| DEFAULT_AUTH_BASE_URL.to_owned());

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "COOKIE_SECURE", value: raw })?,
            None => auth_base_url.starts_with("https://"),
        };
        let failure_policy = match lookup("GATE_FAILURE_POLICY") {
            Some(raw) => FailurePolicy::parse(&raw).ok_or(ConfigError::Invalid { key: "GATE_FAILURE_POLICY", value: raw })?,
            None => FailurePolicy::Open,
        };

        let auth_timeouts = AuthTimeouts {
            request_secs: parse_or(&lookup, "AUTH_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_or(&lookup, "AUTH_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        let gate = GateConfig {
            session_cookie_name: lookup("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_owned()),
            cookie_secure,
            verify_timeout: Duration::from_millis(parse_or(&lookup, "GATE_VERIFY_TIMEOUT_MS", DEFAULT_VERIFY_TIMEOUT_MS)?),
            action_timeout: Duration::from_secs(auth_timeouts.request_secs),
            failure_policy,
        };

        Ok(Self {
            database_url,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            auth_base_url,
            auth_timeouts,
            gate,
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
