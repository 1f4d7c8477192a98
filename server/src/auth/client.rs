//! HTTP client for the auth service's REST endpoints.
//!
//! Thin wrapper over `reqwest`. Inbound cookies (plus the few headers the
//! service uses for origin checks) are forwarded unchanged; pure parsing
//! lives in `parse_*` helpers for testability.

use std::time::Duration;

use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use serde::de::DeserializeOwned;

use super::AuthProvider;
use super::types::{
    ActiveMember, AuthError, AuthSession, OrgLookup, Organization, OrganizationSummary, SignInEmail, SignUpEmail,
    UpstreamReply,
};

const API_PREFIX: &str = "/api/auth";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

const FORWARDED_HEADERS: &[&str] = &["cookie", "origin", "user-agent", "x-forwarded-for"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for AuthTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpAuthProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthProvider {
    /// Build a client for the auth service at `base_url` (scheme + host).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeouts: AuthTimeouts) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: &HeaderMap,
    ) -> Result<T, AuthError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .headers(forward_headers(headers))
            .query(query)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(AuthError::Status { status, body: text });
        }

        parse_body(&text)
    }

    async fn post_json<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        headers: &HeaderMap,
    ) -> Result<UpstreamReply, AuthError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .headers(forward_headers(headers))
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let set_cookies = response.headers().get_all(SET_COOKIE).iter().cloned().collect();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        Ok(UpstreamReply { status, set_cookies, body: parse_reply_body(&text) })
    }
}

#[async_trait::async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<AuthSession>, AuthError> {
        match self.get_json("/get-session", &[], headers).await {
            Err(AuthError::Status { status: 401, .. }) => Ok(None),
            other => other,
        }
    }

    async fn list_organizations(&self, headers: &HeaderMap) -> Result<Vec<OrganizationSummary>, AuthError> {
        self.get_json("/organization/list", &[], headers).await
    }

    async fn get_full_organization(
        &self,
        lookup: &OrgLookup,
        headers: &HeaderMap,
    ) -> Result<Option<Organization>, AuthError> {
        let (key, value) = lookup.query_pair();
        match self
            .get_json("/organization/get-full-organization", &[(key, value)], headers)
            .await
        {
            Err(AuthError::Status { status, .. }) if is_absent_status(status) => Ok(None),
            other => other,
        }
    }

    async fn get_active_member(&self, headers: &HeaderMap) -> Result<Option<ActiveMember>, AuthError> {
        match self
            .get_json("/organization/get-active-member", &[], headers)
            .await
        {
            Err(AuthError::Status { status, .. }) if is_absent_status(status) => Ok(None),
            other => other,
        }
    }

    async fn set_active_organization(
        &self,
        organization_id: &str,
        headers: &HeaderMap,
    ) -> Result<UpstreamReply, AuthError> {
        let body = serde_json::json!({ "organizationId": organization_id });
        self.post_json("/organization/set-active", &body, headers)
            .await
    }

    async fn sign_in_email(&self, credentials: &SignInEmail, headers: &HeaderMap) -> Result<UpstreamReply, AuthError> {
        self.post_json("/sign-in/email", credentials, headers)
            .await
    }

    async fn sign_up_email(&self, registration: &SignUpEmail, headers: &HeaderMap) -> Result<UpstreamReply, AuthError> {
        self.post_json("/sign-up/email", registration, headers)
            .await
    }

    async fn sign_out(&self, headers: &HeaderMap) -> Result<UpstreamReply, AuthError> {
        self.post_json("/sign-out", &serde_json::json!({}), headers)
            .await
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Copy the subset of inbound headers the auth service needs.
pub(crate) fn forward_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for &name in FORWARDED_HEADERS {
        for value in inbound.get_all(name) {
            out.append(name, value.clone());
        }
    }
    out
}

/// The organization endpoints answer "not found" and "not a member" with
/// 400/403/404 rather than `null`.
pub(crate) fn is_absent_status(status: u16) -> bool {
    matches!(status, 400 | 403 | 404)
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, AuthError> {
    // An empty 200 body is how some deployments spell "no session".
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(|e| AuthError::Decode(e.to_string()))
}

fn parse_reply_body(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
