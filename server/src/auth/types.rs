//! Auth service types: sessions, organizations, members, and errors.
//!
//! Shapes mirror the JSON returned by the auth service's session,
//! organization, and admin endpoints (camelCase on the wire). Role strings
//! are mapped to enums at the boundary so the gate never compares raw
//! strings.

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by auth service calls.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The HTTP request to the auth service failed (connect, DNS, reset).
    #[error("auth service request failed: {0}")]
    Request(String),

    /// The call did not complete within the configured bound.
    #[error("auth service timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The auth service returned a non-success HTTP status.
    #[error("auth service returned status {status}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("auth service response parse failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// ROLES
// =============================================================================

/// Global (instance-wide) role from the admin plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum GlobalRole {
    #[default]
    User,
    Admin,
}

impl GlobalRole {
    /// Parse a role string. Anything other than `admin` is a plain user.
    ///
    /// The admin plugin stores multiple roles comma-separated.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.split(',').any(|r| r.trim().eq_ignore_ascii_case("admin")) { Self::Admin } else { Self::User }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl From<Option<String>> for GlobalRole {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map_or(Self::User, Self::parse)
    }
}

/// Organization membership role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OrgRole {
    Member,
    Admin,
    Owner,
}

impl OrgRole {
    /// Parse a membership role. Comma-separated lists resolve to the
    /// strongest known role; unknown entries are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.split(',')
            .filter_map(|r| match r.trim().to_ascii_lowercase().as_str() {
                "owner" => Some(Self::Owner),
                "admin" => Some(Self::Admin),
                "member" => Some(Self::Member),
                _ => None,
            })
            .max()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Owners and admins may perform management actions.
    #[must_use]
    pub fn can_manage(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

impl TryFrom<String> for OrgRole {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| format!("unknown organization role: {raw}"))
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// User record attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: GlobalRole,
}

/// Session record. The session token is never deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    #[serde(default)]
    pub active_organization_id: Option<String>,
    /// User ID of the admin impersonating this session's user, if any.
    #[serde(default)]
    pub impersonated_by: Option<String>,
}

/// A validated session as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: SessionUser,
    pub session: SessionInfo,
}

impl AuthSession {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.role == GlobalRole::Admin
    }

    #[must_use]
    pub fn is_impersonating(&self) -> bool {
        self.session.impersonated_by.is_some()
    }

    #[must_use]
    pub fn active_organization_id(&self) -> Option<&str> {
        self.session.active_organization_id.as_deref()
    }
}

// =============================================================================
// ORGANIZATIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: String,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub user_id: String,
    pub role: OrgRole,
    #[serde(default)]
    pub user: Option<MemberUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}

/// Organization with its members and teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl Organization {
    /// Find the membership row for `user_id`.
    #[must_use]
    pub fn member_for(&self, user_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.user_id == user_id)
    }
}

/// Membership of the session user in their active organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMember {
    pub id: String,
    pub user_id: String,
    pub organization_id: String,
    pub role: OrgRole,
}

/// How to look up an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgLookup {
    Id(String),
    Slug(String),
}

impl OrgLookup {
    /// Query-string pair understood by the full-organization endpoint.
    #[must_use]
    pub fn query_pair(&self) -> (&'static str, &str) {
        match self {
            Self::Id(id) => ("organizationId", id),
            Self::Slug(slug) => ("organizationSlug", slug),
        }
    }
}

// =============================================================================
// FORWARDED ACTIONS
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInEmail {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpEmail {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Raw reply from a forwarded action, kept so `Set-Cookie` headers can be
/// relayed to the browser.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub set_cookies: Vec<HeaderValue>,
    pub body: serde_json::Value,
}

impl UpstreamReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Human-readable message from an error body (`{"message": "..."}`).
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
