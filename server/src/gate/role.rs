//! Page-level role and membership checks.
//!
//! Handlers take [`SignedIn`] or [`AdminUser`] as extractors and call
//! [`require_org_access`] for organization-scoped pages. All of them read the
//! session the gate middleware already verified. Rejections render as
//! redirects to fixed destinations, except auth service failures, which
//! surface as 502.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use super::middleware::RequestGate;
use super::path::{LOGIN_PATH, NO_ORGANIZATION_PATH, UNAUTHORIZED_PATH};
use super::verify::with_timeout;
use crate::auth::AuthProvider;
use crate::auth::types::{AuthError, AuthSession, OrgLookup, OrgRole, Organization};

// =============================================================================
// REJECTION
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GateRejection {
    #[error("sign-in required")]
    NotSignedIn,
    /// Organization absent, or the user is not a member of it.
    #[error("no organization membership")]
    NoOrganization,
    /// Signed in, but the role is insufficient.
    #[error("insufficient role")]
    Unauthorized,
    #[error("auth service unavailable: {0}")]
    Upstream(String),
}

impl From<AuthError> for GateRejection {
    fn from(err: AuthError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl GateRejection {
    /// Redirect destination, or `None` for errors rendered in place.
    #[must_use]
    pub fn location(&self) -> Option<&'static str> {
        match self {
            Self::NotSignedIn => Some(LOGIN_PATH),
            Self::NoOrganization => Some(NO_ORGANIZATION_PATH),
            Self::Unauthorized => Some(UNAUTHORIZED_PATH),
            Self::Upstream(_) => None,
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        if let Some(location) = self.location() {
            return Redirect::to(location).into_response();
        }
        tracing::error!(error = %self, "page gate could not consult auth service");
        (StatusCode::BAD_GATEWAY, "Authentication service unavailable").into_response()
    }
}

// =============================================================================
// CHECKS
// =============================================================================

/// How much an organization-scoped page demands of the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgAccessLevel {
    /// Any membership.
    Read,
    /// Owner or admin.
    Manage,
}

impl OrgAccessLevel {
    #[must_use]
    pub fn permits(self, role: OrgRole) -> bool {
        match self {
            Self::Read => true,
            Self::Manage => role.can_manage(),
        }
    }
}

/// An organization the caller was admitted to, with their role in it.
#[derive(Debug, Clone)]
pub struct OrgAccess {
    pub organization: Organization,
    pub role: OrgRole,
}

/// The verified session, or why there is none.
///
/// # Errors
///
/// `Upstream` when the gate let the request through fail-open,
/// `NotSignedIn` otherwise.
pub fn require_session(gate: &RequestGate) -> Result<&AuthSession, GateRejection> {
    if let Some(session) = gate.session() {
        return Ok(session);
    }
    if gate.decision.fail_open {
        return Err(GateRejection::Upstream(format!(
            "session could not be verified on {} route",
            gate.class.as_str()
        )));
    }
    Err(GateRejection::NotSignedIn)
}

/// # Errors
///
/// `Unauthorized` unless the session user holds the global admin role.
pub fn require_admin(session: &AuthSession) -> Result<(), GateRejection> {
    if session.is_admin() {
        return Ok(());
    }
    tracing::debug!(user_id = %session.user.id, role = session.user.role.as_str(), "admin area denied");
    Err(GateRejection::Unauthorized)
}

/// Compare a membership role (or its absence) against `level`.
///
/// # Errors
///
/// `NoOrganization` without membership, `Unauthorized` with an
/// insufficient role.
pub fn check_org_role(role: Option<OrgRole>, level: OrgAccessLevel) -> Result<OrgRole, GateRejection> {
    match role {
        None => Err(GateRejection::NoOrganization),
        Some(role) if level.permits(role) => Ok(role),
        Some(_) => Err(GateRejection::Unauthorized),
    }
}

/// Load the organization named by `slug` and check the caller's membership.
///
/// # Errors
///
/// See [`check_org_role`]; also `NoOrganization` when the slug does not
/// resolve and `Upstream` when the auth service fails or times out.
pub async fn require_org_access(
    provider: &dyn AuthProvider,
    headers: &HeaderMap,
    session: &AuthSession,
    slug: &str,
    level: OrgAccessLevel,
    limit: Duration,
) -> Result<OrgAccess, GateRejection> {
    let lookup = OrgLookup::Slug(slug.to_owned());
    let organization = with_timeout(limit, provider.get_full_organization(&lookup, headers))
        .await?
        .ok_or(GateRejection::NoOrganization)?;

    let member_role = organization
        .member_for(&session.user.id)
        .map(|m| m.role);
    let role = check_org_role(member_role, level).inspect_err(|err| {
        tracing::debug!(
            user_id = %session.user.id,
            %slug,
            ?level,
            member_role = member_role.map_or("none", OrgRole::as_str),
            error = %err,
            "organization access denied"
        );
    })?;

    Ok(OrgAccess { organization, role })
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// A request with a verified session. Rejects with a redirect to login.
#[derive(Debug, Clone)]
pub struct SignedIn(pub AuthSession);

impl<S> FromRequestParts<S> for SignedIn
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let gate = parts
            .extensions
            .get::<RequestGate>()
            .ok_or(GateRejection::NotSignedIn)?;
        require_session(gate).cloned().map(Self)
    }
}

/// A signed-in global admin. Non-admins are sent to the unauthorized page.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthSession);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SignedIn(session) = SignedIn::from_request_parts(parts, state).await?;
        require_admin(&session)?;
        Ok(Self(session))
    }
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
