//! Auth service adapter.
//!
//! DESIGN
//! ======
//! Sessions, organizations, and the admin role are owned by an external auth
//! service. This module is the only place that talks to it: [`AuthProvider`]
//! is the seam the gate and route handlers depend on, [`HttpAuthProvider`] is
//! the production implementation, and tests substitute mocks.

pub mod client;
pub mod types;

use axum::http::HeaderMap;

pub use client::{AuthTimeouts, HttpAuthProvider};
use types::{
    ActiveMember, AuthError, AuthSession, OrgLookup, Organization, OrganizationSummary, SignInEmail, SignUpEmail,
    UpstreamReply,
};

// =============================================================================
// AUTH PROVIDER TRAIT
// =============================================================================

/// Async interface to the auth service. Every call forwards the inbound
/// request's cookies so the service can resolve the caller's session.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the caller's session. `Ok(None)` means the service answered
    /// and there is no valid session.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the service could not be reached or
    /// answered with something other than a session or `null`.
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<AuthSession>, AuthError>;

    /// List organizations the caller belongs to.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] on transport, status, or decode failure.
    async fn list_organizations(&self, headers: &HeaderMap) -> Result<Vec<OrganizationSummary>, AuthError>;

    /// Fetch an organization with members and teams. `Ok(None)` when the
    /// organization does not exist or is not visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] on transport, status, or decode failure.
    async fn get_full_organization(
        &self,
        lookup: &OrgLookup,
        headers: &HeaderMap,
    ) -> Result<Option<Organization>, AuthError>;

    /// The caller's membership in their active organization, if any.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] on transport, status, or decode failure.
    async fn get_active_member(&self, headers: &HeaderMap) -> Result<Option<ActiveMember>, AuthError>;

    /// Switch the caller's active organization.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the request could not be sent.
    async fn set_active_organization(&self, organization_id: &str, headers: &HeaderMap)
    -> Result<UpstreamReply, AuthError>;

    /// Forward an email/password sign-in.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the request could not be sent. A rejected
    /// sign-in is an `Ok` reply with a non-success status.
    async fn sign_in_email(&self, credentials: &SignInEmail, headers: &HeaderMap) -> Result<UpstreamReply, AuthError>;

    /// Forward an email/password registration.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the request could not be sent.
    async fn sign_up_email(&self, registration: &SignUpEmail, headers: &HeaderMap)
    -> Result<UpstreamReply, AuthError>;

    /// Forward a sign-out.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the request could not be sent.
    async fn sign_out(&self, headers: &HeaderMap) -> Result<UpstreamReply, AuthError>;
}
