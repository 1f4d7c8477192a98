//! Organization pages: dashboard, overview, members, settings, activation.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::Serialize;

use super::auth::append_set_cookies;
use crate::auth::types::{Member, OrgLookup, OrgRole, OrganizationSummary, Team};
use crate::gate::role::{OrgAccess, require_org_access};
use crate::gate::verify::with_timeout;
use crate::gate::{GateRejection, OrgAccessLevel, SignedIn};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_impersonating: bool,
    pub active_organization_id: Option<String>,
    pub active_organization: Option<OrganizationSummary>,
    /// The caller's role in the active organization, when one is set.
    pub active_role: Option<OrgRole>,
    pub organizations: Vec<OrganizationSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub role: OrgRole,
    pub can_manage: bool,
    pub member_count: usize,
    pub teams: Vec<Team>,
}

impl From<OrgAccess> for OrganizationView {
    fn from(access: OrgAccess) -> Self {
        let org = access.organization;
        Self {
            member_count: org.members.len(),
            id: org.id,
            slug: org.slug,
            name: org.name,
            role: access.role,
            can_manage: access.role.can_manage(),
            teams: org.teams,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersView {
    pub slug: String,
    pub role: OrgRole,
    pub members: Vec<Member>,
}

/// `GET /dashboard`: the caller's organizations.
///
/// Users without any membership are sent to the no-organization page;
/// global admins still get the dashboard so they can reach the console.
pub async fn dashboard(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
    headers: HeaderMap,
) -> Result<Json<DashboardView>, GateRejection> {
    let organizations = with_timeout(state.gate.verify_timeout, state.auth.list_organizations(&headers)).await?;
    if organizations.is_empty() && !session.is_admin() {
        return Err(GateRejection::NoOrganization);
    }

    let active_organization = match session.active_organization_id() {
        Some(id) => active_summary(&state, &headers, &organizations, id).await,
        None => None,
    };

    let active_role = if session.active_organization_id().is_some() {
        match with_timeout(state.gate.verify_timeout, state.auth.get_active_member(&headers)).await {
            Ok(member) => member.map(|m| m.role),
            Err(e) => {
                tracing::warn!(error = %e, "active member lookup failed");
                None
            }
        }
    } else {
        None
    };

    Ok(Json(DashboardView {
        is_admin: session.is_admin(),
        is_impersonating: session.is_impersonating(),
        active_organization_id: session.active_organization_id().map(str::to_owned),
        active_organization,
        active_role,
        user_id: session.user.id,
        name: session.user.name,
        email: session.user.email,
        organizations,
    }))
}

/// The active organization from the caller's list, or looked up by id when
/// the list does not carry it. Lookup failures leave it unset.
async fn active_summary(
    state: &AppState,
    headers: &HeaderMap,
    organizations: &[OrganizationSummary],
    id: &str,
) -> Option<OrganizationSummary> {
    if let Some(listed) = organizations.iter().find(|org| org.id == id) {
        return Some(listed.clone());
    }
    let lookup = OrgLookup::Id(id.to_owned());
    match with_timeout(state.gate.verify_timeout, state.auth.get_full_organization(&lookup, headers)).await {
        Ok(org) => org.map(|org| OrganizationSummary { id: org.id, slug: org.slug, name: org.name }),
        Err(e) => {
            tracing::warn!(error = %e, organization_id = %id, "active organization lookup failed");
            None
        }
    }
}

/// `GET /org/{slug}`
pub async fn overview(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrganizationView>, GateRejection> {
    let access = require_org_access(
        state.auth.as_ref(),
        &headers,
        &session,
        &slug,
        OrgAccessLevel::Read,
        state.gate.verify_timeout,
    )
    .await?;
    Ok(Json(access.into()))
}

/// `GET /org/{slug}/members`
pub async fn members(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MembersView>, GateRejection> {
    let access = require_org_access(
        state.auth.as_ref(),
        &headers,
        &session,
        &slug,
        OrgAccessLevel::Read,
        state.gate.verify_timeout,
    )
    .await?;
    Ok(Json(MembersView { slug: access.organization.slug, role: access.role, members: access.organization.members }))
}

/// `GET /org/{slug}/settings`: owners and admins only.
pub async fn settings(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrganizationView>, GateRejection> {
    let access = require_org_access(
        state.auth.as_ref(),
        &headers,
        &session,
        &slug,
        OrgAccessLevel::Manage,
        state.gate.verify_timeout,
    )
    .await?;
    Ok(Json(access.into()))
}

/// `POST /org/{slug}/activate`: make this the session's active organization.
pub async fn activate(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, GateRejection> {
    let limit = state.gate.verify_timeout;
    let access =
        require_org_access(state.auth.as_ref(), &headers, &session, &slug, OrgAccessLevel::Read, limit).await?;

    let reply = with_timeout(limit, state.auth.set_active_organization(&access.organization.id, &headers)).await?;
    if !reply.is_success() {
        return Err(GateRejection::Upstream(format!("set-active returned {}", reply.status)));
    }
    tracing::info!(
        user_id = %session.user.id,
        organization_id = %access.organization.id,
        role = access.role.as_str(),
        "active organization changed"
    );

    let target = format!("/org/{}", urlencoding::encode(&access.organization.slug));
    let mut response = Redirect::to(&target).into_response();
    append_set_cookies(&mut response, &reply);
    Ok(response)
}

#[cfg(test)]
#[path = "orgs_test.rs"]
mod tests;
