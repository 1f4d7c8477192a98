//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every route sits behind the session gate middleware. Public pages and the
//! form actions under `/auth` pass through it untouched; everything else
//! needs a verified session by the time a handler runs. Handlers that need
//! more than a session (global admin, organization role) ask `gate::role`.

pub mod admin;
pub mod auth;
pub mod orgs;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::Redirect;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::gate::path::{DASHBOARD_PATH, LOGIN_PATH};
use crate::gate::session_gate;
use crate::state::AppState;

/// Full application router with the gate, tracing, and compression layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/healthz", get(healthz))
        .route("/unauthorized", get(unauthorized))
        .route("/no-organization", get(no_organization))
        .route("/api/session-check", get(auth::session_check))
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/signup", get(auth::signup_page).post(auth::signup))
        .route("/auth/logout", post(auth::logout))
        .route("/dashboard", get(orgs::dashboard))
        .route("/org/{slug}", get(orgs::overview))
        .route("/org/{slug}/members", get(orgs::members))
        .route("/org/{slug}/settings", get(orgs::settings))
        .route("/org/{slug}/activate", post(orgs::activate))
        .route("/admin", get(admin::console))
        .route("/admin/users", get(admin::list_users))
        .layer(from_fn_with_state(state.clone(), session_gate))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Signed-in visitors land on their dashboard; the gate bounces everyone
/// else from there to the login page.
async fn home() -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn unauthorized() -> (StatusCode, &'static str) {
    (StatusCode::FORBIDDEN, "You do not have permission to view this page.")
}

async fn no_organization() -> String {
    format!("You are not a member of any organization yet. Ask an owner for an invitation, or sign in with another account at {LOGIN_PATH}.")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
