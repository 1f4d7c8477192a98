//! Auth routes: session probe, sign-in/sign-up form actions, sign-out.
//!
//! Credentials are validated here and then forwarded to the auth service,
//! which owns sessions. Its `Set-Cookie` headers are relayed to the browser
//! unchanged so the session cookie is issued by the service itself.

use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Redirect, Response};

use crate::auth::types::UpstreamReply;
use crate::forms::{ActionResult, LoginForm, SignupForm, validate_login, validate_signup};
use crate::gate::cookie::{clearing_jar, has_session_cookie};
use crate::gate::path::LOGIN_PATH;
use crate::gate::verify::{SessionCheck, verify, with_timeout};
use crate::state::AppState;

const UNAVAILABLE_MESSAGE: &str = "Authentication service unavailable. Please try again.";
const MALFORMED_MESSAGE: &str = "Invalid form submission";

// =============================================================================
// SESSION PROBE
// =============================================================================

/// `GET /api/session-check`: 204 with a valid session, 401 without one,
/// 503 when the auth service cannot tell.
pub async fn session_check(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if !has_session_cookie(&headers, &state.gate.session_cookie_name) {
        return StatusCode::UNAUTHORIZED;
    }
    match verify(state.auth.as_ref(), &headers, state.gate.verify_timeout).await {
        SessionCheck::Valid(_) => StatusCode::NO_CONTENT,
        SessionCheck::NoSession => StatusCode::UNAUTHORIZED,
        SessionCheck::Failed(reason) => {
            tracing::warn!(error = %reason, "session check could not reach auth service");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

// =============================================================================
// PAGES
// =============================================================================

pub async fn login_page() -> &'static str {
    "Sign in with your email and password."
}

pub async fn signup_page() -> &'static str {
    "Create an account with your name, email and password."
}

// =============================================================================
// FORM ACTIONS
// =============================================================================

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return form_rejected(&rejection),
    };
    let credentials = match validate_login(&form) {
        Ok(credentials) => credentials,
        Err(e) => return action_error(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let result = with_timeout(state.gate.action_timeout, state.auth.sign_in_email(&credentials, &headers)).await;
    match result {
        Ok(reply) => relay_action(reply, "Invalid email or password"),
        Err(e) => {
            tracing::error!(error = %e, "sign-in forward failed");
            action_error(StatusCode::BAD_GATEWAY, UNAVAILABLE_MESSAGE)
        }
    }
}

/// `POST /auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<SignupForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return form_rejected(&rejection),
    };
    let registration = match validate_signup(&form) {
        Ok(registration) => registration,
        Err(e) => return action_error(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let result = with_timeout(state.gate.action_timeout, state.auth.sign_up_email(&registration, &headers)).await;
    match result {
        Ok(reply) => relay_action(reply, "Could not create account"),
        Err(e) => {
            tracing::error!(error = %e, "sign-up forward failed");
            action_error(StatusCode::BAD_GATEWAY, UNAVAILABLE_MESSAGE)
        }
    }
}

/// `POST /auth/logout`: sign out upstream, drop the local cookie either way.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let jar = clearing_jar(&headers, &state.gate.session_cookie_name, state.gate.cookie_secure);
    let mut response = (jar, Redirect::to(LOGIN_PATH)).into_response();

    match with_timeout(state.gate.action_timeout, state.auth.sign_out(&headers)).await {
        Ok(reply) if reply.is_success() => append_set_cookies(&mut response, &reply),
        Ok(reply) => tracing::warn!(status = reply.status, "auth service rejected sign-out"),
        Err(e) => tracing::warn!(error = %e, "sign-out forward failed; clearing cookie locally"),
    }
    response
}

// =============================================================================
// HELPERS
// =============================================================================

fn action_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ActionResult::err(message))).into_response()
}

/// A body the form extractor could not read still answers in the action
/// result shape, with the extractor's status.
fn form_rejected(rejection: &FormRejection) -> Response {
    tracing::debug!(error = %rejection.body_text(), "form body rejected");
    action_error(rejection.status(), MALFORMED_MESSAGE)
}

/// Turn the auth service's reply to a form action into the action result,
/// carrying its cookies along on success.
fn relay_action(reply: UpstreamReply, fallback: &str) -> Response {
    if reply.is_success() {
        let mut response = Json(ActionResult::ok()).into_response();
        append_set_cookies(&mut response, &reply);
        return response;
    }
    if reply.status >= 500 {
        tracing::error!(status = reply.status, "auth service error on form action");
        return action_error(StatusCode::BAD_GATEWAY, UNAVAILABLE_MESSAGE);
    }
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_REQUEST);
    action_error(status, reply.message().unwrap_or(fallback).to_owned())
}

pub(crate) fn append_set_cookies(response: &mut Response, reply: &UpstreamReply) {
    let headers = response.headers_mut();
    for value in &reply.set_cookies {
        headers.append(header::SET_COOKIE, value.clone());
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
