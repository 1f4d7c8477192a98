//! Request-time gate middleware.
//!
//! SYSTEM CONTEXT
//! ==============
//! Installed on the whole router with `from_fn_with_state`. Per request it
//! classifies the path, verifies the session when the class needs it and a
//! session cookie is present, decides, and either redirects or forwards the
//! request with a [`RequestGate`] extension that page-level checks read
//! instead of asking the auth service again.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::cookie::{expiring_jar, has_session_cookie, present_session_cookies, reissued_cookie_names};
use super::decision::{GateDecision, GateInput, SessionState, decide};
use super::path::{RouteClass, classify};
use super::verify::{SessionCheck, verify};
use crate::auth::types::AuthSession;
use crate::state::AppState;

/// The gate's verdict for the current request, available to handlers as a
/// request extension.
#[derive(Debug, Clone)]
pub struct RequestGate {
    pub class: RouteClass,
    /// `None` when the session was not checked (public route or no cookie).
    pub check: Option<SessionCheck>,
    pub decision: GateDecision,
}

impl RequestGate {
    #[must_use]
    pub fn session(&self) -> Option<&AuthSession> {
        self.check.as_ref().and_then(SessionCheck::session)
    }
}

pub async fn session_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let class = classify(&path);
    let config = &state.gate;
    let cookie_present = has_session_cookie(request.headers(), &config.session_cookie_name);

    let check = if class.needs_session_check() && cookie_present {
        Some(verify(state.auth.as_ref(), request.headers(), config.verify_timeout).await)
    } else {
        None
    };

    let session = SessionState::from_check(check.as_ref(), class, cookie_present);
    let decision = decide(GateInput { class, session, policy: config.failure_policy });
    log_decision(&path, class, session, &decision, check.as_ref());

    let stale = if decision.clear_cookie {
        present_session_cookies(request.headers(), &config.session_cookie_name)
    } else {
        Vec::new()
    };

    // 303 so a POST to a sign-in action lands on a GET of the target.
    let response = match decision.location() {
        Some(location) => Redirect::to(location).into_response(),
        None => {
            request
                .extensions_mut()
                .insert(RequestGate { class, check, decision });
            next.run(request).await
        }
    };

    if stale.is_empty() {
        return response;
    }
    // A handler that issued a fresh session (sign-in, sign-up) wins over the
    // expiry of the stale one.
    let reissued = reissued_cookie_names(response.headers());
    let expire: Vec<String> = stale.into_iter().filter(|n| !reissued.contains(n)).collect();
    if expire.is_empty() {
        return response;
    }
    (expiring_jar(expire, config.cookie_secure), response).into_response()
}

fn log_decision(
    path: &str,
    class: RouteClass,
    session: SessionState,
    decision: &GateDecision,
    check: Option<&SessionCheck>,
) {
    if let Some(SessionCheck::Failed(reason)) = check {
        tracing::error!(
            %path,
            class = class.as_str(),
            action = decision.action.as_str(),
            fail_open = decision.fail_open,
            error = %reason,
            "session verification failed"
        );
    } else if !decision.is_allow() || decision.clear_cookie {
        tracing::debug!(
            %path,
            class = class.as_str(),
            session = session.as_str(),
            action = decision.action.as_str(),
            clear_cookie = decision.clear_cookie,
            stale_cookie_redirect = decision.is_clear_cookie_and_redirect(),
            "gate decision"
        );
    }
}

#[cfg(test)]
#[path = "middleware_test.rs"]
mod tests;
