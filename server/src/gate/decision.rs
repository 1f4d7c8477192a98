//! Redirect decisions.
//!
//! DESIGN
//! ======
//! [`decide`] is a pure function of the route class, what is known about
//! the session, and the failure policy. The middleware evaluates it exactly
//! once per request and hands the result to handlers, so edge routing and
//! page-level checks never disagree.
//!
//! | class            | session              | action                          |
//! |------------------|----------------------|---------------------------------|
//! | public           | not checked          | allow                           |
//! | auth (other)     | not checked          | allow                           |
//! | login / signup   | valid                | redirect to dashboard           |
//! | login / signup   | none / no cookie     | allow (stale cookie cleared)    |
//! | login / signup   | failed               | allow, fail-open                |
//! | protected        | valid                | allow                           |
//! | protected        | none                 | clear cookie, redirect to login |
//! | protected        | no cookie            | redirect to login               |
//! | protected        | failed               | policy: allow or login          |
//!
//! TRADE-OFFS
//! ==========
//! The default [`FailurePolicy::Open`] keeps the app usable during an auth
//! service outage at the cost of letting unverified requests reach protected
//! handlers. Those handlers re-check through `role`, which rejects requests
//! without a verified session, so fail-open degrades to an error page rather
//! than to data exposure.

use super::path::{AuthPage, DASHBOARD_PATH, LOGIN_PATH, RouteClass};
use super::verify::SessionCheck;

/// What to do when the auth service cannot be consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Let the request through and log.
    #[default]
    Open,
    /// Send protected requests to the login page.
    Closed,
}

impl FailurePolicy {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Everything the gate knows about the session when deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The route class does not need a session check.
    Unchecked,
    /// No session cookie was presented, so the auth service was not asked.
    NoCookie,
    Valid,
    /// A cookie was presented but the auth service has no session for it.
    NoSession,
    Failed,
}

impl SessionState {
    #[must_use]
    pub fn from_check(check: Option<&SessionCheck>, class: RouteClass, cookie_present: bool) -> Self {
        match check {
            Some(SessionCheck::Valid(_)) => Self::Valid,
            Some(SessionCheck::NoSession) => Self::NoSession,
            Some(SessionCheck::Failed(_)) => Self::Failed,
            None if class.needs_session_check() && !cookie_present => Self::NoCookie,
            None => Self::Unchecked,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::NoCookie => "no_cookie",
            Self::Valid => "valid",
            Self::NoSession => "no_session",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateInput {
    pub class: RouteClass,
    pub session: SessionState,
    pub policy: FailurePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
}

impl GateAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::RedirectToLogin => "redirect_login",
            Self::RedirectToDashboard => "redirect_dashboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    pub action: GateAction,
    /// Expire the presented session cookie on the response.
    pub clear_cookie: bool,
    /// The request was allowed only because verification failed.
    pub fail_open: bool,
}

impl GateDecision {
    const fn new(action: GateAction) -> Self {
        Self { action, clear_cookie: false, fail_open: false }
    }

    const fn clearing_cookie(mut self) -> Self {
        self.clear_cookie = true;
        self
    }

    const fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.action == GateAction::Allow
    }

    /// Stale cookie on a protected route: expire it and send to login.
    #[must_use]
    pub fn is_clear_cookie_and_redirect(&self) -> bool {
        self.clear_cookie && self.action == GateAction::RedirectToLogin
    }

    /// Redirect target, if the request is not allowed through.
    #[must_use]
    pub fn location(&self) -> Option<&'static str> {
        match self.action {
            GateAction::Allow => None,
            GateAction::RedirectToLogin => Some(LOGIN_PATH),
            GateAction::RedirectToDashboard => Some(DASHBOARD_PATH),
        }
    }
}

#[must_use]
pub fn decide(input: GateInput) -> GateDecision {
    use GateAction::{Allow, RedirectToDashboard, RedirectToLogin};
    use SessionState::{Failed, NoCookie, NoSession, Unchecked, Valid};

    match (input.class, input.session) {
        (RouteClass::Public | RouteClass::AuthPage(AuthPage::Other), _) => GateDecision::new(Allow),

        (RouteClass::AuthPage(_), Valid) => GateDecision::new(RedirectToDashboard),
        (RouteClass::AuthPage(_), NoSession) => GateDecision::new(Allow).clearing_cookie(),
        (RouteClass::AuthPage(_), Failed) => GateDecision::new(Allow).failing_open(),
        (RouteClass::AuthPage(_), NoCookie | Unchecked) => GateDecision::new(Allow),

        (RouteClass::Protected, Valid) => GateDecision::new(Allow),
        (RouteClass::Protected, NoSession) => GateDecision::new(RedirectToLogin).clearing_cookie(),
        (RouteClass::Protected, NoCookie | Unchecked) => GateDecision::new(RedirectToLogin),
        (RouteClass::Protected, Failed) => match input.policy {
            FailurePolicy::Open => GateDecision::new(Allow).failing_open(),
            FailurePolicy::Closed => GateDecision::new(RedirectToLogin),
        },
    }
}

#[cfg(test)]
#[path = "decision_test.rs"]
mod tests;
