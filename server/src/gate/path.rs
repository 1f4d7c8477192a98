//! Path classification: which requests need a session, and which are
//! sign-in pages that signed-in users should be bounced away from.
//!
//! Rules, first match wins:
//! 1. exact match against [`PUBLIC_EXACT`] → public
//! 2. segment-boundary prefix match against [`PUBLIC_PREFIXES`] → public,
//!    or an auth page when the prefix is [`AUTH_PREFIX`]
//! 3. everything else → protected

pub const AUTH_PREFIX: &str = "/auth";
pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const NO_ORGANIZATION_PATH: &str = "/no-organization";

pub const PUBLIC_EXACT: &[&str] = &["/", UNAUTHORIZED_PATH, NO_ORGANIZATION_PATH, "/healthz"];
pub const PUBLIC_PREFIXES: &[&str] = &[AUTH_PREFIX, "/api"];

/// Pages under [`AUTH_PREFIX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPage {
    Login,
    Signup,
    /// Any other auth sub-path (callbacks, logout, password reset).
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    AuthPage(AuthPage),
    Protected,
}

impl RouteClass {
    /// Whether the gate consults the session for this class.
    #[must_use]
    pub fn needs_session_check(self) -> bool {
        matches!(self, Self::Protected | Self::AuthPage(AuthPage::Login | AuthPage::Signup))
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::AuthPage(AuthPage::Login) => "auth_login",
            Self::AuthPage(AuthPage::Signup) => "auth_signup",
            Self::AuthPage(AuthPage::Other) => "auth_other",
            Self::Protected => "protected",
        }
    }
}

/// `path` equals `prefix` or continues it with a `/`.
#[must_use]
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[must_use]
pub fn classify(path: &str) -> RouteClass {
    if PUBLIC_EXACT.contains(&path) {
        return RouteClass::Public;
    }

    match PUBLIC_PREFIXES
        .iter()
        .find(|prefix| matches_prefix(path, prefix))
    {
        Some(&AUTH_PREFIX) => RouteClass::AuthPage(auth_page(path)),
        Some(_) => RouteClass::Public,
        None => RouteClass::Protected,
    }
}

fn auth_page(path: &str) -> AuthPage {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed {
        LOGIN_PATH => AuthPage::Login,
        SIGNUP_PATH => AuthPage::Signup,
        _ => AuthPage::Other,
    }
}

#[cfg(test)]
#[path = "path_test.rs"]
mod tests;
