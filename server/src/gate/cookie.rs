//! Session cookie presence checks and removal.
//!
//! The auth service prefixes its cookies with `__Secure-` when it runs
//! behind HTTPS, so both spellings of the configured name are recognized.

use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

const SECURE_PREFIX: &str = "__Secure-";

/// Both cookie names the auth service may use for `name`.
#[must_use]
pub fn session_cookie_names(name: &str) -> [String; 2] {
    [name.to_owned(), format!("{SECURE_PREFIX}{name}")]
}

/// Whether a non-empty session cookie is present. Says nothing about
/// whether the session behind it is valid.
#[must_use]
pub fn has_session_cookie(headers: &HeaderMap, name: &str) -> bool {
    let jar = CookieJar::from_headers(headers);
    session_cookie_names(name)
        .iter()
        .any(|n| jar.get(n).is_some_and(|c| !c.value().is_empty()))
}

/// Session cookie names (either spelling) the request carried.
#[must_use]
pub fn present_session_cookies(headers: &HeaderMap, name: &str) -> Vec<String> {
    let inbound = CookieJar::from_headers(headers);
    session_cookie_names(name)
        .into_iter()
        .filter(|n| inbound.get(n).is_some())
        .collect()
}

/// Names of the cookies a response sets.
#[must_use]
pub fn reissued_cookie_names(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| Cookie::parse(raw).ok())
        .map(|c| c.name().to_owned())
        .collect()
}

/// A jar that expires each of `names`.
#[must_use]
pub fn expiring_jar<I>(names: I, secure: bool) -> CookieJar
where
    I: IntoIterator<Item = String>,
{
    names.into_iter().fold(CookieJar::new(), |jar, cookie_name| {
        let secure = secure || cookie_name.starts_with(SECURE_PREFIX);
        jar.add(expired_cookie(cookie_name, secure))
    })
}

/// A jar that expires whichever session cookies the request carried.
#[must_use]
pub fn clearing_jar(headers: &HeaderMap, name: &str, secure: bool) -> CookieJar {
    expiring_jar(present_session_cookies(headers, name), secure)
}

/// An expired cookie that tells the browser to drop `name`.
#[must_use]
pub fn expired_cookie(name: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
#[path = "cookie_test.rs"]
mod tests;
