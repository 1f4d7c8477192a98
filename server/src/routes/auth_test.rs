use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower::ServiceExt;

use super::*;
use crate::auth::types::GlobalRole;
use crate::config::GateConfig;
use crate::state::test_helpers::{
    MockAuth, MockSession, TEST_COOKIE, location, request, response_json, session_for, set_cookies, test_app_state,
    test_app_state_with,
};

fn router(mock: Arc<MockAuth>) -> Router {
    crate::routes::app(test_app_state(mock))
}

fn signed_out() -> Arc<MockAuth> {
    Arc::new(MockAuth::new(MockSession::None))
}

// =============================================================================
// session_check
// =============================================================================

#[tokio::test]
async fn session_check_without_cookie_is_unauthorized_without_calling_auth() {
    let mock = Arc::new(MockAuth::new(MockSession::Valid(session_for("u1", GlobalRole::User))));
    let response = router(mock.clone()).oneshot(request("GET", "/api/session-check", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(mock.session_calls(), 0);
}

#[tokio::test]
async fn session_check_maps_each_outcome() {
    let cases = [
        (MockSession::Valid(session_for("u1", GlobalRole::User)), StatusCode::NO_CONTENT),
        (MockSession::None, StatusCode::UNAUTHORIZED),
        (MockSession::Fail, StatusCode::SERVICE_UNAVAILABLE),
    ];
    for (session, expected) in cases {
        let mock = Arc::new(MockAuth::new(session));
        let response = router(mock.clone())
            .oneshot(request("GET", "/api/session-check", Some(TEST_COOKIE), None))
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
        assert_eq!(mock.session_calls(), 1);
    }
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_success_relays_session_cookie() {
    let response = router(signed_out())
        .oneshot(request("POST", "/auth/login", None, Some("email=Ada%40Example.com&password=hunter22")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("better-auth.session_token=new-token")));
    assert_eq!(response_json(response).await, serde_json::json!({ "success": true }));
}

#[tokio::test]
async fn login_over_stale_cookie_keeps_the_new_session() {
    let response = router(signed_out())
        .oneshot(request("POST", "/auth/login", Some(TEST_COOKIE), Some("email=ada%40example.com&password=hunter22")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let last = set_cookies(&response)
        .into_iter()
        .filter(|c| c.starts_with("better-auth.session_token="))
        .last()
        .expect("session cookie set");
    assert!(last.starts_with("better-auth.session_token=new-token"), "{last}");
    assert!(!last.contains("Max-Age=0"), "{last}");
}

#[tokio::test]
async fn rejected_login_over_stale_cookie_still_clears_it() {
    let mock = Arc::new(MockAuth::new(MockSession::None).rejecting_sign_in());
    let response = router(mock)
        .oneshot(request("POST", "/auth/login", Some(TEST_COOKIE), Some("email=ada%40example.com&password=wrong-password")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("better-auth.session_token=;") && c.contains("Max-Age=0")));
}

#[tokio::test]
async fn login_accepts_checked_remember_me_box() {
    let response = router(signed_out())
        .oneshot(request("POST", "/auth/login", None, Some("email=ada%40example.com&password=hunter22&rememberMe=on")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, serde_json::json!({ "success": true }));
}

#[tokio::test]
async fn login_without_form_body_answers_with_action_result() {
    let response = router(signed_out()).oneshot(request("POST", "/auth/login", None, None)).await.unwrap();
    assert!(response.status().is_client_error());
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid form submission");
}

#[tokio::test]
async fn login_with_unreadable_remember_me_answers_with_action_result() {
    let response = router(signed_out())
        .oneshot(request("POST", "/auth/login", None, Some("email=ada%40example.com&password=x&rememberMe=maybe")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_forward_may_outlast_session_verify_timeout() {
    let mock = Arc::new(MockAuth::new(MockSession::None).slow_sign_in(Duration::from_millis(100)));
    let gate = GateConfig { verify_timeout: Duration::from_millis(20), ..GateConfig::default() };
    let response = crate::routes::app(test_app_state_with(mock, gate))
        .oneshot(request("POST", "/auth/login", None, Some("email=ada%40example.com&password=hunter22")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_validation_error_is_returned_inline() {
    let response = router(signed_out())
        .oneshot(request("POST", "/auth/login", None, Some("email=not-an-email&password=hunter22")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).is_empty());
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Please enter a valid email address");
}

#[tokio::test]
async fn login_rejected_credentials_surface_upstream_message() {
    let mock = Arc::new(MockAuth::new(MockSession::None).rejecting_sign_in());
    let response = router(mock)
        .oneshot(request("POST", "/auth/login", None, Some("email=ada%40example.com&password=wrong-password")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn login_with_live_session_goes_to_dashboard() {
    let mock = Arc::new(MockAuth::new(MockSession::Valid(session_for("u1", GlobalRole::User))));
    let response = router(mock)
        .oneshot(request("POST", "/auth/login", Some(TEST_COOKIE), Some("email=ada%40example.com&password=x")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn login_page_renders_for_signed_out_visitor() {
    let response = router(signed_out()).oneshot(request("GET", "/auth/login", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// signup
// =============================================================================

#[tokio::test]
async fn signup_success() {
    let response = router(signed_out())
        .oneshot(request(
            "POST",
            "/auth/signup",
            None,
            Some("name=Ada&email=ada%40example.com&password=correct-horse&confirmPassword=correct-horse"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!set_cookies(&response).is_empty());
}

#[tokio::test]
async fn signup_short_password_is_rejected_before_forwarding() {
    let response = router(signed_out())
        .oneshot(request("POST", "/auth/signup", None, Some("name=Ada&email=ada%40example.com&password=short")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Password must be at least 8 characters");
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_cookie_and_redirects_to_login() {
    let mock = Arc::new(MockAuth::new(MockSession::Valid(session_for("u1", GlobalRole::User))));
    let response = router(mock.clone())
        .oneshot(request("POST", "/auth/logout", Some(TEST_COOKIE), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/auth/login"));
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("better-auth.session_token=") && c.contains("Max-Age=0")));
    // Logout is not a gated page; the gate never verified the session.
    assert_eq!(mock.session_calls(), 0);
}

// =============================================================================
// relay_action
// =============================================================================

#[test]
fn relay_action_maps_upstream_server_errors_to_bad_gateway() {
    let reply = UpstreamReply { status: 500, set_cookies: Vec::new(), body: serde_json::Value::Null };
    assert_eq!(relay_action(reply, "fallback").status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn relay_action_uses_fallback_without_message() {
    let reply = UpstreamReply { status: 422, set_cookies: Vec::new(), body: serde_json::Value::Null };
    assert_eq!(relay_action(reply, "fallback").status(), StatusCode::UNPROCESSABLE_ENTITY);
}
