mod common;

use common::*;
use crm_access::auth::{GuardDecision, Route};
use crm_access::error::{AuthError, MISSING_TOKEN_MESSAGE, NETWORK_ERROR_MESSAGE};
use crm_access::repositories::SessionRepository;
use crm_access::services::NavigationTarget;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_upgrades_token_before_returning() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "provisional", "Agent").await;
    mount_refresh(&mock_server, "provisional", "refreshed", "Agent", 1).await;

    let client = signed_out_client(&mock_server).await;
    let outcome = client.state.auth_service.login("a@b.com", "s3cret!").await;

    assert!(outcome.is_success(), "login failed: {}", outcome.message());
    assert_eq!(outcome.data().unwrap().role_name, "Agent");
    assert_eq!(
        client.state.session.access_token().as_deref(),
        Some("refreshed")
    );

    let stored = client.repository.load().await.unwrap();
    assert_eq!(stored.auth_token.as_deref(), Some("refreshed"));
    assert!(!stored.user_info.unwrap().contains("accessToken"));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.path(), LOGIN_PATH);
    assert!(requests[0].headers.get("authorization").is_none());
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body, json!({"login": "a@b.com", "password": "s3cret!"}));
    assert_eq!(requests[1].url.path(), REFRESH_PATH);
}

#[tokio::test]
async fn test_login_rejection_leaves_session_untouched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail",
            "message": "Invalid credentials"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = signed_in_client(&mock_server, "existing", "Admin").await;
    let outcome = client.state.auth_service.login("a@b.com", "short").await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.message(), "Invalid credentials");
    assert_eq!(
        client.state.session.access_token().as_deref(),
        Some("existing")
    );
    assert_eq!(client.state.session.role_name().as_deref(), Some("Admin"));
}

#[tokio::test]
async fn test_login_without_response_uses_network_message() {
    let client = unreachable_client().await;
    let outcome = client.state.auth_service.login("a@b.com", "s3cret!").await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.message(), NETWORK_ERROR_MESSAGE);
    assert!(matches!(outcome.error(), Some(AuthError::Network(_))));
    assert!(!client.state.session.is_authenticated());
}

#[tokio::test]
async fn test_login_discards_session_when_refresh_fails() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "provisional", "Agent").await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "message": "Token service unavailable"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = signed_out_client(&mock_server).await;
    let outcome = client.state.auth_service.login("a@b.com", "s3cret!").await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.message(), "Token service unavailable");
    assert!(!client.state.session.is_authenticated());
    assert!(client.repository.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_response_without_token_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "ok",
            "payload": {"userInfo": {"roleName": "Agent"}}
        })))
        .mount(&mock_server)
        .await;

    let client = signed_out_client(&mock_server).await;
    let outcome = client.state.auth_service.login("a@b.com", "s3cret!").await;

    assert!(matches!(outcome.error(), Some(AuthError::InvalidProfile(_))));
    assert!(!client.state.session.is_authenticated());
}

#[tokio::test]
async fn test_refresh_without_token_fails_locally() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = signed_out_client(&mock_server).await;
    let outcome = client.state.auth_service.refresh_token(None).await;

    assert!(!outcome.is_success());
    assert!(matches!(outcome.error(), Some(AuthError::MissingToken)));
    assert_eq!(outcome.message(), MISSING_TOKEN_MESSAGE);
    assert!(client.navigator.history().is_empty());
}

#[tokio::test]
async fn test_refresh_rejected_with_401_ends_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(header("authorization", "expired"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "fail",
            "message": "jwt expired"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = signed_in_client(&mock_server, "expired", "Agent").await;
    let outcome = client.state.auth_service.refresh_token(None).await;

    assert!(matches!(outcome.error(), Some(AuthError::SessionExpired(_))));
    assert!(!client.state.session.is_authenticated());
    assert!(client.repository.load().await.unwrap().is_empty());
    assert_eq!(
        client.navigator.history(),
        vec![NavigationTarget::session_expired()]
    );
}

#[tokio::test]
async fn test_refresh_server_error_keeps_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = signed_in_client(&mock_server, "tok", "Agent").await;
    let outcome = client.state.auth_service.refresh_token(None).await;

    assert_eq!(outcome.error().and_then(AuthError::status), Some(503));
    assert_eq!(client.state.session.access_token().as_deref(), Some("tok"));
    assert!(client.navigator.history().is_empty());
}

#[tokio::test]
async fn test_verify_otp_merges_profile_and_keeps_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(VERIFY_OTP_PATH))
        .and(header("authorization", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Email verified",
            "payload": {"userInfo": {
                "accessToken": "ignored",
                "roleName": "Sales Manager",
                "emailVerified": true
            }}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = signed_in_client(&mock_server, "tok", "Agent").await;
    let outcome = client
        .state
        .auth_service
        .verify_otp("user@crm.test", "123456")
        .await;

    assert!(outcome.is_success(), "verify failed: {}", outcome.message());
    assert_eq!(outcome.message(), "Email verified");

    let profile = client.state.session.profile().unwrap();
    assert_eq!(profile.role_name, "Sales Manager");
    assert_eq!(profile.name.as_deref(), Some("Test User"));
    assert_eq!(profile.extra.get("emailVerified"), Some(&json!(true)));
    assert!(!profile.extra.contains_key("accessToken"));
    assert_eq!(client.state.session.access_token().as_deref(), Some("tok"));

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body, json!({"email": "user@crm.test", "passcode": "123456"}));
}

#[tokio::test]
async fn test_verify_otp_rejects_malformed_passcode_locally() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = signed_in_client(&mock_server, "tok", "Agent").await;
    let outcome = client
        .state
        .auth_service
        .verify_otp("user@crm.test", "12ab56")
        .await;

    assert!(matches!(outcome.error(), Some(AuthError::Validation(_))));
}

#[tokio::test]
async fn test_resend_otp_calls_are_independent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RESEND_OTP_PATH))
        .and(header("authorization", "tok"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(success_envelope(json!({"sent": true}))),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = signed_in_client(&mock_server, "tok", "Agent").await;

    for _ in 0..2 {
        let outcome = client.state.auth_service.resend_otp("user@crm.test").await;
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "OTP sent successfully");
        assert_eq!(outcome.data(), Some(&json!({"sent": true})));
    }
}

#[tokio::test]
async fn test_logout_clears_persisted_session() {
    let mock_server = MockServer::start().await;
    let client = signed_in_client(&mock_server, "tok", "Agent").await;
    assert!(client.state.session.is_authenticated());

    client.state.auth_service.logout_user().await;

    assert!(!client.state.session.is_authenticated());
    assert!(client.repository.load().await.unwrap().is_empty());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_guard_follows_restored_session() {
    let mock_server = MockServer::start().await;
    let client = signed_in_client(&mock_server, "tok", "Agent").await;
    let guard = &client.state.guard;

    assert_eq!(guard.check("/leads", Some("/leads")), GuardDecision::Render);
    assert_eq!(guard.check("/dashboard", None), GuardDecision::Render);
    assert_eq!(
        guard.check("/branches", Some("/branches")),
        GuardDecision::RedirectDashboard
    );

    assert!(!guard.enforce(client.navigator.as_ref(), "/branches", Some("/branches")));
    assert_eq!(client.navigator.last(), Some(NavigationTarget::Dashboard));

    let menu: Vec<Route> = client.state.menu().into_iter().map(|e| e.route).collect();
    assert_eq!(menu, vec![Route::Dashboard, Route::Leads]);
}

#[tokio::test]
async fn test_guard_sends_signed_out_user_to_login_with_origin() {
    let mock_server = MockServer::start().await;
    let client = signed_out_client(&mock_server).await;

    assert_eq!(
        client.state.guard.check("/leads/add", Some("/leads/add")),
        GuardDecision::RedirectLogin {
            from: "/leads/add".to_string()
        }
    );
}
