#![allow(dead_code)]

use crm_access::config::Settings;
use crm_access::repositories::{InMemorySessionRepository, StoredSession};
use crm_access::services::RecordingNavigator;
use crm_access::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LOGIN_PATH: &str = "/auth/login/en";
pub const REFRESH_PATH: &str = "/auth/refreshToken/en";
pub const VERIFY_OTP_PATH: &str = "/auth/verifyOTPWithEmail/en";
pub const RESEND_OTP_PATH: &str = "/auth/resendOTP/en";

pub struct TestClient {
    pub state: AppState,
    pub navigator: Arc<RecordingNavigator>,
    pub repository: Arc<InMemorySessionRepository>,
}

pub fn settings_for(base_url: &str) -> Settings {
    Settings {
        api_base_url: base_url.to_string(),
        api_language: "en".to_string(),
        request_timeout_seconds: 5.0,
        user_agent: "crm-access-tests".to_string(),
        session_store: "memory".to_string(),
        session_store_path: String::new(),
        unknown_role_policy: "fallback".to_string(),
        log_level: "DEBUG".to_string(),
        log_format: "plain".to_string(),
    }
}

async fn build(base_url: &str, stored: StoredSession) -> TestClient {
    let repository = Arc::new(InMemorySessionRepository::with_stored(stored));
    let navigator = Arc::new(RecordingNavigator::new());
    let state = AppState::new_with_repository(
        settings_for(base_url),
        repository.clone(),
        navigator.clone(),
    )
    .await
    .expect("Failed to build client state");

    TestClient {
        state,
        navigator,
        repository,
    }
}

/// Client with no session.
pub async fn signed_out_client(server: &MockServer) -> TestClient {
    build(&server.uri(), StoredSession::default()).await
}

/// Client whose persisted session is restored at startup.
pub async fn signed_in_client(server: &MockServer, token: &str, role: &str) -> TestClient {
    let stored = StoredSession {
        auth_token: Some(token.to_string()),
        user_info: Some(
            json!({"roleName": role, "name": "Test User", "email": "user@crm.test"}).to_string(),
        ),
    };
    build(&server.uri(), stored).await
}

/// Client pointed at a port nothing listens on.
pub async fn unreachable_client() -> TestClient {
    build("http://127.0.0.1:1", StoredSession::default()).await
}

pub fn user_info_envelope(token: &str, role: &str) -> Value {
    json!({
        "status": "success",
        "message": "",
        "payload": {
            "userInfo": {
                "accessToken": token,
                "roleName": role,
                "name": "Test User",
                "email": "user@crm.test"
            }
        }
    })
}

pub fn success_envelope(payload: Value) -> Value {
    json!({"status": "success", "message": "", "payload": payload})
}

pub async fn mount_login(server: &MockServer, token: &str, role: &str) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_info_envelope(token, role)))
        .expect(1)
        .mount(server)
        .await;
}

/// Refresh that accepts `presented` and hands out `issued`.
pub async fn mount_refresh(
    server: &MockServer,
    presented: &str,
    issued: &str,
    role: &str,
    times: u64,
) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(header("authorization", presented))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_info_envelope(issued, role)))
        .expect(times)
        .mount(server)
        .await;
}
