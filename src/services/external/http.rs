use crate::error::{AuthError, AuthResult};
use crate::models::{ApiEnvelope, AuthEndpoint};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder, Method};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use uuid::Uuid;

/// Backend client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
    /// Timeout for a single request, connect through body
    pub request_timeout: Duration,
    /// User agent string to use
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("crm-access/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// One outbound call. The id identifies the call across a refresh-and-retry.
#[derive(Debug)]
pub struct ApiRequest {
    id: Uuid,
    method: Method,
    path: String,
    body: Option<Value>,
}

/// A clone is a separate call and gets its own retry allowance.
impl Clone for ApiRequest {
    fn clone(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: self.method.clone(),
            path: self.path.clone(),
            body: self.body.clone(),
        }
    }
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn is_login(&self) -> bool {
        AuthEndpoint::is_login_path(&self.path)
    }
}

/// Thin reqwest wrapper that speaks the backend's envelope format.
pub struct ApiTransport {
    client: Client,
    config: HttpConfig,
}

impl ApiTransport {
    /// Create a transport with default configuration
    pub fn new() -> AuthResult<Self> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: HttpConfig) -> AuthResult<Self> {
        let client = ClientBuilder::new()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| AuthError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Send `request`, attaching `token` verbatim as the Authorization header.
    ///
    /// Non-2xx statuses and envelopes whose status is not `"success"` come
    /// back as [`AuthError::Server`] carrying the HTTP status.
    pub async fn send(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> AuthResult<ApiEnvelope> {
        let start_time = Instant::now();
        let url = self.url(request.path());

        let mut builder = self.client.request(request.method().clone(), &url);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        tracing::debug!(
            request_id = %request.id(),
            method = %request.method(),
            path = %request.path(),
            authorized = token.is_some(),
            "sending request"
        );

        let response = timeout(self.config.request_timeout, builder.send())
            .await
            .map_err(|_| AuthError::network(format!("request to {} timed out", request.path())))?
            .map_err(|e| classify_send_error(request, e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            AuthError::network(format!("failed to read response from {}: {}", request.path(), e))
        })?;

        tracing::debug!(
            request_id = %request.id(),
            path = %request.path(),
            status = status.as_u16(),
            duration_ms = start_time.elapsed().as_millis() as u64,
            "request completed"
        );

        if !status.is_success() {
            return Err(AuthError::server(status.as_u16(), error_message(&body)));
        }

        let envelope: ApiEnvelope = serde_json::from_slice(&body).map_err(|e| {
            AuthError::unexpected(format!("malformed response from {}: {}", request.path(), e))
        })?;

        if !envelope.is_success() {
            return Err(AuthError::server(
                status.as_u16(),
                envelope.message().map(str::to_string),
            ));
        }

        Ok(envelope)
    }
}

fn classify_send_error(request: &ApiRequest, error: reqwest::Error) -> AuthError {
    if error.is_timeout() || error.is_connect() || error.is_request() {
        AuthError::network(format!("{} {}: {}", request.method(), request.path(), error))
    } else {
        AuthError::unexpected(format!("{} {}: {}", request.method(), request.path(), error))
    }
}

/// Pull a `message` out of an error body, whatever else it contains.
fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer) -> ApiTransport {
        ApiTransport::with_config(HttpConfig {
            base_url: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_transport_creation() {
        let transport = ApiTransport::new().unwrap();
        assert_eq!(transport.config().request_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_send_attaches_token_verbatim() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/leads"))
            .and(header("authorization", "raw-token"))
            .and(body_json(json!({"name": "Kofi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "message": "Lead created",
                "payload": {"id": 3}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = transport_for(&mock_server);
        let envelope = transport
            .send(&ApiRequest::post("/leads", json!({"name": "Kofi"})), Some("raw-token"))
            .await
            .unwrap();

        assert_eq!(envelope.message(), Some("Lead created"));
        assert_eq!(envelope.payload["id"], 3);
    }

    #[tokio::test]
    async fn test_non_success_envelope_is_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/leads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "fail",
                "message": "Branch is closed"
            })))
            .mount(&mock_server)
            .await;

        let err = transport_for(&mock_server)
            .send(&ApiRequest::get("/leads"), None)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(200));
        assert_eq!(err.user_message(), "Branch is closed");
    }

    #[tokio::test]
    async fn test_error_status_keeps_status_and_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/leads"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/branches"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&mock_server)
            .await;

        let transport = transport_for(&mock_server);

        let err = transport.send(&ApiRequest::get("/leads"), None).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "jwt expired");

        let err = transport.send(&ApiRequest::get("/branches"), None).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert!(matches!(err, AuthError::Server { message: None, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let transport = ApiTransport::with_config(HttpConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        })
        .unwrap();

        let err = transport.send(&ApiRequest::get("/leads"), None).await.unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "success"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let transport = ApiTransport::with_config(HttpConfig {
            base_url: mock_server.uri(),
            request_timeout: Duration::from_millis(50),
            ..Default::default()
        })
        .unwrap();

        let err = transport.send(&ApiRequest::get("/slow"), None).await.unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
    }

    #[test]
    fn test_request_login_detection() {
        assert!(ApiRequest::post("/auth/login/en", json!({})).is_login());
        assert!(!ApiRequest::get("/leads").is_login());
        assert_ne!(ApiRequest::get("/a").id(), ApiRequest::get("/a").id());
    }

    #[test]
    fn test_cloned_request_is_a_new_call() {
        let request = ApiRequest::post("/leads", json!({"name": "Kofi"}));
        let copy = request.clone();

        assert_ne!(copy.id(), request.id());
        assert_eq!(copy.method(), request.method());
        assert_eq!(copy.path(), "/leads");
        assert_eq!(copy.body(), request.body());
    }
}
