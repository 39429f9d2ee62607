use crate::error::{AuthError, AuthResult};
use crate::models::ApiEnvelope;
use crate::services::auth_service::AuthService;
use crate::services::external::http::{ApiRequest, ApiTransport};
use crate::services::navigation::{NavigationTarget, Navigator};
use dashmap::DashSet;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Wraps every outbound call: attaches the session token and, on the first
/// 401, refreshes once and re-issues the request.
pub struct AuthInterceptor {
    transport: Arc<ApiTransport>,
    auth: Arc<AuthService>,
    navigator: Arc<dyn Navigator>,
    retried: DashSet<Uuid>,
}

impl AuthInterceptor {
    pub fn new(
        transport: Arc<ApiTransport>,
        auth: Arc<AuthService>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            auth,
            navigator,
            retried: DashSet::new(),
        }
    }

    pub async fn send(&self, request: ApiRequest) -> AuthResult<ApiEnvelope> {
        let token = self.token_for(&request);

        match self.transport.send(&request, token.as_deref()).await {
            Err(e)
                if e.is_unauthorized()
                    && !request.is_login()
                    && self.retried.insert(request.id()) =>
            {
                let result = self.refresh_and_retry(&request, token.as_deref()).await;
                self.retried.remove(&request.id());
                result
            }
            other => other,
        }
    }

    pub async fn get(&self, path: &str) -> AuthResult<ApiEnvelope> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> AuthResult<ApiEnvelope> {
        let body = serde_json::to_value(body)?;
        self.send(ApiRequest::post(path, body)).await
    }

    /// Send `request` and decode the envelope payload as `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> AuthResult<T> {
        let envelope = self.send(request).await?;
        Ok(serde_json::from_value(envelope.payload)?)
    }

    fn token_for(&self, request: &ApiRequest) -> Option<String> {
        if request.is_login() {
            None
        } else {
            self.auth.session().access_token()
        }
    }

    async fn refresh_and_retry(
        &self,
        request: &ApiRequest,
        stale_token: Option<&str>,
    ) -> AuthResult<ApiEnvelope> {
        tracing::debug!(
            request_id = %request.id(),
            path = %request.path(),
            "request rejected with 401, refreshing session"
        );

        match self.auth.refresh_after_rejection(stale_token).await {
            Ok(token) => {
                tracing::debug!(request_id = %request.id(), "retrying with refreshed token");
                // A second 401 is final.
                self.transport.send(request, Some(&token)).await
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request.id(),
                    code = e.error_code(),
                    "session refresh failed"
                );
                match &e {
                    // Already ended and redirected by the refresh.
                    AuthError::SessionExpired(_) => {}
                    AuthError::MissingToken => self.navigator.navigate(NavigationTarget::sign_in()),
                    _ => {
                        self.auth.logout_user().await;
                        self.navigator.navigate(NavigationTarget::session_expired());
                    }
                }
                Err(AuthError::session_expired(format!("refresh failed: {}", e)))
            }
        }
    }
}
