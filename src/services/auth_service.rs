use crate::auth::profile::UserProfile;
use crate::auth::session::{Session, SessionSnapshot};
use crate::error::{AuthError, AuthResult};
use crate::models::{
    ApiEnvelope, AuthEndpoint, AuthOutcome, LoginRequest, ResendOtpRequest, VerifyOtpRequest,
};
use crate::services::external::http::{ApiRequest, ApiTransport};
use crate::services::navigation::{NavigationTarget, Navigator};
use crate::utils::validation::{
    validate_email, validate_login_identifier, validate_passcode, validate_password,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";
const REFRESH_SUCCESS_MESSAGE: &str = "Token refreshed";
const OTP_VERIFIED_MESSAGE: &str = "OTP verified successfully";
const OTP_SENT_MESSAGE: &str = "OTP sent successfully";

/// Client side of the backend's auth endpoints. The only writer of [`Session`].
pub struct AuthService {
    transport: Arc<ApiTransport>,
    session: Arc<Session>,
    navigator: Arc<dyn Navigator>,
    language: String,
    refresh_lock: Mutex<()>,
}

impl AuthService {
    pub fn new(
        transport: Arc<ApiTransport>,
        session: Arc<Session>,
        navigator: Arc<dyn Navigator>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
            language: language.into(),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Sign in, then upgrade the provisional login token with one refresh
    /// before reporting success.
    pub async fn login(&self, identifier: &str, password: &str) -> AuthOutcome<UserProfile> {
        match self.try_login(identifier, password).await {
            Ok((profile, message)) => AuthOutcome::success(profile, message),
            Err(e) => AuthOutcome::from_error(e),
        }
    }

    async fn try_login(
        &self,
        identifier: &str,
        password: &str,
    ) -> AuthResult<(UserProfile, String)> {
        let kind = validate_login_identifier(identifier)?;
        validate_password(password)?;

        tracing::info!(identifier_kind = kind.as_str(), "login attempt");

        let body = serde_json::to_value(LoginRequest {
            login: identifier.trim(),
            password,
        })?;
        let request = ApiRequest::post(AuthEndpoint::Login.path(&self.language), body);
        let envelope = self.transport.send(&request, None).await?;

        let (token, profile) = Self::user_info(&envelope)?;
        self.session.establish(token, profile).await;

        let snapshot = match self.refresh(None).await {
            Ok((snapshot, _)) => snapshot,
            Err(e) => {
                tracing::warn!(
                    code = e.error_code(),
                    "post-login refresh failed, discarding provisional session"
                );
                self.session.clear().await;
                return Err(e);
            }
        };

        tracing::info!(role = %snapshot.profile.role_name, "login succeeded");

        let message = envelope
            .message()
            .unwrap_or(LOGIN_SUCCESS_MESSAGE)
            .to_string();
        Ok((snapshot.profile, message))
    }

    /// Exchange `token_override`, or the session token, for a new token and profile.
    ///
    /// A 401 here is unrecoverable: the session is cleared and the user is
    /// sent to login before this returns.
    pub async fn refresh_token(&self, token_override: Option<&str>) -> AuthOutcome<SessionSnapshot> {
        match self.refresh(token_override).await {
            Ok((snapshot, message)) => AuthOutcome::success(
                snapshot,
                message.unwrap_or_else(|| REFRESH_SUCCESS_MESSAGE.to_string()),
            ),
            Err(e) => AuthOutcome::from_error(e),
        }
    }

    /// Refresh on behalf of a request that was rejected while carrying `stale_token`.
    ///
    /// Only one refresh runs at a time. A caller that waited while another
    /// refresh replaced `stale_token` gets that token without a second call.
    pub async fn refresh_after_rejection(
        &self,
        stale_token: Option<&str>,
    ) -> AuthResult<String> {
        let _guard = self.refresh_lock.lock().await;

        match self.session.access_token() {
            // The request went out signed out; there is nothing to refresh.
            None if stale_token.is_none() => return Err(AuthError::MissingToken),
            // Ended by a concurrent refresh, which already redirected.
            None => return Err(AuthError::session_expired("no session left to refresh")),
            Some(current) if Some(current.as_str()) != stale_token => {
                tracing::debug!("reusing token from a concurrent refresh");
                return Ok(current);
            }
            Some(_) => {}
        }

        let (snapshot, _) = self.refresh(None).await?;
        Ok(snapshot.access_token)
    }

    async fn refresh(
        &self,
        token_override: Option<&str>,
    ) -> AuthResult<(SessionSnapshot, Option<String>)> {
        let token = token_override
            .map(str::to_string)
            .or_else(|| self.session.access_token())
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let request = ApiRequest::post(AuthEndpoint::RefreshToken.path(&self.language), json!({}));
        let envelope = match self.transport.send(&request, Some(&token)).await {
            Ok(envelope) => envelope,
            Err(e) if e.is_unauthorized() => {
                tracing::warn!("refresh token rejected, ending session");
                self.session.clear().await;
                self.navigator.navigate(NavigationTarget::session_expired());
                return Err(AuthError::session_expired("refresh token rejected"));
            }
            Err(e) => return Err(e),
        };

        let (token, profile) = Self::user_info(&envelope)?;
        let snapshot = self.session.establish(token, profile).await;

        tracing::debug!(role = %snapshot.profile.role_name, "token refreshed");
        Ok((snapshot, envelope.message().map(str::to_string)))
    }

    /// Confirm the emailed passcode and merge any returned profile fields.
    pub async fn verify_otp(&self, email: &str, passcode: &str) -> AuthOutcome<UserProfile> {
        match self.try_verify_otp(email, passcode).await {
            Ok((profile, message)) => AuthOutcome::success(profile, message),
            Err(e) => AuthOutcome::from_error(e),
        }
    }

    async fn try_verify_otp(
        &self,
        email: &str,
        passcode: &str,
    ) -> AuthResult<(UserProfile, String)> {
        let token = self.session.access_token().ok_or(AuthError::MissingToken)?;
        validate_email(email)?;
        validate_passcode(passcode)?;

        let body = serde_json::to_value(VerifyOtpRequest {
            email: email.trim(),
            passcode,
        })?;
        let request = ApiRequest::post(AuthEndpoint::VerifyOtp.path(&self.language), body);
        let envelope = self.transport.send(&request, Some(&token)).await?;

        let current = self.session.profile().ok_or(AuthError::MissingToken)?;
        let profile = match envelope.user_info() {
            Some(update) => {
                let merged = current.merge(update)?;
                self.session
                    .replace_profile(merged)
                    .await
                    .ok_or(AuthError::MissingToken)?
                    .profile
            }
            None => current,
        };

        tracing::info!("otp verified");

        let message = envelope.message().unwrap_or(OTP_VERIFIED_MESSAGE).to_string();
        Ok((profile, message))
    }

    /// Ask the backend to email a new passcode. Each call is independent.
    pub async fn resend_otp(&self, email: &str) -> AuthOutcome<Value> {
        match self.try_resend_otp(email).await {
            Ok((payload, message)) => AuthOutcome::success(payload, message),
            Err(e) => AuthOutcome::from_error(e),
        }
    }

    async fn try_resend_otp(&self, email: &str) -> AuthResult<(Value, String)> {
        let token = self.session.access_token().ok_or(AuthError::MissingToken)?;
        validate_email(email)?;

        let body = serde_json::to_value(ResendOtpRequest {
            email: email.trim(),
        })?;
        let request = ApiRequest::post(AuthEndpoint::ResendOtp.path(&self.language), body);
        let envelope = self.transport.send(&request, Some(&token)).await?;

        tracing::info!("otp resent");

        let message = envelope.message().unwrap_or(OTP_SENT_MESSAGE).to_string();
        Ok((envelope.payload, message))
    }

    /// Forget the session. Local only, never fails.
    pub async fn logout_user(&self) {
        self.session.clear().await;
        tracing::info!("user logged out");
    }

    fn user_info(envelope: &ApiEnvelope) -> AuthResult<(String, UserProfile)> {
        let user_info = envelope
            .user_info()
            .ok_or_else(|| AuthError::invalid_profile("response has no userInfo"))?;
        UserProfile::from_user_info(user_info)
    }
}
