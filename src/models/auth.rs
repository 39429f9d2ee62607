use serde::Serialize;

/// Authentication endpoints, all suffixed with the API language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEndpoint {
    Login,
    RefreshToken,
    VerifyOtp,
    ResendOtp,
}

impl AuthEndpoint {
    fn base(&self) -> &'static str {
        match self {
            AuthEndpoint::Login => "/auth/login",
            AuthEndpoint::RefreshToken => "/auth/refreshToken",
            AuthEndpoint::VerifyOtp => "/auth/verifyOTPWithEmail",
            AuthEndpoint::ResendOtp => "/auth/resendOTP",
        }
    }

    pub fn path(&self, language: &str) -> String {
        format!("{}/{}", self.base(), language)
    }

    /// True for any language variant of the login endpoint.
    pub fn is_login_path(path: &str) -> bool {
        let base = AuthEndpoint::Login.base();
        path.strip_prefix(base)
            .map(|rest| rest.is_empty() || (rest.starts_with('/') && !rest[1..].contains('/')))
            .unwrap_or(false)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub login: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpRequest<'a> {
    pub email: &'a str,
    pub passcode: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ResendOtpRequest<'a> {
    pub email: &'a str,
}
