use uuid::Uuid;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";
pub const SERVER_FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";
pub const MISSING_TOKEN_MESSAGE: &str = "No authentication token found. Please log in again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No authentication token available")]
    MissingToken,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Invalid user profile: {0}")]
    InvalidProfile(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Coarse classification used for UI messaging and control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Resolved locally before any network call.
    LocalPrecondition,
    /// No response was received.
    Transport,
    /// The backend answered with an error status or a non-success envelope.
    Server,
    /// Recovery requires new credentials.
    SessionFatal,
    Internal,
}

impl AuthError {
    /// Create a new validation error
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new network error
    pub fn network<T: Into<String>>(msg: T) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new server error
    pub fn server(status: u16, message: Option<String>) -> Self {
        Self::Server {
            status,
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    /// Create a new session expired error
    pub fn session_expired<T: Into<String>>(msg: T) -> Self {
        Self::SessionExpired(msg.into())
    }

    /// Create a new invalid profile error
    pub fn invalid_profile<T: Into<String>>(msg: T) -> Self {
        Self::InvalidProfile(msg.into())
    }

    /// Create a new storage error
    pub fn storage<T: Into<String>>(msg: T) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new unexpected error
    pub fn unexpected<T: Into<String>>(msg: T) -> Self {
        Self::Unexpected(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingToken | AuthError::Validation(_) => ErrorKind::LocalPrecondition,
            AuthError::Network(_) => ErrorKind::Transport,
            AuthError::Server { .. } | AuthError::InvalidProfile(_) => ErrorKind::Server,
            AuthError::SessionExpired(_) => ErrorKind::SessionFatal,
            AuthError::Storage(_)
            | AuthError::Io(_)
            | AuthError::Serialization(_)
            | AuthError::Configuration(_)
            | AuthError::Unexpected(_) => ErrorKind::Internal,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::Network(_) => "NETWORK_ERROR",
            AuthError::Server { .. } => "SERVER_ERROR",
            AuthError::SessionExpired(_) => "SESSION_EXPIRED",
            AuthError::InvalidProfile(_) => "INVALID_PROFILE",
            AuthError::Storage(_) => "STORAGE_ERROR",
            AuthError::Io(_) => "IO_ERROR",
            AuthError::Serialization(_) => "SERIALIZATION_ERROR",
            AuthError::Configuration(_) => "CONFIG_ERROR",
            AuthError::Unexpected(_) => "UNEXPECTED_ERROR",
        }
    }

    /// HTTP status of a server rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Message shown next to the form that triggered the failure.
    pub fn user_message(&self) -> String {
        let error_id = Uuid::new_v4();

        match self {
            AuthError::Server { status, message } => {
                tracing::warn!(
                    error_id = %error_id,
                    status = status,
                    code = self.error_code(),
                    "server rejected request"
                );
                message
                    .clone()
                    .unwrap_or_else(|| SERVER_FALLBACK_MESSAGE.to_string())
            }
            AuthError::Network(msg) => {
                tracing::warn!(
                    error_id = %error_id,
                    error = %msg,
                    code = self.error_code(),
                    "no response from backend"
                );
                NETWORK_ERROR_MESSAGE.to_string()
            }
            AuthError::MissingToken => {
                tracing::warn!(error_id = %error_id, code = self.error_code(), "no session token");
                MISSING_TOKEN_MESSAGE.to_string()
            }
            AuthError::SessionExpired(_) => {
                tracing::warn!(error_id = %error_id, code = self.error_code(), "session expired");
                SESSION_EXPIRED_MESSAGE.to_string()
            }
            AuthError::Validation(msg) => {
                tracing::debug!(error_id = %error_id, error = %msg, "validation failed");
                msg.clone()
            }
            other => {
                tracing::error!(
                    error_id = %error_id,
                    error = %other,
                    code = other.error_code(),
                    "unexpected error occurred"
                );
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }
}

/// Result alias used across the crate
pub type AuthResult<T> = Result<T, AuthError>;
