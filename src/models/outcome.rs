use crate::error::{AuthError, AuthResult};

/// Result of an auth service operation. Both arms carry a message.
#[derive(Debug)]
pub enum AuthOutcome<T> {
    Success {
        data: T,
        message: String,
    },
    Failure {
        message: String,
        error: Option<AuthError>,
    },
}

impl<T> AuthOutcome<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        AuthOutcome::Success {
            data,
            message: message.into(),
        }
    }

    /// Failure whose message is chosen from the error's category.
    pub fn from_error(error: AuthError) -> Self {
        AuthOutcome::Failure {
            message: error.user_message(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            AuthOutcome::Success { message, .. } | AuthOutcome::Failure { message, .. } => message,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AuthOutcome::Success { data, .. } => Some(data),
            AuthOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&AuthError> {
        match self {
            AuthOutcome::Success { .. } => None,
            AuthOutcome::Failure { error, .. } => error.as_ref(),
        }
    }

    pub fn into_result(self) -> AuthResult<T> {
        match self {
            AuthOutcome::Success { data, .. } => Ok(data),
            AuthOutcome::Failure { message, error } => {
                Err(error.unwrap_or(AuthError::Unexpected(message)))
            }
        }
    }
}
