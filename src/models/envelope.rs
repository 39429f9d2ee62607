use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUCCESS_STATUS: &str = "success";

/// Shape shared by every backend response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub payload: Value,
}

impl ApiEnvelope {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Server message, if it says anything.
    pub fn message(&self) -> Option<&str> {
        let trimmed = self.message.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// `payload.userInfo`, when present and not null.
    pub fn user_info(&self) -> Option<&Value> {
        self.payload.get("userInfo").filter(|v| !v.is_null())
    }
}
