use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ACCESS_TOKEN_FIELD: &str = "accessToken";

/// Profile of the signed-in user as returned in `userInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub role_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Any other fields the backend sends, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Split a `userInfo` payload into its access token and validated profile.
    pub fn from_user_info(user_info: &Value) -> AuthResult<(String, UserProfile)> {
        let mut fields = user_info
            .as_object()
            .cloned()
            .ok_or_else(|| AuthError::invalid_profile("userInfo is not an object"))?;

        let token = match fields.remove(ACCESS_TOKEN_FIELD) {
            Some(Value::String(token)) if !token.is_empty() => token,
            _ => return Err(AuthError::invalid_profile("userInfo has no accessToken")),
        };

        let profile = Self::from_fields(fields)?;
        Ok((token, profile))
    }

    /// Decode a stored profile (the persisted `userInfo` value).
    pub fn from_json(raw: &str) -> AuthResult<UserProfile> {
        let value: Value = serde_json::from_str(raw)?;
        match value {
            Value::Object(mut fields) => {
                fields.remove(ACCESS_TOKEN_FIELD);
                Self::from_fields(fields)
            }
            _ => Err(AuthError::invalid_profile("stored profile is not an object")),
        }
    }

    fn from_fields(fields: Map<String, Value>) -> AuthResult<UserProfile> {
        let profile: UserProfile = serde_json::from_value(Value::Object(fields))
            .map_err(|e| AuthError::invalid_profile(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> AuthResult<()> {
        if self.role_name.trim().is_empty() {
            return Err(AuthError::invalid_profile("roleName is empty"));
        }
        Ok(())
    }

    /// Overlay fields from a partial profile. The access token is never merged.
    pub fn merge(&self, update: &Value) -> AuthResult<UserProfile> {
        let update = update
            .as_object()
            .ok_or_else(|| AuthError::invalid_profile("profile update is not an object"))?;

        let mut fields = match serde_json::to_value(self)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        for (key, value) in update {
            if key != ACCESS_TOKEN_FIELD {
                fields.insert(key.clone(), value.clone());
            }
        }

        Self::from_fields(fields)
    }

    pub fn to_json(&self) -> AuthResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
