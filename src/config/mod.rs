use crate::auth::rbac::UnknownRolePolicy;
use crate::services::external::http::HttpConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use thiserror::Error;


/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Where the session is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStoreKind {
    File,
    Memory,
}

/// Client settings with environment variable support
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Backend
    pub api_base_url: String,
    pub api_language: String,
    pub request_timeout_seconds: f64,
    pub user_agent: String,

    // Session
    pub session_store: String,
    pub session_store_path: String,
    pub unknown_role_policy: String,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl Settings {
    /// Create new settings instance from environment variables and .env file
    pub fn new() -> Result<Self, ConfigError> {
        Self::new_with_env_file(true)
    }

    /// Create new settings instance with optional .env file loading
    pub fn new_with_env_file(load_env_file: bool) -> Result<Self, ConfigError> {
        // Tests mutate process env; serialize reads
        static SETTINGS_BUILD_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        let build_mutex = SETTINGS_BUILD_MUTEX.get_or_init(|| Mutex::new(()));
        let _guard = build_mutex
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        #[cfg(not(test))]
        {
            if load_env_file {
                dotenvy::dotenv().ok();
            }
        }
        #[cfg(test)]
        let _ = load_env_file;

        let mut builder = config::Config::builder()
            // Backend defaults
            .set_default("api_base_url", "http://localhost:8080/api")?
            .set_default("api_language", "en")?
            .set_default("request_timeout_seconds", 30.0)?
            .set_default(
                "user_agent",
                format!("crm-access/{}", env!("CARGO_PKG_VERSION")),
            )?
            // Session defaults
            .set_default("session_store", "file")?
            .set_default("session_store_path", "./data/session.json")?
            .set_default("unknown_role_policy", "fallback")?
            // Logging defaults
            .set_default("log_level", "INFO")?
            .set_default("log_format", "json")?;

        // Explicit, uppercase-only environment overrides
        fn read_env(key: &str) -> Option<String> {
            std::env::var(key).ok()
        }

        if let Some(v) = read_env("API_BASE_URL") { builder = builder.set_override("api_base_url", v)?; }
        if let Some(v) = read_env("API_LANGUAGE") { builder = builder.set_override("api_language", v)?; }
        if let Some(v) = read_env("USER_AGENT") { builder = builder.set_override("user_agent", v)?; }
        if let Some(v) = read_env("SESSION_STORE") { builder = builder.set_override("session_store", v)?; }
        if let Some(v) = read_env("SESSION_STORE_PATH") { builder = builder.set_override("session_store_path", v)?; }
        if let Some(v) = read_env("UNKNOWN_ROLE_POLICY") { builder = builder.set_override("unknown_role_policy", v)?; }
        if let Some(v) = read_env("LOG_LEVEL") { builder = builder.set_override("log_level", v)?; }
        if let Some(v) = read_env("LOG_FORMAT") { builder = builder.set_override("log_format", v)?; }

        // Numeric overrides
        if let Some(v) = read_env("REQUEST_TIMEOUT_SECONDS").and_then(|s| s.parse::<f64>().ok()) { builder = builder.set_override("request_timeout_seconds", v)?; }

        let settings = builder.build()?;
        let config: Settings = settings.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "api_base_url must start with http:// or https://".to_string(),
            ));
        }

        if self.api_language.is_empty()
            || !self.api_language.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ConfigError::Validation(
                "api_language must be a non-empty alphanumeric code".to_string(),
            ));
        }

        if self.request_timeout_seconds <= 0.0 || !self.request_timeout_seconds.is_finite() {
            return Err(ConfigError::Validation(
                "request_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        match self.session_store.as_str() {
            "memory" => {}
            "file" => {
                if self.session_store_path.trim().is_empty() {
                    return Err(ConfigError::Validation(
                        "session_store_path is required when session_store is 'file'".to_string(),
                    ));
                }
            }
            _ => {
                return Err(ConfigError::Validation(
                    "session_store must be 'file' or 'memory'".to_string(),
                ))
            }
        }

        if UnknownRolePolicy::from_setting(&self.unknown_role_policy).is_none() {
            return Err(ConfigError::Validation(
                "unknown_role_policy must be 'fallback' or 'deny'".to_string(),
            ));
        }

        if !matches!(self.log_format.as_str(), "json" | "plain") {
            return Err(ConfigError::Validation(
                "log_format must be 'json' or 'plain'".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_seconds)
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            base_url: self.api_base_url.clone(),
            request_timeout: self.request_timeout(),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn session_store_kind(&self) -> SessionStoreKind {
        match self.session_store.as_str() {
            "memory" => SessionStoreKind::Memory,
            _ => SessionStoreKind::File,
        }
    }

    pub fn session_file(&self) -> PathBuf {
        PathBuf::from(&self.session_store_path)
    }

    pub fn role_policy(&self) -> UnknownRolePolicy {
        UnknownRolePolicy::from_setting(&self.unknown_role_policy).unwrap_or_default()
    }
}
