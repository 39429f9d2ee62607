use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_INFO_KEY: &str = "userInfo";

/// Raw persisted values. Either half may be missing if storage was tampered with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(rename = "authToken", default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(rename = "userInfo", default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<String>,
}

impl StoredSession {
    pub fn is_empty(&self) -> bool {
        self.auth_token.is_none() && self.user_info.is_none()
    }
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn load(&self) -> AuthResult<StoredSession>;
    /// Writes both keys in one operation.
    async fn save(&self, auth_token: &str, user_info: &str) -> AuthResult<()>;
    /// Removes both keys in one operation.
    async fn clear(&self) -> AuthResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    stored: Mutex<StoredSession>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed arbitrary (possibly inconsistent) state.
    pub fn with_stored(stored: StoredSession) -> Self {
        Self {
            stored: Mutex::new(stored),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn load(&self) -> AuthResult<StoredSession> {
        Ok(self.stored.lock().await.clone())
    }

    async fn save(&self, auth_token: &str, user_info: &str) -> AuthResult<()> {
        *self.stored.lock().await = StoredSession {
            auth_token: Some(auth_token.to_string()),
            user_info: Some(user_info.to_string()),
        };
        Ok(())
    }

    async fn clear(&self) -> AuthResult<()> {
        *self.stored.lock().await = StoredSession::default();
        Ok(())
    }
}

/// Keeps the session in a small JSON document so it survives restarts.
#[derive(Debug)]
pub struct FileSessionRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, stored: &StoredSession) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_vec_pretty(stored)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, body).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for FileSessionRepository {
    async fn load(&self) -> AuthResult<StoredSession> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AuthError::storage(format!(
                    "Failed to parse session file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(AuthError::Io(e)),
        }
    }

    async fn save(&self, auth_token: &str, user_info: &str) -> AuthResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write(&StoredSession {
            auth_token: Some(auth_token.to_string()),
            user_info: Some(user_info.to_string()),
        })
        .await
    }

    async fn clear(&self) -> AuthResult<()> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Io(e)),
        }
    }
}
