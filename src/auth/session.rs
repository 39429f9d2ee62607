use crate::auth::profile::UserProfile;
use crate::repositories::SessionRepository;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;

/// The authenticated identity: token and profile, always together.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    #[serde(skip_serializing)]
    pub access_token: String,
    pub profile: UserProfile,
    pub established_at: DateTime<Utc>,
}

/// Process-wide session handle shared by the auth service, interceptor and guard.
///
/// Reads are synchronous. Writes are crate-private so that only the auth
/// service can change who is signed in.
pub struct Session {
    repo: Arc<dyn SessionRepository>,
    state: RwLock<Option<SessionSnapshot>>,
    writer: Mutex<()>,
}

impl Session {
    pub fn new(repo: Arc<dyn SessionRepository>) -> Self {
        Self {
            repo,
            state: RwLock::new(None),
            writer: Mutex::new(()),
        }
    }

    /// Restore persisted state. Half-written or undecodable state is wiped.
    pub async fn init(&self) {
        let _guard = self.writer.lock().await;

        let stored = match self.repo.load().await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load persisted session, starting signed out");
                *self.write_state() = None;
                self.clear_persisted().await;
                return;
            }
        };

        let restored = match (stored.auth_token, stored.user_info) {
            (None, None) => None,
            (Some(token), Some(user_info)) if !token.is_empty() => {
                match UserProfile::from_json(&user_info) {
                    Ok(profile) => Some(SessionSnapshot {
                        access_token: token,
                        profile,
                        established_at: Utc::now(),
                    }),
                    Err(e) => {
                        tracing::warn!(error = %e, "persisted profile is invalid, clearing session");
                        None
                    }
                }
            }
            _ => {
                tracing::warn!("persisted session is missing its token or profile, clearing session");
                None
            }
        };

        if restored.is_none() {
            self.clear_persisted().await;
        } else {
            tracing::debug!("restored persisted session");
        }
        *self.write_state() = restored;
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_state().as_ref().map(|s| s.access_token.clone())
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.read_state().as_ref().map(|s| s.profile.clone())
    }

    pub fn role_name(&self) -> Option<String> {
        self.read_state().as_ref().map(|s| s.profile.role_name.clone())
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.read_state().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().is_some()
    }

    /// Replace the whole session with a new token and profile.
    pub(crate) async fn establish(&self, access_token: String, profile: UserProfile) -> SessionSnapshot {
        let _guard = self.writer.lock().await;

        let snapshot = SessionSnapshot {
            access_token,
            profile,
            established_at: Utc::now(),
        };
        *self.write_state() = Some(snapshot.clone());
        self.persist(&snapshot).await;
        snapshot
    }

    /// Swap the profile while keeping the current token.
    pub(crate) async fn replace_profile(&self, profile: UserProfile) -> Option<SessionSnapshot> {
        let _guard = self.writer.lock().await;

        let snapshot = {
            let mut state = self.write_state();
            let current = state.as_mut()?;
            current.profile = profile;
            current.clone()
        };
        self.persist(&snapshot).await;
        Some(snapshot)
    }

    pub(crate) async fn clear(&self) {
        let _guard = self.writer.lock().await;
        *self.write_state() = None;
        self.clear_persisted().await;
    }

    async fn persist(&self, snapshot: &SessionSnapshot) {
        let user_info = match snapshot.profile.to_json() {
            Ok(user_info) => user_info,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode profile for persistence");
                return;
            }
        };
        if let Err(e) = self.repo.save(&snapshot.access_token, &user_info).await {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    async fn clear_persisted(&self) {
        if let Err(e) = self.repo.clear().await {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Option<SessionSnapshot>> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Option<SessionSnapshot>> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
