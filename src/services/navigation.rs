use crate::auth::routes::Route;
use serde::Serialize;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    Unauthenticated,
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum NavigationTarget {
    Login {
        /// Where to send the user once they have signed in again.
        return_to: Option<String>,
        reason: RedirectReason,
    },
    Dashboard,
}

impl NavigationTarget {
    pub fn route(&self) -> Route {
        match self {
            NavigationTarget::Login { .. } => Route::Login,
            NavigationTarget::Dashboard => Route::Dashboard,
        }
    }

    pub fn sign_in() -> Self {
        NavigationTarget::Login {
            return_to: None,
            reason: RedirectReason::Unauthenticated,
        }
    }

    pub fn session_expired() -> Self {
        NavigationTarget::Login {
            return_to: None,
            reason: RedirectReason::SessionExpired,
        }
    }
}

/// Performs redirects on behalf of the guard, auth service and interceptor.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavigationTarget);
}

/// Emits redirects as log events; used by the binary.
#[derive(Debug, Default)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, target: NavigationTarget) {
        match &target {
            NavigationTarget::Login { return_to, reason } => {
                tracing::info!(
                    path = target.route().path(),
                    return_to = return_to.as_deref().unwrap_or(""),
                    reason = ?reason,
                    "redirecting to login"
                );
            }
            NavigationTarget::Dashboard => {
                tracing::info!(path = target.route().path(), "redirecting to dashboard");
            }
        }
    }
}

/// Keeps every redirect so an embedding UI can replay it.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<NavigationTarget> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<NavigationTarget> {
        self.history().pop()
    }

    pub fn take(&self) -> Vec<NavigationTarget> {
        std::mem::take(
            &mut *self
                .history
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: NavigationTarget) {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator_keeps_order() {
        let navigator = RecordingNavigator::new();
        navigator.navigate(NavigationTarget::Dashboard);
        navigator.navigate(NavigationTarget::session_expired());

        assert_eq!(navigator.history().len(), 2);
        assert_eq!(navigator.last().map(|t| t.route()), Some(Route::Login));

        let taken = navigator.take();
        assert_eq!(taken[0], NavigationTarget::Dashboard);
        assert!(navigator.history().is_empty());
    }
}
