use crate::auth::rbac::RolePermissionTable;
use crate::auth::session::Session;
use crate::services::navigation::{NavigationTarget, Navigator, RedirectReason};
use std::sync::Arc;

/// Outcome of a single navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// Not signed in. `from` is the location the user asked for.
    RedirectLogin { from: String },
    /// Signed in but the role may not open the route.
    RedirectDashboard,
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render)
    }
}

/// Gate in front of every protected view. Reads the session, never writes it.
#[derive(Clone)]
pub struct RouteGuard {
    session: Arc<Session>,
    permissions: Arc<RolePermissionTable>,
}

impl RouteGuard {
    pub fn new(session: Arc<Session>, permissions: Arc<RolePermissionTable>) -> Self {
        Self {
            session,
            permissions,
        }
    }

    /// Decide what to do with a navigation to `location`.
    ///
    /// `required_route` is the permission key of the view; `None` means any
    /// signed-in user may see it.
    pub fn check(&self, location: &str, required_route: Option<&str>) -> GuardDecision {
        let snapshot = match self.session.snapshot() {
            Some(snapshot) => snapshot,
            None => {
                tracing::debug!(location = %location, "no session, redirecting to login");
                return GuardDecision::RedirectLogin {
                    from: location.to_string(),
                };
            }
        };

        let Some(required_route) = required_route else {
            return GuardDecision::Render;
        };

        let role = snapshot.profile.role_name.as_str();
        if self.permissions.has_route_access(Some(role), required_route) {
            GuardDecision::Render
        } else {
            tracing::debug!(
                role = %role,
                route = %required_route,
                "route not permitted for role, redirecting to dashboard"
            );
            GuardDecision::RedirectDashboard
        }
    }

    /// Apply `check` through a navigator. Returns whether the view may render.
    pub fn enforce(
        &self,
        navigator: &dyn Navigator,
        location: &str,
        required_route: Option<&str>,
    ) -> bool {
        match self.check(location, required_route) {
            GuardDecision::Render => true,
            GuardDecision::RedirectLogin { from } => {
                navigator.navigate(NavigationTarget::Login {
                    return_to: Some(from),
                    reason: RedirectReason::Unauthenticated,
                });
                false
            }
            GuardDecision::RedirectDashboard => {
                navigator.navigate(NavigationTarget::Dashboard);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::profile::UserProfile;
    use crate::auth::routes::Route;
    use crate::repositories::InMemorySessionRepository;
    use crate::services::navigation::RecordingNavigator;
    use serde_json::json;

    async fn guard_for(role: Option<&str>) -> RouteGuard {
        let session = Arc::new(Session::new(Arc::new(InMemorySessionRepository::new())));
        if let Some(role) = role {
            let (token, profile) =
                UserProfile::from_user_info(&json!({"accessToken": "tok", "roleName": role}))
                    .unwrap();
            session.establish(token, profile).await;
        }
        RouteGuard::new(session, Arc::new(RolePermissionTable::default()))
    }

    #[tokio::test]
    async fn test_unauthenticated_always_redirects_to_login() {
        let guard = guard_for(None).await;
        for route in Route::ALL {
            assert_eq!(
                guard.check(route.path(), Some(route.path())),
                GuardDecision::RedirectLogin {
                    from: route.path().to_string()
                }
            );
        }
        assert_eq!(
            guard.check("/dashboard?tab=today", None),
            GuardDecision::RedirectLogin {
                from: "/dashboard?tab=today".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unguarded_route_renders_for_any_role() {
        for role in ["Admin", "Agent", "Kiosk Agent", "Somebody Else"] {
            let guard = guard_for(Some(role)).await;
            assert!(guard.check("/dashboard", None).is_render());
        }
    }

    #[tokio::test]
    async fn test_forbidden_route_redirects_to_dashboard() {
        let guard = guard_for(Some("Agent")).await;
        assert_eq!(
            guard.check("/role-management", Some("/role-management")),
            GuardDecision::RedirectDashboard
        );
        assert!(guard.check("/leads", Some("/leads")).is_render());
    }

    #[tokio::test]
    async fn test_enforce_navigates_with_return_location() {
        let navigator = RecordingNavigator::new();

        let guard = guard_for(None).await;
        assert!(!guard.enforce(&navigator, "/leads/add", Some("/leads/add")));
        assert_eq!(
            navigator.last(),
            Some(NavigationTarget::Login {
                return_to: Some("/leads/add".to_string()),
                reason: RedirectReason::Unauthenticated,
            })
        );

        let guard = guard_for(Some("Kiosk Agent")).await;
        assert!(!guard.enforce(&navigator, "/leads", Some("/leads")));
        assert_eq!(navigator.last(), Some(NavigationTarget::Dashboard));
        assert!(guard.enforce(&navigator, "/leads/add", Some("/leads/add")));
    }
}
