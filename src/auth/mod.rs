pub mod guard;
pub mod profile;
pub mod rbac;
pub mod routes;
pub mod session;

pub use guard::{GuardDecision, RouteGuard};
pub use profile::UserProfile;
pub use rbac::{MenuEntry, Role, RoleDefinition, RolePermissionTable, UnknownRolePolicy, DEFAULT_ROLE};
pub use routes::Route;
pub use session::{Session, SessionSnapshot};
