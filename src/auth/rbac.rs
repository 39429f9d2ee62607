use crate::auth::routes::Route;
use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Sales Manager")]
    SalesManager,
    #[serde(rename = "Agent")]
    Agent,
    #[serde(rename = "Kiosk Agent")]
    KioskAgent,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::SalesManager, Role::Agent, Role::KioskAgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::SalesManager => "Sales Manager",
            Role::Agent => "Agent",
            Role::KioskAgent => "Kiosk Agent",
        }
    }

    /// Role names coming from the backend must match exactly, including case.
    pub fn from_name(name: &str) -> Option<Self> {
        Role::ALL.iter().copied().find(|role| role.as_str() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub label: &'static str,
    pub description: &'static str,
    pub allowed_routes: BTreeSet<Route>,
}

impl RoleDefinition {
    pub fn allows(&self, route: Route) -> bool {
        self.allowed_routes.contains(&route)
    }
}

/// What happens when a profile carries a role name that is not in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownRolePolicy {
    /// Grant the default role's routes.
    #[default]
    FallbackToDefault,
    /// Grant nothing.
    Deny,
}

impl UnknownRolePolicy {
    pub fn from_setting(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "fallback" => Some(UnknownRolePolicy::FallbackToDefault),
            "deny" => Some(UnknownRolePolicy::Deny),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub route: Route,
    pub path: &'static str,
    pub label: &'static str,
}

pub const DEFAULT_ROLE: Role = Role::Agent;

/// Single source of truth for which role may open which route.
#[derive(Debug, Clone)]
pub struct RolePermissionTable {
    definitions: HashMap<Role, RoleDefinition>,
    default_role: Role,
    policy: UnknownRolePolicy,
}

impl RolePermissionTable {
    pub fn new(
        definitions: Vec<RoleDefinition>,
        default_role: Role,
        policy: UnknownRolePolicy,
    ) -> AuthResult<Self> {
        let definitions: HashMap<Role, RoleDefinition> = definitions
            .into_iter()
            .map(|definition| (definition.role, definition))
            .collect();

        if !definitions.contains_key(&default_role) {
            return Err(AuthError::Configuration(format!(
                "default role {} has no definition",
                default_role
            )));
        }

        Ok(Self {
            definitions,
            default_role,
            policy,
        })
    }

    /// The deployed permission table.
    pub fn standard(policy: UnknownRolePolicy) -> Self {
        let definitions = standard_definitions()
            .into_iter()
            .map(|definition| (definition.role, definition))
            .collect();

        Self {
            definitions,
            default_role: DEFAULT_ROLE,
            policy,
        }
    }

    pub fn default_role(&self) -> Role {
        self.default_role
    }

    pub fn policy(&self) -> UnknownRolePolicy {
        self.policy
    }

    fn default_definition(&self) -> &RoleDefinition {
        // `new` and `standard` both guarantee the default role is present
        &self.definitions[&self.default_role]
    }

    /// Resolve a raw role name to the definition used for access decisions.
    fn resolve(&self, role: Option<&str>) -> Option<&RoleDefinition> {
        let name = role.filter(|name| !name.is_empty())?;

        if let Some(definition) = Role::from_name(name).and_then(|r| self.definitions.get(&r)) {
            return Some(definition);
        }

        match self.policy {
            UnknownRolePolicy::FallbackToDefault => {
                tracing::warn!(
                    role = %name,
                    fallback = %self.default_role,
                    "unrecognized role, applying default role permissions"
                );
                Some(self.default_definition())
            }
            UnknownRolePolicy::Deny => {
                tracing::warn!(role = %name, "unrecognized role, denying access");
                None
            }
        }
    }

    /// Whether `role` may open the route identified by `route_path`.
    ///
    /// Missing or empty roles and unknown paths are always denied.
    pub fn has_route_access(&self, role: Option<&str>, route_path: &str) -> bool {
        match Route::from_path(route_path) {
            Some(route) => self.can_access(role, route),
            None => false,
        }
    }

    pub fn can_access(&self, role: Option<&str>, route: Route) -> bool {
        self.resolve(role)
            .map(|definition| definition.allows(route))
            .unwrap_or(false)
    }

    pub fn allowed_routes(&self, role: Option<&str>) -> BTreeSet<Route> {
        self.resolve(role)
            .map(|definition| definition.allowed_routes.clone())
            .unwrap_or_default()
    }

    /// Display metadata for a role. Never use this for access decisions.
    pub fn role_info(&self, role: Option<&str>) -> &RoleDefinition {
        role.and_then(Role::from_name)
            .and_then(|r| self.definitions.get(&r))
            .unwrap_or_else(|| self.default_definition())
    }

    /// Sidebar entries for a role, in canonical route order.
    pub fn menu(&self, role: Option<&str>) -> Vec<MenuEntry> {
        self.allowed_routes(role)
            .into_iter()
            .filter(|route| *route != Route::Login && !route.is_add_screen())
            .map(|route| MenuEntry {
                route,
                path: route.path(),
                label: route.label(),
            })
            .collect()
    }
}

impl Default for RolePermissionTable {
    fn default() -> Self {
        Self::standard(UnknownRolePolicy::default())
    }
}

fn standard_definitions() -> Vec<RoleDefinition> {
    vec![
        RoleDefinition {
            role: Role::Admin,
            label: "Administrator",
            description: "Full access to every screen, including role management",
            allowed_routes: Route::ALL
                .iter()
                .copied()
                .filter(|route| *route != Route::Login)
                .collect(),
        },
        RoleDefinition {
            role: Role::SalesManager,
            label: "Sales Manager",
            description: "Manages agents and leads, views branches",
            allowed_routes: BTreeSet::from([
                Route::Dashboard,
                Route::Agents,
                Route::AgentAdd,
                Route::Leads,
                Route::LeadAdd,
                Route::Branches,
                Route::Settings,
            ]),
        },
        RoleDefinition {
            role: Role::Agent,
            label: "Agent",
            description: "Works assigned leads",
            allowed_routes: BTreeSet::from([Route::Dashboard, Route::Leads, Route::LeadAdd]),
        },
        RoleDefinition {
            role: Role::KioskAgent,
            label: "Kiosk Agent",
            description: "Captures walk-in leads at a kiosk",
            allowed_routes: BTreeSet::from([Route::Dashboard, Route::LeadAdd]),
        },
    ]
}
