use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical dashboard locations. The path doubles as the permission key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Route {
    Login,
    Dashboard,
    Agents,
    AgentAdd,
    Leads,
    LeadAdd,
    Branches,
    BranchAdd,
    RoleManagement,
    RoleManagementAdd,
    Settings,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Login,
        Route::Dashboard,
        Route::Agents,
        Route::AgentAdd,
        Route::Leads,
        Route::LeadAdd,
        Route::Branches,
        Route::BranchAdd,
        Route::RoleManagement,
        Route::RoleManagementAdd,
        Route::Settings,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Dashboard => "/dashboard",
            Route::Agents => "/agents",
            Route::AgentAdd => "/agents/add",
            Route::Leads => "/leads",
            Route::LeadAdd => "/leads/add",
            Route::Branches => "/branches",
            Route::BranchAdd => "/branches/add",
            Route::RoleManagement => "/role-management",
            Route::RoleManagementAdd => "/role-management/add",
            Route::Settings => "/settings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::Agents => "Agents",
            Route::AgentAdd => "Add Agent",
            Route::Leads => "Leads",
            Route::LeadAdd => "Add Lead",
            Route::Branches => "Branches",
            Route::BranchAdd => "Add Branch",
            Route::RoleManagement => "Role Management",
            Route::RoleManagementAdd => "Add Role",
            Route::Settings => "Settings",
        }
    }

    /// Exact match against the canonical path; no normalization is applied.
    pub fn from_path(path: &str) -> Option<Self> {
        Route::ALL.iter().copied().find(|route| route.path() == path)
    }

    /// Creation screens are reachable from their list screen, not from the menu.
    pub fn is_add_screen(&self) -> bool {
        matches!(
            self,
            Route::AgentAdd | Route::LeadAdd | Route::BranchAdd | Route::RoleManagementAdd
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
