use crate::{
    auth::{MenuEntry, RolePermissionTable, RouteGuard, Session},
    config::{SessionStoreKind, Settings},
    error::AuthResult,
    middleware::AuthInterceptor,
    repositories::{FileSessionRepository, InMemorySessionRepository, SessionRepository},
    services::{ApiTransport, AuthService, LoggingNavigator, Navigator},
};
use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

/// Shared client state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub session: Arc<Session>,
    pub permissions: Arc<RolePermissionTable>,
    pub navigator: Arc<dyn Navigator>,
    pub transport: Arc<ApiTransport>,
    pub auth_service: Arc<AuthService>,
    pub interceptor: Arc<AuthInterceptor>,
    pub guard: Arc<RouteGuard>,
}

impl AppState {
    /// Create client state with the configured session store and a logging navigator
    pub async fn new(config: Settings) -> AuthResult<Self> {
        Self::new_with_navigator(config, Arc::new(LoggingNavigator)).await
    }

    /// Create client state whose redirects go to `navigator`
    pub async fn new_with_navigator(
        config: Settings,
        navigator: Arc<dyn Navigator>,
    ) -> AuthResult<Self> {
        let repository: Arc<dyn SessionRepository> = match config.session_store_kind() {
            SessionStoreKind::File => Arc::new(FileSessionRepository::new(config.session_file())),
            SessionStoreKind::Memory => Arc::new(InMemorySessionRepository::new()),
        };
        Self::new_with_repository(config, repository, navigator).await
    }

    /// Create client state over an existing session repository.
    /// Any persisted session is restored before this returns.
    pub async fn new_with_repository(
        config: Settings,
        repository: Arc<dyn SessionRepository>,
        navigator: Arc<dyn Navigator>,
    ) -> AuthResult<Self> {
        let config = Arc::new(config);

        let session = Arc::new(Session::new(repository));
        session.init().await;

        let permissions = Arc::new(RolePermissionTable::standard(config.role_policy()));
        let transport = Arc::new(ApiTransport::with_config(config.http_config())?);

        let auth_service = Arc::new(AuthService::new(
            transport.clone(),
            session.clone(),
            navigator.clone(),
            config.api_language.clone(),
        ));
        let interceptor = Arc::new(AuthInterceptor::new(
            transport.clone(),
            auth_service.clone(),
            navigator.clone(),
        ));
        let guard = Arc::new(RouteGuard::new(session.clone(), permissions.clone()));

        tracing::debug!(
            authenticated = session.is_authenticated(),
            policy = ?permissions.policy(),
            "client state initialized"
        );

        Ok(Self {
            config,
            session,
            permissions,
            navigator,
            transport,
            auth_service,
            interceptor,
            guard,
        })
    }

    /// Sidebar entries for whoever is signed in.
    pub fn menu(&self) -> Vec<MenuEntry> {
        self.permissions.menu(self.session.role_name().as_deref())
    }
}
