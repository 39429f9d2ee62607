use anyhow::Context;
use crm_access::{config, middleware, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first
    let config = config::Settings::new().context("failed to load settings")?;

    middleware::init_logging(&config.log_level, &config.log_format)
        .context("failed to initialize logging")?;

    tracing::info!("Starting CRM access client v{}", env!("CARGO_PKG_VERSION"));

    let app_state = AppState::new(config)
        .await
        .context("failed to build client state")?;

    if let (Ok(login), Ok(password)) = (std::env::var("CRM_LOGIN"), std::env::var("CRM_PASSWORD")) {
        let outcome = app_state.auth_service.login(&login, &password).await;
        if !outcome.is_success() {
            tracing::error!(message = outcome.message(), "login failed");
            anyhow::bail!("login failed: {}", outcome.message());
        }
        tracing::info!(message = outcome.message(), "login succeeded");
    }

    match app_state.session.snapshot() {
        Some(snapshot) => {
            let role = app_state
                .permissions
                .role_info(Some(snapshot.profile.role_name.as_str()));
            let menu: Vec<&str> = app_state.menu().iter().map(|entry| entry.path).collect();
            tracing::info!(
                role = role.label,
                description = %role.description,
                since = %snapshot.established_at,
                menu = ?menu,
                "signed in"
            );
        }
        None => tracing::info!("no active session"),
    }

    let logout = std::env::var("CRM_LOGOUT")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
        .unwrap_or(false);
    if logout {
        app_state.auth_service.logout_user().await;
    }

    Ok(())
}
