use tracing::Level;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

/// Map a configured level name to a tracing level. Unknown names fall back to INFO.
pub fn parse_level(log_level: &str) -> Level {
    match log_level.to_uppercase().as_str() {
        "TRACE" => Level::TRACE,
        "DEBUG" => Level::DEBUG,
        "INFO" => Level::INFO,
        "WARN" | "WARNING" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO", log_level);
            Level::INFO
        }
    }
}

pub fn parse_format(log_format: &str) -> LogFormat {
    match log_format.to_lowercase().as_str() {
        "json" => LogFormat::Json,
        "plain" | "text" => LogFormat::Plain,
        _ => {
            eprintln!("Invalid log format '{}', defaulting to JSON", log_format);
            LogFormat::Json
        }
    }
}

pub fn filter_directives(level: Level) -> String {
    format!("crm_access={},reqwest=warn,hyper=warn", level)
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(log_level: &str, log_format: &str) -> Result<(), TryInitError> {
    let level = parse_level(log_level);

    // LOG_LEVEL from config wins over RUST_LOG
    let env_filter = tracing_subscriber::EnvFilter::new(filter_directives(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match parse_format(log_format) {
        LogFormat::Json => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true);

            subscriber.with(json_layer).try_init()?;
        }
        LogFormat::Plain => {
            let plain_layer = tracing_subscriber::fmt::layer().with_target(true);

            subscriber.with(plain_layer).try_init()?;
        }
    }

    tracing::info!(
        log_level = %log_level,
        log_format = %log_format,
        "logging initialized"
    );

    Ok(())
}
