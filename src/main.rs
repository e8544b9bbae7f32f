//! deckhand — declarative job orchestration for multi-service deployments.
//!
//! Loads configuration, bootstraps the hook registry and plugins, then
//! dispatches the requested command.

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use deckhand_core::config::AppConfig;
use deckhand_core::error::AppError;
use deckhand_jobs::Engine;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let engine = match Engine::bootstrap(config) {
        Ok(engine) => engine,
        Err(e) => {
            output::print_error(&format!("Failed to load plugins: {e}"));
            std::process::exit(1);
        }
    };

    let jobs = commands::declared_jobs(&engine);
    let cli = Cli::parse_with_jobs(&jobs);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    if let Err(e) = cli.execute(&engine, &cancel).await {
        tracing::debug!(error = ?e, "Command failed");
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("DECKHAND_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("DECKHAND_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&config_path, &env)
}

/// Initialize tracing/logging. Logs go to stderr so command output stays
/// machine-readable.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Cancels `token` on Ctrl+C or SIGTERM so polling loops stop promptly.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Interrupt received, cancelling");
    token.cancel();
}
