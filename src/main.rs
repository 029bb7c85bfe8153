//! ChatHub Server: direct messages and chat rooms over REST and WebSocket.
//!
//! Main entry point that loads configuration, installs logging and hands
//! off to the API crate.

use tracing_subscriber::{EnvFilter, fmt};

use chathub_core::config::{AppConfig, LogFormat};
use chathub_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("CHATHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match load_configuration(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        env = %env,
        version = env!("CARGO_PKG_VERSION"),
        "Configuration loaded"
    );

    if let Err(e) = chathub_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and `CHATHUB_*` variables
fn load_configuration(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Initialize tracing/logging; `RUST_LOG` overrides the configured level
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
