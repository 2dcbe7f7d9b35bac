//! Server binary for the juggler simulation.
//!
//! Loads configuration, initializes structured logging, creates the shared
//! juggler, and serves the HTTP control surface until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line (`juggler [PORT] [--config PATH]`)
//! 2. Load configuration from `juggler-config.yaml` (defaults if absent)
//! 3. Apply the `JUGGLER_PORT` environment override, then the CLI port
//! 4. Initialize structured logging (tracing)
//! 5. Create the juggler and application state
//! 6. Serve HTTP until shutdown

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use juggler_core::Juggler;
use juggler_core::config::{self, JugglerConfig};
use juggler_observer::{AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "juggler-config.yaml";

/// Command line for the juggler server.
#[derive(Debug, Parser)]
#[command(name = "juggler")]
#[command(version)]
#[command(about = "Juggling simulation with an HTTP control surface")]
struct Cli {
    /// Port to listen on. Overrides the config file and `JUGGLER_PORT`.
    port: Option<String>,

    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

/// Application entry point for the juggler server.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server cannot
/// bind its port.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let cli = Cli::parse();

    // 1. Configuration: file, then environment, then command line.
    let mut config = load_config(&cli.config)?;
    apply_cli(&mut config, &cli)?;
    config.validate()?;

    // 2. Logging. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(%config, "Configuration loaded");

    // 3. Shared juggler and HTTP state.
    let juggler = Arc::new(Juggler::new(config.timing));
    let app_state = Arc::new(AppState::new(juggler));

    // 4. Serve until Ctrl-C.
    let server_config = ServerConfig::from(&config.server);
    info!(port = server_config.port, "Starting juggler server");
    juggler_observer::start_server(&server_config, app_state, juggler_observer::shutdown_signal())
        .await?;

    info!("juggler exiting");
    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. Environment overrides apply in both cases.
fn load_config(path: &Path) -> Result<JugglerConfig, EngineError> {
    if path.exists() {
        Ok(JugglerConfig::from_file(path)?)
    } else {
        let mut config = JugglerConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }
}

/// Apply the positional port argument, if any.
fn apply_cli(config: &mut JugglerConfig, cli: &Cli) -> Result<(), EngineError> {
    if let Some(raw) = &cli.port {
        config.server.port = config::parse_port(raw)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["juggler"]).unwrap();
        assert!(cli.port.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn cli_accepts_port_and_config() {
        let cli = Cli::try_parse_from(["juggler", "9090", "--config", "custom.yaml"]).unwrap();
        assert_eq!(cli.port.as_deref(), Some("9090"));
        assert_eq!(cli.config, PathBuf::from("custom.yaml"));
    }

    #[test]
    fn cli_port_overrides_config() {
        let cli = Cli::try_parse_from(["juggler", "3000"]).unwrap();
        let mut config = JugglerConfig::default();
        apply_cli(&mut config, &cli).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn missing_port_keeps_config() {
        let cli = Cli::try_parse_from(["juggler"]).unwrap();
        let mut config = JugglerConfig::default();
        apply_cli(&mut config, &cli).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn bad_cli_port_is_config_error() {
        for raw in ["abc", "0", "70000"] {
            let cli = Cli::try_parse_from(["juggler", raw]).unwrap();
            let mut config = JugglerConfig::default();
            let err = apply_cli(&mut config, &cli).unwrap_err();
            assert!(matches!(err, EngineError::Config { .. }), "port {raw}");
        }
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let config = load_config(Path::new("does-not-exist/juggler-config.yaml")).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.timing, JugglerConfig::default().timing);
    }
}
