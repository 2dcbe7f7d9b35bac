//! Configuration loading and typed config structures for the juggler server.
//!
//! The optional configuration file is `juggler-config.yaml` in the working
//! directory. Every field has a default, so an empty or missing file
//! yields a working server on port 8080 with the standard timing
//! (throws every 500ms, flights ticking once per second, 5-10 second
//! flights).

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Name of the environment variable that overrides [`HttpConfig::port`].
pub const PORT_ENV_VAR: &str = "JUGGLER_PORT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds values the server cannot use.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `juggler-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JugglerConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: HttpConfig,

    /// Scheduler and flight timing.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl JugglerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `JUGGLER_PORT` environment variable overrides `server.port`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if an override is not a valid port.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `JUGGLER_PORT` is set but is
    /// not a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the port override does not
    /// parse as a `u16`.
    pub fn apply_overrides_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(PORT_ENV_VAR) {
            self.server.port = parse_port(&val)?;
        }
        Ok(())
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid(String::from(
                "port must be between 1 and 65535",
            )));
        }
        self.timing.validate()
    }
}

impl fmt::Display for JugglerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "host: {}, port: {}, throw interval: {}ms, flight tick: {}ms, flights: {}-{}s",
            self.server.host,
            self.server.port,
            self.timing.throw_interval_ms,
            self.timing.flight_tick_ms,
            self.timing.min_flight_secs,
            self.timing.max_flight_secs,
        )
    }
}

/// Parse a port number from user input (CLI argument or environment).
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the value is not an integer in
/// `1..=65535`.
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    let port: u16 = raw
        .trim()
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("wrong port format {raw:?}: {e}")))?;
    if port == 0 {
        return Err(ConfigError::Invalid(String::from(
            "port must be between 1 and 65535",
        )));
    }
    Ok(port)
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Timing of the throw scheduler and the flight timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Period of the throw scheduler in milliseconds.
    #[serde(default = "default_throw_interval_ms")]
    pub throw_interval_ms: u64,

    /// Length of one flight "second" in milliseconds.
    #[serde(default = "default_flight_tick_ms")]
    pub flight_tick_ms: u64,

    /// Shortest flight, in flight ticks.
    #[serde(default = "default_min_flight_secs")]
    pub min_flight_secs: u32,

    /// Longest flight, in flight ticks.
    #[serde(default = "default_max_flight_secs")]
    pub max_flight_secs: u32,
}

impl TimingConfig {
    /// Period of the throw scheduler.
    pub const fn throw_interval(&self) -> Duration {
        Duration::from_millis(self.throw_interval_ms)
    }

    /// Period of a flight timer.
    pub const fn flight_tick(&self) -> Duration {
        Duration::from_millis(self.flight_tick_ms)
    }

    /// Check intervals are non-zero and the flight range is not inverted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.throw_interval_ms == 0 || self.flight_tick_ms == 0 {
            return Err(ConfigError::Invalid(String::from(
                "timer intervals must be greater than zero",
            )));
        }
        if self.min_flight_secs == 0 || self.min_flight_secs > self.max_flight_secs {
            return Err(ConfigError::Invalid(format!(
                "flight range {}..={} is empty or starts at zero",
                self.min_flight_secs, self.max_flight_secs
            )));
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            throw_interval_ms: default_throw_interval_ms(),
            flight_tick_ms: default_flight_tick_ms(),
            min_flight_secs: default_min_flight_secs(),
            max_flight_secs: default_max_flight_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

const fn default_throw_interval_ms() -> u64 {
    500
}

const fn default_flight_tick_ms() -> u64 {
    1000
}

const fn default_min_flight_secs() -> u32 {
    5
}

const fn default_max_flight_secs() -> u32 {
    10
}

fn default_log_level() -> String {
    String::from("info")
}
