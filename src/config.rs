//! Configuration management
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section is optional; omitted values fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::metrics::DEFAULT_UNMATCHED_ROUTE;

/// Path tried when no `--config` flag is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Metrics engine and reporting settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Route key used for requests that match no registered route
    #[serde(default = "default_unmatched_route")]
    pub unmatched_route: String,
    /// Dashboard auto-refresh period; 0 disables refreshing
    #[serde(default = "default_dashboard_refresh")]
    pub dashboard_refresh_secs: u64,
    /// Push period of the `/metrics/stream` event source
    #[serde(default = "default_stream_interval")]
    pub stream_interval_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            unmatched_route: default_unmatched_route(),
            dashboard_refresh_secs: default_dashboard_refresh(),
            stream_interval_ms: default_stream_interval(),
        }
    }
}

fn default_unmatched_route() -> String {
    DEFAULT_UNMATCHED_ROUTE.to_string()
}

fn default_dashboard_refresh() -> u64 {
    5
}

fn default_stream_interval() -> u64 {
    1000
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Upper bounds accepted by the traffic simulator control API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_max_users")]
    pub max_users: u32,
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_users: default_max_users(),
            max_duration_secs: default_max_duration(),
        }
    }
}

fn default_max_users() -> u32 {
    200
}

fn default_max_duration() -> u64 {
    300
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = contents.parse()?;
        Ok(config)
    }

    /// Resolve the configuration for startup.
    ///
    /// An explicitly requested file must exist. Without one, `config.toml`
    /// is used when present and defaults otherwise.
    pub fn load(explicit: Option<&str>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)
            }
            None => Ok(Self::default()),
        }
    }

    /// Reject values that would make the service misbehave at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.metrics.unmatched_route.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "metrics.unmatched_route must not be empty".into(),
            ));
        }
        if !(100..=60_000).contains(&self.metrics.stream_interval_ms) {
            return Err(ConfigError::Invalid(format!(
                "metrics.stream_interval_ms must be between 100 and 60000, got {}",
                self.metrics.stream_interval_ms
            )));
        }
        if self.simulator.max_users == 0 || self.simulator.max_duration_secs == 0 {
            return Err(ConfigError::Invalid(
                "simulator limits must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = "".parse().expect("empty config is valid");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.metrics.unmatched_route, DEFAULT_UNMATCHED_ROUTE);
        assert_eq!(config.metrics.dashboard_refresh_secs, 5);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.simulator.max_users, 200);
    }

    #[test]
    fn parses_every_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[metrics]
unmatched_route = "not_found"
dashboard_refresh_secs = 0
stream_interval_ms = 250

[observability]
log_level = "debug"

[simulator]
max_users = 5
max_duration_secs = 10
"#;
        let config: Config = toml.parse().expect("should parse");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.metrics.unmatched_route, "not_found");
        assert_eq!(config.metrics.dashboard_refresh_secs, 0);
        assert_eq!(config.metrics.stream_interval_ms, 250);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.simulator.max_duration_secs, 10);
    }

    #[test]
    fn rejects_empty_unmatched_bucket() {
        let err = "[metrics]\nunmatched_route = \"  \"\n"
            .parse::<Config>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("unmatched_route"));
    }

    #[test]
    fn rejects_out_of_range_stream_interval() {
        let err = "[metrics]\nstream_interval_ms = 5\n"
            .parse::<Config>()
            .unwrap_err();
        assert!(err.to_string().contains("stream_interval_ms"));
    }

    #[test]
    fn rejects_zero_port_and_limits() {
        assert!("[server]\nport = 0\n".parse::<Config>().is_err());
        assert!("[simulator]\nmax_users = 0\n".parse::<Config>().is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = "[server\nport = 1".parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_file_reads_toml_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[server]\nport = 9090").expect("write");
        let config = Config::from_file(file.path()).expect("loads");
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn explicit_missing_file_is_an_io_error() {
        let err = Config::load(Some("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
