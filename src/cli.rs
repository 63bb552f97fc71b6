//! Command-line interface: argument parsing and the config template.

use clap::{Parser, Subcommand};

use crate::config::Config;

/// Bookstore storefront with built-in request performance metrics
#[derive(Parser, Debug)]
#[command(name = "bookstore-metrics")]
#[command(version)]
#[command(about = "Bookstore storefront with built-in request performance metrics")]
pub struct Cli {
    /// Path to configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the bind address from the config file
    #[arg(long)]
    pub host: Option<String>,

    /// Override the listen port from the config file
    #[arg(short, long)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

/// Template configuration with every option at its default value.
pub fn generate_config_template() -> &'static str {
    r#"# Bookstore metrics configuration
# Every section and key is optional.

[server]
# Address to bind (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"
port = 5000

[metrics]
# Route key for requests that match no registered route. Keeps the
# per-route table bounded no matter what paths clients send.
unmatched_route = "<unmatched>"

# Dashboard auto-refresh in seconds (0 disables)
dashboard_refresh_secs = 5

# Push interval of GET /metrics/stream (100 - 60000)
stream_interval_ms = 1000

[observability]
# trace, debug, info, warn, error (RUST_LOG takes precedence)
log_level = "info"

[simulator]
# Limits for POST /api/simulate/start
max_users = 200
max_duration_secs = 300
"#
}
