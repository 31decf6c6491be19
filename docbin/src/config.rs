//! Server configuration from command-line flags and `DOCBIN_*` environment variables.

use clap::{ArgAction, Parser};

/// Runtime configuration for the `docbin` server.
#[derive(Parser, Debug, Clone)]
#[command(name = "docbin", version, about = "Schema-less JSON document store over HTTP")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "DOCBIN_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Database location, e.g. `sqlite://data.db`.
    #[arg(long, env = "DOCBIN_DATABASE_URL", default_value = "sqlite://data.db")]
    pub database_url: String,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "DOCBIN_MAX_CONNECTIONS", default_value_t = 8)]
    pub max_connections: u32,

    /// Milliseconds a statement waits on a locked database before failing.
    #[arg(long, env = "DOCBIN_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    pub busy_timeout_ms: u64,

    /// Emit logs as JSON.
    #[arg(long, env = "DOCBIN_LOG_JSON")]
    pub log_json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
