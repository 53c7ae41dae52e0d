//! Configuration for Dragonhold
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

/// Dragonhold - Data Dragon mirror and REST gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "dragonhold")]
#[command(about = "Mirrors League static game data from Data Dragon and serves it over REST")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Base URL of the Data Dragon service (version list under /api, data under /cdn)
    #[arg(long, env = "DDRAGON_URL", default_value = "https://ddragon.leagueoflegends.com")]
    pub ddragon_url: String,

    /// Language code for localized game data
    #[arg(long, env = "DDRAGON_LANGUAGE", default_value = "en_US")]
    pub language: String,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "dragonhold")]
    pub mongodb_db: String,

    /// Enable development mode (falls back to the in-memory store when
    /// MongoDB is unreachable instead of exiting)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Per-request timeout for upstream CDN calls, in milliseconds
    #[arg(long, env = "FETCH_TIMEOUT_MS", default_value = "30000")]
    pub fetch_timeout_ms: u64,

    /// Attempts per upstream fetch before giving up (transient failures only)
    #[arg(long, env = "FETCH_ATTEMPTS", default_value = "3")]
    pub fetch_attempts: u32,

    /// Enable the periodic background sync loop
    #[arg(long, env = "SCHEDULER_ENABLED", default_value = "true")]
    pub scheduler_enabled: bool,

    /// Interval between scheduled sync passes, in seconds
    #[arg(long, env = "SYNC_INTERVAL_SECS", default_value = "21600")]
    pub sync_interval_secs: u64,

    /// Run a full sync pass at startup before the first scheduled interval
    #[arg(long, env = "SYNC_ON_START", default_value = "false")]
    pub sync_on_start: bool,
}

impl Args {
    /// Version-list endpoint root, e.g. "https://ddragon.leagueoflegends.com/api"
    pub fn api_url(&self) -> String {
        format!("{}/api", self.ddragon_url.trim_end_matches('/'))
    }

    /// Versioned-data endpoint root, e.g. "https://ddragon.leagueoflegends.com/cdn"
    pub fn cdn_url(&self) -> String {
        format!("{}/cdn", self.ddragon_url.trim_end_matches('/'))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.ddragon_url.starts_with("http://") && !self.ddragon_url.starts_with("https://") {
            return Err("DDRAGON_URL must be an http(s) URL".to_string());
        }

        if self.fetch_attempts == 0 {
            return Err("FETCH_ATTEMPTS must be at least 1".to_string());
        }

        if self.scheduler_enabled && self.sync_interval_secs < 60 {
            return Err(
                "SYNC_INTERVAL_SECS must be at least 60 when the scheduler is enabled".to_string()
            );
        }

        Ok(())
    }
}
