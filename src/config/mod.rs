use std::time::Duration;

use anyhow::Context;

/// Address of the external price API.
pub const DEFAULT_API_BASE: &str = "https://apimarket-mskm.onrender.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    /// How often the refresher ticks. 5s unless overridden.
    pub refresh_interval: Duration,
    /// Per-request timeout; kept below the refresh interval.
    pub http_timeout: Duration,
    pub metrics_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // dotenvy loads .env, but doesn't override already-set env vars
        dotenvy::dotenv().ok();

        let api_base =
            std::env::var("MARKET_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let refresh_interval = env_secs("REFRESH_INTERVAL_SECS", 5)?;
        let http_timeout = env_secs("HTTP_TIMEOUT_SECS", 4)?;
        let metrics_port = match std::env::var("METRICS_PORT") {
            Ok(raw) => raw.parse().context("METRICS_PORT must be a port number")?,
            Err(_) => 9000,
        };

        Ok(Self {
            api_base,
            refresh_interval,
            http_timeout,
            metrics_port,
        })
    }
}

fn env_secs(name: &str, default: u64) -> anyhow::Result<Duration> {
    let secs = match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be a number of seconds"))?,
        Err(_) => default,
    };
    Ok(Duration::from_secs(secs))
}
