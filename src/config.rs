use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/analyze";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub timeout: Option<Duration>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Reads `RADAR_*` variables, loading a `.env` file first if there is one.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("RADAR_ENDPOINT").filter(|v| !v.is_empty()) {
            config.endpoint = endpoint;
        }

        if let Some(raw) = lookup("RADAR_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("RADAR_TIMEOUT_SECS is not a number: {}", raw))?;
            anyhow::ensure!(secs > 0, "RADAR_TIMEOUT_SECS must be positive");
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(raw) = lookup("RADAR_PORT") {
            config.port = raw
                .parse()
                .with_context(|| format!("RADAR_PORT is not a valid port: {}", raw))?;
        }

        Ok(config)
    }
}
