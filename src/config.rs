use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(3000);
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(15000);

pub fn clamp_poll_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
}

/// Accessory options as handed over by the host, intervals in milliseconds.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_name")]
    pub name: String,
    pub base_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub min_poll_interval: u64,
    #[serde(default)]
    pub enable_fan_interface: bool,
    #[serde(default)]
    pub timeout: Option<u64>,
}

fn default_name() -> String {
    "Thermostat".to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            name: default_name(),
            base_url: base_url.into(),
            min_poll_interval: default_poll_interval_ms(),
            enable_fan_interface: false,
            timeout: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        if config.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".to_string()));
        }
        Ok(config)
    }

    pub fn min_poll_interval(&self) -> Duration {
        clamp_poll_interval(Duration::from_millis(self.min_poll_interval))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_millis)
    }
}
