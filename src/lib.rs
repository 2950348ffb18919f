mod cache;
mod client;
mod config;
mod diff;
mod error;
mod logger;
mod protocol;
mod thermostat;
mod types;

pub use cache::StateCache;
pub use client::DeviceClient;
pub use config::{Config, DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL};
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use protocol::resolve_mode;
pub use thermostat::{FanRefresh, Thermostat, ThermostatBuilder, FAN_REFRESH_INTERVAL, UNKNOWN};
pub use types::*;
