use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::StateCache;
use crate::client::DeviceClient;
use crate::config::{Config, DEFAULT_POLL_INTERVAL, clamp_poll_interval};
use crate::logger::MessageLogMode;
use crate::protocol::{
    self, HUMIDITY_PATH, MODEL_PATH, SYS_PATH, TSTAT_PATH, resolve_mode,
};
use crate::types::*;
use crate::Result;

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;

pub const UNKNOWN: &str = "unknown";
pub const FAN_REFRESH_INTERVAL: Duration = Duration::from_secs(15);

pub struct ThermostatBuilder {
    base_url: String,
    name: String,
    min_poll_interval: Duration,
    fan_interface: bool,
    timeout: Option<Duration>,
    event_callbacks: Vec<EventCallback>,
    log: Option<(MessageLogMode, String)>,
}

impl ThermostatBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            name: "Thermostat".to_string(),
            min_poll_interval: DEFAULT_POLL_INTERVAL,
            fan_interface: false,
            timeout: None,
            event_callbacks: Vec::new(),
            log: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Clamped to 3..=15 seconds.
    pub fn min_poll_interval(mut self, interval: Duration) -> Self {
        self.min_poll_interval = clamp_poll_interval(interval);
        self
    }

    pub fn fan_interface(mut self, enabled: bool) -> Self {
        self.fan_interface = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log = Some((mode, path.into()));
        self
    }

    pub fn build(self) -> Result<Thermostat> {
        let client = DeviceClient::with_options(&self.base_url, self.timeout, self.log)?;
        Ok(Thermostat {
            name: self.name,
            client,
            cache: StateCache::new(self.min_poll_interval),
            fan_interface: self.fan_interface,
            event_callbacks: self.event_callbacks,
            model: OnceCell::new(),
            serial: OnceCell::new(),
            firmware: OnceCell::new(),
            humidity_supported: OnceCell::new(),
        })
    }
}

/// Accessor set for one thermostat, as consumed by the host.
///
/// All reads go through [`Thermostat::state`], which rate-limits and
/// de-duplicates `/tstat` polls. Temperatures crossing this API are Celsius.
pub struct Thermostat {
    name: String,
    client: DeviceClient,
    cache: StateCache<TstatState>,
    fan_interface: bool,
    event_callbacks: Vec<EventCallback>,
    model: OnceCell<String>,
    serial: OnceCell<String>,
    firmware: OnceCell<String>,
    humidity_supported: OnceCell<bool>,
}

impl Thermostat {
    pub fn builder(base_url: impl Into<String>) -> ThermostatBuilder {
        ThermostatBuilder::new(base_url)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = ThermostatBuilder::new(&config.base_url)
            .name(&config.name)
            .min_poll_interval(config.min_poll_interval())
            .fan_interface(config.enable_fan_interface);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_poll_interval(&self) -> Duration {
        self.cache.min_interval()
    }

    pub fn fan_interface_enabled(&self) -> bool {
        self.fan_interface
    }

    /// Latest device state, fetched at most once per poll interval.
    pub async fn state(&self) -> Result<Arc<TstatState>> {
        self.cache
            .get_or_refresh(|| self.client.get::<TstatState>(TSTAT_PATH))
            .await
    }

    pub async fn current_heating_cooling_state(&self) -> Result<CurrentState> {
        Ok(self.state().await?.tstate)
    }

    /// Target mode with the device's auto mode folded away. When the device
    /// is in auto, the resolved mode is written back so it stops scheduling
    /// on its own.
    pub async fn target_heating_cooling_state(&self) -> Result<TargetMode> {
        let state = self.state().await?;
        let mode = resolve_mode(state.tmode, state.temp);
        if state.tmode == DeviceMode::Auto {
            debug!(temp_f = state.temp, resolved = ?mode, "overriding device auto mode");
            if let Err(e) = self
                .client
                .post(TSTAT_PATH, &protocol::set_target_mode_body(mode))
                .await
            {
                warn!(error = %e, "auto mode write-back failed");
            }
        }
        Ok(mode)
    }

    /// Changing mode makes the device pick a new setpoint, so the target
    /// temperature is re-read and pushed afterwards.
    pub async fn set_target_heating_cooling_state(&self, mode: TargetMode) -> Result<()> {
        self.client
            .post(TSTAT_PATH, &protocol::set_target_mode_body(mode))
            .await?;

        match self.target_temperature().await {
            Ok(celsius) => self.emit(&Event::TargetTemperature { celsius }),
            Err(e) => warn!(error = %e, "failed to refresh target temperature after mode change"),
        }
        Ok(())
    }

    pub async fn current_temperature(&self) -> Result<f64> {
        Ok(fahrenheit_to_celsius(self.state().await?.temp))
    }

    /// Setpoint for the active mode; the current temperature when there is none.
    pub async fn target_temperature(&self) -> Result<f64> {
        let state = self.state().await?;
        let fahrenheit = match state.tmode {
            DeviceMode::Heat => state.t_heat.unwrap_or(state.temp),
            DeviceMode::Cool => state.t_cool.unwrap_or(state.temp),
            DeviceMode::Off | DeviceMode::Auto => state.temp,
        };
        Ok(fahrenheit_to_celsius(fahrenheit))
    }

    /// Writes the setpoint that belongs to the current mode. Does nothing
    /// when the device is not heating or cooling.
    pub async fn set_target_temperature(&self, celsius: f64) -> Result<()> {
        let state = self.state().await?;
        let fahrenheit = Temperature::from_celsius(celsius).to_device_fahrenheit();
        let body = match state.tmode {
            DeviceMode::Heat => protocol::set_heat_setpoint_body(fahrenheit),
            DeviceMode::Cool => protocol::set_cool_setpoint_body(fahrenheit),
            DeviceMode::Off | DeviceMode::Auto => {
                debug!(mode = ?state.tmode, "no setpoint for current mode, ignoring write");
                return Ok(());
            }
        };
        self.client.post(TSTAT_PATH, &body).await?;
        Ok(())
    }

    pub fn temperature_display_units(&self) -> TemperatureDisplayUnits {
        TemperatureDisplayUnits::Fahrenheit
    }

    pub fn set_temperature_display_units(&self, units: TemperatureDisplayUnits) {
        debug!(?units, "display units are fixed to Fahrenheit, ignoring write");
    }

    pub async fn fan_active(&self) -> Result<bool> {
        Ok(self.state().await?.fan_active())
    }

    pub async fn set_fan_active(&self, active: bool) -> Result<()> {
        let mode = if active { FanMode::On } else { FanMode::Auto };
        self.client
            .post(TSTAT_PATH, &protocol::set_fan_mode_body(mode))
            .await?;
        Ok(())
    }

    pub async fn current_relative_humidity(&self) -> Result<f64> {
        let info: HumidityInfo = self.client.get(HUMIDITY_PATH).await?;
        Ok(info.supported_value().unwrap_or(0.0))
    }

    /// Probed once; a failed or negative probe means no humidity sensor
    /// for the lifetime of this accessor.
    pub async fn humidity_supported(&self) -> bool {
        *self
            .humidity_supported
            .get_or_init(|| async {
                match self.client.get::<HumidityInfo>(HUMIDITY_PATH).await {
                    Ok(info) => info.supported_value().is_some(),
                    Err(e) => {
                        warn!(error = %e, "humidity probe failed, treating as unsupported");
                        false
                    }
                }
            })
            .await
    }

    pub async fn model(&self) -> String {
        self.model
            .get_or_init(|| async {
                match self.client.get::<ModelInfo>(MODEL_PATH).await {
                    Ok(info) => info.model,
                    Err(e) => {
                        warn!(error = %e, "model probe failed");
                        UNKNOWN.to_string()
                    }
                }
            })
            .await
            .clone()
    }

    pub async fn serial_number(&self) -> String {
        self.serial
            .get_or_init(|| async {
                match self.client.get::<SysInfo>(SYS_PATH).await {
                    Ok(info) => info.uuid,
                    Err(e) => {
                        warn!(error = %e, "serial number probe failed");
                        UNKNOWN.to_string()
                    }
                }
            })
            .await
            .clone()
    }

    pub async fn firmware_revision(&self) -> String {
        self.firmware
            .get_or_init(|| async {
                match self.client.get::<SysInfo>(SYS_PATH).await {
                    Ok(info) => info.fw_version,
                    Err(e) => {
                        warn!(error = %e, "firmware probe failed");
                        UNKNOWN.to_string()
                    }
                }
            })
            .await
            .clone()
    }

    /// Services to register with the host.
    pub async fn services(&self) -> Vec<Service> {
        let mut services = vec![Service::AccessoryInformation, Service::Thermostat];
        if self.fan_interface {
            services.push(Service::Fan);
        }
        if self.humidity_supported().await {
            services.push(Service::HumiditySensor);
        }
        services
    }

    /// Start pushing fan state every 15 seconds. `None` unless the fan
    /// interface is enabled.
    pub fn spawn_fan_refresh(self: &Arc<Self>) -> Option<FanRefresh> {
        if !self.fan_interface {
            return None;
        }
        let thermostat = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(FAN_REFRESH_INTERVAL);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match thermostat.fan_active().await {
                    Ok(active) => thermostat.emit(&Event::FanActive { active }),
                    Err(e) => warn!(error = %e, "periodic fan refresh failed"),
                }
            }
        });
        Some(FanRefresh { handle })
    }

    fn emit(&self, event: &Event) {
        for cb in &self.event_callbacks {
            cb(event);
        }
    }
}

/// Handle to the periodic fan push. Dropping it stops the task.
pub struct FanRefresh {
    handle: JoinHandle<()>,
}

impl FanRefresh {
    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for FanRefresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
