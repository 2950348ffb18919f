use std::fmt;

use serde::{Deserialize, Serialize};

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * (5.0 / 9.0)
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * (9.0 / 5.0) + 32.0
}

/// Temperature stored as Celsius internally.
/// The device speaks whole-degree Fahrenheit on writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature(f64);

impl Temperature {
    pub fn from_celsius(c: f64) -> Self {
        Self(c)
    }

    pub fn from_fahrenheit(f: f64) -> Self {
        Self(fahrenheit_to_celsius(f))
    }

    pub fn celsius(&self) -> f64 {
        self.0
    }

    pub fn fahrenheit(&self) -> f64 {
        celsius_to_fahrenheit(self.0)
    }

    /// Round to the precision sent to the device (whole degrees F).
    pub fn to_device_fahrenheit(&self) -> i32 {
        self.fahrenheit().round() as i32
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

/// Target mode as the host sees it. The device's auto mode is never offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Off,
    Heat,
    Cool,
}

impl TargetMode {
    pub fn as_device_code(&self) -> u8 {
        match self {
            TargetMode::Off => 0,
            TargetMode::Heat => 1,
            TargetMode::Cool => 2,
        }
    }
}

/// Raw `tmode` as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum DeviceMode {
    Off,
    Heat,
    Cool,
    Auto,
}

impl TryFrom<u8> for DeviceMode {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(DeviceMode::Off),
            1 => Ok(DeviceMode::Heat),
            2 => Ok(DeviceMode::Cool),
            3 => Ok(DeviceMode::Auto),
            other => Err(format!("unknown tmode {other}")),
        }
    }
}

impl From<TargetMode> for DeviceMode {
    fn from(mode: TargetMode) -> Self {
        match mode {
            TargetMode::Off => DeviceMode::Off,
            TargetMode::Heat => DeviceMode::Heat,
            TargetMode::Cool => DeviceMode::Cool,
        }
    }
}

/// Raw `tstate`: what the HVAC is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum CurrentState {
    #[default]
    Off,
    Heat,
    Cool,
}

impl TryFrom<u8> for CurrentState {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(CurrentState::Off),
            1 => Ok(CurrentState::Heat),
            2 => Ok(CurrentState::Cool),
            other => Err(format!("unknown tstate {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum FanMode {
    Auto,
    Circulate,
    On,
}

impl FanMode {
    pub fn as_device_code(&self) -> u8 {
        match self {
            FanMode::Auto => 0,
            FanMode::Circulate => 1,
            FanMode::On => 2,
        }
    }
}

impl TryFrom<u8> for FanMode {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(FanMode::Auto),
            1 => Ok(FanMode::Circulate),
            2 => Ok(FanMode::On),
            other => Err(format!("unknown fmode {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureDisplayUnits {
    Celsius,
    Fahrenheit,
}

/// One full read of `/tstat`. Temperatures are in Fahrenheit as sent.
///
/// The device only reports the setpoint that belongs to the active mode,
/// so `t_heat` and `t_cool` are both optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TstatState {
    pub temp: f64,
    pub tmode: DeviceMode,
    #[serde(default)]
    pub tstate: CurrentState,
    #[serde(default)]
    pub t_heat: Option<f64>,
    #[serde(default)]
    pub t_cool: Option<f64>,
    #[serde(default)]
    pub fmode: Option<FanMode>,
    #[serde(default)]
    pub fstate: Option<u8>,
}

impl TstatState {
    pub fn fan_active(&self) -> bool {
        self.fstate == Some(1) || self.fmode == Some(FanMode::On)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SysInfo {
    pub uuid: String,
    pub fw_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HumidityInfo {
    #[serde(default)]
    pub humidity: Option<f64>,
}

impl HumidityInfo {
    /// Firmware without a humidity sensor answers with a negative value.
    pub fn supported_value(&self) -> Option<f64> {
        self.humidity.filter(|h| *h >= 0.0)
    }
}

/// Services the host should register for this accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    AccessoryInformation,
    Thermostat,
    Fan,
    HumiditySensor,
}

/// Values pushed to the host outside of a read.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TargetTemperature { celsius: f64 },
    FanActive { active: bool },
}
