use serde_json::{json, Value};

use crate::types::{DeviceMode, FanMode, TargetMode};

pub const TSTAT_PATH: &str = "/tstat";
pub const MODEL_PATH: &str = "/tstat/model";
pub const HUMIDITY_PATH: &str = "/tstat/humidity";
pub const SYS_PATH: &str = "/sys";

/// Below this the auto mode resolves to heat.
pub const AUTO_HEAT_BELOW_F: f64 = 60.0;
/// Above this the auto mode resolves to cool.
pub const AUTO_COOL_ABOVE_F: f64 = 85.0;

pub fn set_target_mode_body(mode: TargetMode) -> Value {
    json!({ "tmode": mode.as_device_code() })
}

pub fn set_heat_setpoint_body(fahrenheit: i32) -> Value {
    json!({ "t_heat": fahrenheit })
}

pub fn set_cool_setpoint_body(fahrenheit: i32) -> Value {
    json!({ "t_cool": fahrenheit })
}

pub fn set_fan_mode_body(mode: FanMode) -> Value {
    json!({ "fmode": mode.as_device_code() })
}

/// Collapse a raw device mode onto the three modes the host understands.
/// Auto is decided by the current temperature: <60°F heat, >85°F cool,
/// anything in between (bounds included) off.
pub fn resolve_mode(mode: DeviceMode, temp_f: f64) -> TargetMode {
    match mode {
        DeviceMode::Off => TargetMode::Off,
        DeviceMode::Heat => TargetMode::Heat,
        DeviceMode::Cool => TargetMode::Cool,
        DeviceMode::Auto if temp_f < AUTO_HEAT_BELOW_F => TargetMode::Heat,
        DeviceMode::Auto if temp_f > AUTO_COOL_ABOVE_F => TargetMode::Cool,
        DeviceMode::Auto => TargetMode::Off,
    }
}
