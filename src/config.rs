//! Runtime-tunable node configuration.
//!
//! Every timing and threshold parameter lives in a single [`NodeConfig`]
//! record that is persisted as a whole (see [`ConfigPort`]) and can be
//! inspected or changed one parameter at a time through the console.
//!
//! Console values use wire units: durations in seconds, the temperature
//! publish delta in tenths of a degree.  Internally every duration is a
//! millisecond [`Tick`].
//!
//! [`ConfigPort`]: crate::app::ports::ConfigPort

use core::fmt::Write;

use heapless::String;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::gate::Tick;

/// Version tag of the persisted layout.  Bump whenever `NodeConfig`
/// changes shape so stale blobs fall back to defaults.
pub const CONFIG_SCHEMA_ID: u16 = 0x1234;

/// Capacity of one rendered console line.
pub const CONFIG_LINE_CAP: usize = 64;

/// Number of console-addressable parameters.
pub const PARAM_COUNT: usize = 10;

const MS_PER_SEC: Tick = 1000;

// ───────────────────────────────────────────────────────────────
// PIR sensitivity
// ───────────────────────────────────────────────────────────────

/// PIR module detection sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PirSensitivity {
    Low = 0,
    Medium = 1,
    High = 2,
    VeryHigh = 3,
}

impl PirSensitivity {
    /// Next level, wrapping back to `Low` after `VeryHigh`.
    pub fn next(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::VeryHigh,
            Self::VeryHigh => Self::Low,
        }
    }

    pub fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            3 => Some(Self::VeryHigh),
            _ => None,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration record
// ───────────────────────────────────────────────────────────────

/// Presence detector tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Pulses per window needed to enter `Present`.
    pub enter_threshold: u8,
    /// Pulses per window at or below which `Present` is left.
    pub leave_threshold: u8,
    /// Window length in ms.  `0` makes the detector dormant.
    pub window_interval_ms: Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureConfig {
    pub measure_interval_ms: Tick,
    pub publish_interval_ms: Tick,
    /// Change in °C that forces a publish before the interval elapses.
    pub publish_delta_c: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerConfig {
    pub measure_interval_ms: Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    pub publish_interval_ms: Tick,
}

/// The complete persisted configuration of the node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub pir_sensitivity: PirSensitivity,
    /// Minimum spacing of motion-count publications.  `0` disables them.
    pub pir_publish_min_interval_ms: Tick,
    pub presence: PresenceConfig,
    pub temperature: TemperatureConfig,
    pub accelerometer: AccelerometerConfig,
    pub battery: BatteryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            pir_sensitivity: PirSensitivity::Medium,
            pir_publish_min_interval_ms: 60 * MS_PER_SEC, // 1 min

            presence: PresenceConfig {
                enter_threshold: 4,
                leave_threshold: 2,
                window_interval_ms: 2 * 60 * MS_PER_SEC, // 2 min
            },

            temperature: TemperatureConfig {
                measure_interval_ms: 5 * MS_PER_SEC,
                publish_interval_ms: 15 * 60 * MS_PER_SEC,
                publish_delta_c: 1.0,
            },

            accelerometer: AccelerometerConfig {
                measure_interval_ms: 5 * MS_PER_SEC,
            },

            battery: BatteryConfig {
                publish_interval_ms: 60 * 60 * MS_PER_SEC, // 1 h
            },
        }
    }
}

impl NodeConfig {
    /// Read a parameter in wire units.
    pub fn get(&self, param: Param) -> u32 {
        match param {
            Param::PirSensitivity => self.pir_sensitivity.as_u8() as u32,
            Param::PirPublishMinInterval => ms_to_secs(self.pir_publish_min_interval_ms),
            Param::PresenceEnterThreshold => self.presence.enter_threshold as u32,
            Param::PresenceLeaveThreshold => self.presence.leave_threshold as u32,
            Param::PresenceInterval => ms_to_secs(self.presence.window_interval_ms),
            Param::TemperatureMeasureInterval => ms_to_secs(self.temperature.measure_interval_ms),
            Param::TemperaturePublishInterval => ms_to_secs(self.temperature.publish_interval_ms),
            Param::TemperaturePublishValueChange => {
                (self.temperature.publish_delta_c * 10.0).round() as u32
            }
            Param::AccelerometerMeasureInterval => {
                ms_to_secs(self.accelerometer.measure_interval_ms)
            }
            Param::BatteryPublishInterval => ms_to_secs(self.battery.publish_interval_ms),
        }
    }

    /// Write a parameter given in wire units.
    ///
    /// Range checks happen before the record is touched, so a failed call
    /// leaves the configuration exactly as it was.
    pub fn set(&mut self, param: Param, value: u32) -> Result<(), ConfigError> {
        let secs = Tick::from(value) * MS_PER_SEC;
        match param {
            Param::PirSensitivity => {
                self.pir_sensitivity = PirSensitivity::from_u32(value)
                    .ok_or(ConfigError::OutOfRange("PIR Sensitivity must be 0-3"))?;
            }
            Param::PirPublishMinInterval => self.pir_publish_min_interval_ms = secs,
            Param::PresenceEnterThreshold => {
                self.presence.enter_threshold = threshold(value)?;
                self.audit();
            }
            Param::PresenceLeaveThreshold => {
                self.presence.leave_threshold = threshold(value)?;
                self.audit();
            }
            Param::PresenceInterval => self.presence.window_interval_ms = secs,
            Param::TemperatureMeasureInterval => self.temperature.measure_interval_ms = secs,
            Param::TemperaturePublishInterval => self.temperature.publish_interval_ms = secs,
            Param::TemperaturePublishValueChange => {
                self.temperature.publish_delta_c = value as f32 / 10.0;
            }
            Param::AccelerometerMeasureInterval => self.accelerometer.measure_interval_ms = secs,
            Param::BatteryPublishInterval => self.battery.publish_interval_ms = secs,
        }
        Ok(())
    }

    /// Flag combinations that are accepted but probably unintended.
    ///
    /// Returns `true` when the record looks sane.
    pub fn audit(&self) -> bool {
        let p = &self.presence;
        if p.leave_threshold >= p.enter_threshold {
            warn!(
                "Config: presence leave threshold {} >= enter threshold {}; \
                 ambiguous windows resolve to present",
                p.leave_threshold, p.enter_threshold
            );
            return false;
        }
        true
    }

    /// Render one console line: `$CONFIG: "<name>",<value>`.
    pub fn render_line(&self, param: Param) -> String<CONFIG_LINE_CAP> {
        let mut line = String::new();
        // Longest name + u32 fits comfortably in the line capacity.
        let _ = write!(line, "$CONFIG: \"{}\",{}", param.name(), self.get(param));
        line
    }
}

fn ms_to_secs(ms: Tick) -> u32 {
    (ms / MS_PER_SEC).min(Tick::from(u32::MAX)) as u32
}

fn threshold(value: u32) -> Result<u8, ConfigError> {
    u8::try_from(value).map_err(|_| ConfigError::OutOfRange("threshold must be 0-255"))
}

// ───────────────────────────────────────────────────────────────
// Named parameters
// ───────────────────────────────────────────────────────────────

/// One console-addressable configuration parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    PirSensitivity,
    PirPublishMinInterval,
    PresenceEnterThreshold,
    PresenceLeaveThreshold,
    PresenceInterval,
    TemperatureMeasureInterval,
    TemperaturePublishInterval,
    TemperaturePublishValueChange,
    AccelerometerMeasureInterval,
    BatteryPublishInterval,
}

impl Param {
    /// Every parameter in console listing order.
    pub const ALL: [Param; PARAM_COUNT] = [
        Param::PirSensitivity,
        Param::PirPublishMinInterval,
        Param::PresenceEnterThreshold,
        Param::PresenceLeaveThreshold,
        Param::PresenceInterval,
        Param::TemperatureMeasureInterval,
        Param::TemperaturePublishInterval,
        Param::TemperaturePublishValueChange,
        Param::AccelerometerMeasureInterval,
        Param::BatteryPublishInterval,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::PirSensitivity => "PIR Sensitivity",
            Self::PirPublishMinInterval => "PIR Publish Min Interval",
            Self::PresenceEnterThreshold => "Presence Enter Threshold",
            Self::PresenceLeaveThreshold => "Presence Leave Threshold",
            Self::PresenceInterval => "Presence Interval",
            Self::TemperatureMeasureInterval => "Temperature Measure Interval",
            Self::TemperaturePublishInterval => "Temperature Publish Interval",
            Self::TemperaturePublishValueChange => "Temperature Publish Value Change",
            Self::AccelerometerMeasureInterval => "Accelerometer Measure Interval",
            Self::BatteryPublishInterval => "Battery Publish Interval",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}
