//! Outbound publications.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Each one maps to a radio
//! topic and a typed payload.

use core::fmt::Write;

use heapless::String;
use serde::Serialize;

/// Capacity of a rendered topic string.
pub const TOPIC_CAP: usize = 48;

/// Radio channel of the thermometer soldered on the core module
/// (I2C0, alternate address).
pub const CORE_THERMOMETER_CHANNEL: u8 = 1;

/// Name announced in the pairing request.
pub const DEVICE_NAME: &str = "motion-detector";

/// Structured publications emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Publication {
    /// Pairing request sent once at boot.
    Pairing {
        device: &'static str,
        firmware: &'static str,
    },
    /// Dice face code, sent only when it changes.
    Orientation(i32),
    /// Cumulative PIR pulse count since boot.
    PirMotionCount(u32),
    BatteryVoltage(f32),
    Temperature { channel: u8, celsius: f32 },
    /// Presence state at the end of a window.
    PresenceState(bool),
    /// Raw pulse count of the window that just closed.
    PresenceEvents(u32),
}

/// Typed payload carried by a publication.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Int(i64),
    Float(f32),
    Text(&'static str),
}

impl Publication {
    pub fn topic(&self) -> String<TOPIC_CAP> {
        let mut topic = String::new();
        let _ = match self {
            Self::Pairing { device, .. } => write!(topic, "pairing/{}", device),
            Self::Orientation(_) => write!(topic, "orientation"),
            Self::PirMotionCount(_) => write!(topic, "pir/-/event-count"),
            Self::BatteryVoltage(_) => write!(topic, "battery/-/voltage"),
            Self::Temperature { channel, .. } => {
                write!(topic, "thermometer/0:{}/temperature", channel)
            }
            Self::PresenceState(_) => write!(topic, "presence/-/state"),
            Self::PresenceEvents(_) => write!(topic, "presence/-/events"),
        };
        topic
    }

    pub fn payload(&self) -> Payload {
        match *self {
            Self::Pairing { firmware, .. } => Payload::Text(firmware),
            Self::Orientation(code) => Payload::Int(code.into()),
            Self::PirMotionCount(n) | Self::PresenceEvents(n) => Payload::Int(n.into()),
            Self::BatteryVoltage(v) => Payload::Float(v),
            Self::Temperature { celsius, .. } => Payload::Float(celsius),
            Self::PresenceState(present) => Payload::Int(i64::from(present)),
        }
    }
}
