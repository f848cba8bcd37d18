//! Inbound inputs to the application service.
//!
//! Two families: driver callbacks ([`SensorInput`]) that arrive whenever a
//! sensor has something to say, and console commands ([`ConsoleCommand`])
//! typed by a human on the diagnostic port.

use heapless::{String, Vec};

use crate::config::{CONFIG_LINE_CAP, PARAM_COUNT};
use crate::orientation::Acceleration;

/// Generic driver callback: a sample is ready, or the driver failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverEvent<T> {
    /// Sample ready.  `None` when the result could not be read.
    Update(Option<T>),
    Error,
}

/// PIR module callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PirEvent {
    Motion,
    Error,
}

/// Debounced button gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Click,
    Hold,
}

/// Every callback the drivers can deliver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorInput {
    Pir(PirEvent),
    /// Thermometer reading in °C.
    Temperature(DriverEvent<f32>),
    Accelerometer(DriverEvent<Acceleration>),
    /// Battery voltage in V.
    Battery(DriverEvent<f32>),
    Button(ButtonEvent),
}

/// Console commands, already split into name and value by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand<'a> {
    /// List every parameter with its current value.
    ListConfig,
    /// Set one parameter from its wire value.
    SetConfig { name: &'a str, value: &'a str },
    /// Restore factory defaults in memory without persisting.
    FactoryReset,
    /// Persist the current in-memory record.
    Store,
}

/// Console output lines, one per parameter.
pub type ConfigListing = Vec<String<CONFIG_LINE_CAP>, PARAM_COUNT>;

/// Successful console replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleReply {
    Ok,
    Config(ConfigListing),
}
