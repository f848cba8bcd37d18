//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (drivers, radio, LED, storage, timers) implement these
//! traits.  The [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::config::{NodeConfig, PirSensitivity};
use crate::gate::Tick;
use crate::orientation::{Acceleration, Face};
use crate::scheduler::TaskId;

use super::events::Publication;

// ───────────────────────────────────────────────────────────────
// Tick source
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait TickSource {
    fn now_ms(&self) -> Tick;
}

// ───────────────────────────────────────────────────────────────
// Driver port (domain → sensor drivers)
// ───────────────────────────────────────────────────────────────

/// Live sampling settings of the external sensor drivers.
///
/// The service re-arms the matching driver in the same call that
/// changes the configuration, so the record and the driver never
/// disagree.
pub trait DriverPort {
    fn set_pir_sensitivity(&mut self, sensitivity: PirSensitivity);

    fn set_temperature_interval(&mut self, interval_ms: Tick);

    fn set_accelerometer_interval(&mut self, interval_ms: Tick);

    /// The battery monitor samples and reports at the publish cadence.
    fn set_battery_interval(&mut self, interval_ms: Tick);
}

// ───────────────────────────────────────────────────────────────
// Face classifier (external geometric classifier)
// ───────────────────────────────────────────────────────────────

/// Turns a raw acceleration vector into a dice face.  May keep its own
/// filtering state between samples.
pub trait FaceClassifier {
    fn classify(&mut self, sample: Acceleration) -> Face;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (domain → status LED)
// ───────────────────────────────────────────────────────────────

pub trait IndicatorPort {
    /// Single pulse of `duration_ms`.
    fn pulse(&mut self, duration_ms: u32);

    /// `count` short blinks.
    fn blink(&mut self, count: u8);
}

// ───────────────────────────────────────────────────────────────
// Timer port (domain → cooperative scheduler)
// ───────────────────────────────────────────────────────────────

/// "Run this task again `delay_ms` from now."
///
/// Planning a task replaces any firing already scheduled for it.
pub trait TimerPort {
    fn plan_relative(&mut self, task: TaskId, now: Tick, delay_ms: Tick);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → radio / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits [`Publication`]s through this port.  Adapters decide
/// where they go (radio, serial log, test recorder).  Delivery is not
/// acknowledged.
pub trait EventSink {
    fn publish(&mut self, publication: &Publication);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the configuration record as a whole.
pub trait ConfigPort {
    /// Load the record stored under `schema_id`.
    ///
    /// Missing, corrupted, or differently-versioned blobs yield `default`
    /// transparently.  The schema id and default are remembered for
    /// later [`save`](Self::save) and [`reset_to_default`](Self::reset_to_default) calls.
    fn load(&mut self, schema_id: u16, default: &NodeConfig) -> NodeConfig;

    /// Persist the record under the schema id given to `load`.
    fn save(&mut self, config: &NodeConfig) -> Result<(), ConfigError>;

    /// The default record given to `load`.  Does not touch storage.
    fn reset_to_default(&mut self) -> NodeConfig;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Write operations MUST be atomic — no partial writes on power loss.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from event system)
// ───────────────────────────────────────────────────────────────

/// Callback the [`Scheduler`](crate::scheduler::Scheduler) invokes when
/// a planned task comes due.  The main loop forwards it to the event
/// queue; tests record it.
pub trait SchedulerDelegate {
    /// Returns `false` when the task could not be handed off; the
    /// scheduler then retries it shortly.
    fn on_task_due(&mut self, task: TaskId, now: Tick) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration get/set/persist operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No parameter has this name.
    UnknownParameter,
    /// The value is not an unsigned integer.
    MalformedValue,
    /// The value parsed but is outside the parameter's range.
    OutOfRange(&'static str),
    /// Stored blob could not be encoded or decoded.
    Corrupted,
    /// The storage backend refused the operation.
    Storage(StorageError),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownParameter => write!(f, "unrecognized parameter"),
            Self::MalformedValue => write!(f, "malformed value"),
            Self::OutOfRange(msg) => write!(f, "out of range: {}", msg),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl core::error::Error for StorageError {}
