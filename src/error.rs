//! Unified error type for the node firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! console and the main loop's error reporting uniform.  All variants are
//! `Copy` so they can be passed around without allocation.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A configuration parameter could not be read, set or persisted.
    Config(ConfigError),
    /// The key-value store failed outside of config handling.
    Storage(StorageError),
    /// Peripheral or platform initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
