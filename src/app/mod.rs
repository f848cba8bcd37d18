//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the decision logic of the motion detector node:
//! publish gating, presence hysteresis, orientation debouncing, and the
//! configuration console.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
