//! Presence detector — PIR pulses in, stable present/absent out.
//!
//! PIR modules fire in bursts: one person walking past produces several
//! pulses, a person sitting still produces almost none.  The detector
//! counts pulses over a fixed window and, at each window boundary,
//! applies a two-threshold hysteresis:
//!
//! ```text
//!                  count >= enter
//!        ┌────────┐ ───────────────▶ ┌─────────┐
//!        │ Absent │                  │ Present │
//!        └────────┘ ◀─────────────── └─────────┘
//!                  count <= leave
//! ```
//!
//! Counts strictly between `leave` and `enter` keep the previous state.
//! The window timer itself belongs to the caller (see
//! [`AppService::on_presence_window`](crate::app::service::AppService::on_presence_window)).

use log::info;

/// Binary occupancy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenceState {
    #[default]
    Absent,
    Present,
}

impl PresenceState {
    pub fn is_present(self) -> bool {
        self == Self::Present
    }
}

/// Result of one window evaluation, published by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowReport {
    pub state: PresenceState,
    /// Pulses counted during the window that just closed.
    pub pulses: u32,
    /// Whether this window changed the state.
    pub changed: bool,
}

#[derive(Debug, Default)]
pub struct PresenceDetector {
    pulses: u32,
    state: PresenceState,
}

impl PresenceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one motion pulse.  Never gated.
    pub fn record_pulse(&mut self) {
        self.pulses = self.pulses.saturating_add(1);
    }

    /// Close the current window: apply hysteresis to the pulse count,
    /// then reset the count.
    ///
    /// Both checks read the state held at the start of the window, so a
    /// window can make at most one transition.  With `leave >= enter` an
    /// absent node whose count satisfies both thresholds becomes present.
    pub fn close_window(&mut self, enter_threshold: u32, leave_threshold: u32) -> WindowReport {
        let pulses = self.pulses;
        let next = match self.state {
            PresenceState::Absent if pulses >= enter_threshold => PresenceState::Present,
            PresenceState::Present if pulses <= leave_threshold => PresenceState::Absent,
            unchanged => unchanged,
        };

        let changed = next != self.state;
        if changed {
            info!("Presence: {:?} -> {:?} ({} pulses)", self.state, next, pulses);
        }
        self.state = next;
        self.pulses = 0;

        WindowReport {
            state: next,
            pulses,
            changed,
        }
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    /// Pulses counted so far in the open window.
    pub fn pulses(&self) -> u32 {
        self.pulses
    }
}
