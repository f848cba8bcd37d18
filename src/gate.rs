//! Publish gates — per-metric throttling of outbound events.
//!
//! Sensors sample far more often than the radio budget allows.  A gate
//! sits between a sample and the [`EventSink`](crate::app::ports::EventSink)
//! and answers one question: is this sample worth transmitting now?
//!
//! | Gate             | Emits when                                   | Used for            |
//! |------------------|----------------------------------------------|---------------------|
//! | [`PublishGate`]  | value moved by `delta` **or** interval passed | temperature         |
//! | [`IntervalGate`] | interval passed (never if interval is `0`)   | battery, PIR count  |
//!
//! Gates only track state; the caller performs the actual publish.

/// Monotonic millisecond tick.
pub type Tick = u64;

// ───────────────────────────────────────────────────────────────
// Value + time gate
// ───────────────────────────────────────────────────────────────

/// Gate that emits on a meaningful value change or when the minimum
/// interval since the last emission has elapsed.
#[derive(Debug, Clone, Copy)]
pub struct PublishGate {
    /// NaN until the first emission, so no delta can match it.
    last_value: f32,
    next_allowed: Tick,
}

impl Default for PublishGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PublishGate {
    pub const fn new() -> Self {
        Self {
            last_value: f32::NAN,
            next_allowed: 0,
        }
    }

    /// Decide whether `value` observed at `now` should be published.
    ///
    /// A `delta_threshold` of `0.0` disables the value clause; a
    /// `min_interval` of `0` lets every sample through.  On emission the
    /// gate records `value` and reschedules to `now + min_interval`.
    pub fn evaluate(&mut self, value: f32, now: Tick, min_interval: Tick, delta_threshold: f32) -> bool {
        let moved = delta_threshold > 0.0 && (value - self.last_value).abs() >= delta_threshold;
        if !moved && now < self.next_allowed {
            return false;
        }
        self.last_value = value;
        self.next_allowed = now.saturating_add(min_interval);
        true
    }

    /// Value of the last emission, if any.
    pub fn last_value(&self) -> Option<f32> {
        (!self.last_value.is_nan()).then_some(self.last_value)
    }

    pub fn next_allowed(&self) -> Tick {
        self.next_allowed
    }
}

// ───────────────────────────────────────────────────────────────
// Time-only gate
// ───────────────────────────────────────────────────────────────

/// Gate that emits at most once per interval, and never when the
/// interval is `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalGate {
    next_allowed: Tick,
}

impl IntervalGate {
    pub const fn new() -> Self {
        Self { next_allowed: 0 }
    }

    pub fn evaluate(&mut self, now: Tick, min_interval: Tick) -> bool {
        if min_interval == 0 || now < self.next_allowed {
            return false;
        }
        self.next_allowed = now.saturating_add(min_interval);
        true
    }

    pub fn next_allowed(&self) -> Tick {
        self.next_allowed
    }
}
