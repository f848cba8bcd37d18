//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - GPIO ISRs (PIR pulse, button gestures)
//! - Driver sample-ready callbacks (thermometer, accelerometer, battery)
//! - Scheduler delegate (presence window boundary)
//!
//! Events are consumed by the main loop, which processes them one at a
//! time in FIFO order.  Sample payloads travel separately through the
//! [`sensors`](crate::sensors) mailboxes; the queue only carries the
//! notification.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ GPIO ISR    │────▶│              │     │              │
//! │ Driver cb   │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Scheduler   │────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicUsize, Ordering};

use heapless::mpmc::Q32;
use log::warn;

use crate::app::ports::SchedulerDelegate;
use crate::gate::Tick;
use crate::scheduler::TaskId;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 32;

/// System event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    // ── GPIO ──────────────────────────────────────────────
    /// PIR module reported a motion pulse.
    PirMotion = 0,
    /// PIR module reported a fault.
    PirError = 1,
    ButtonClick = 2,
    ButtonHold = 3,

    // ── Sensor data ───────────────────────────────────────
    /// Thermometer sample deposited (or read failed).
    TemperatureReady = 10,
    TemperatureError = 11,
    AccelerometerReady = 12,
    AccelerometerError = 13,
    BatteryReady = 14,
    BatteryError = 15,

    // ── Scheduled ─────────────────────────────────────────
    /// Presence window boundary.
    PresenceWindow = 20,
}

// ── Lock-free MPSC queue ──────────────────────────────────────
//
// Several ISRs, driver callbacks and the scheduler delegate push; only
// the main loop pops.  Slot reservation is a CAS inside `heapless::mpmc`,
// so two producers never claim the same slot.

/// Bounded FIFO of [`Event`]s, safe to share between producers.
pub struct EventQueue {
    slots: Q32<Event>,
    /// Pending count, for diagnostics only.
    len: AtomicUsize,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self { slots: Q32::new(), len: AtomicUsize::new(0) }
    }

    /// Push an event.
    /// Safe to call from ISR context (lock-free).
    /// Returns `false` if the queue is full (event dropped).
    pub fn push(&self, event: Event) -> bool {
        // Count first so a racing pop never drives `len` below zero.
        self.len.fetch_add(1, Ordering::Relaxed);
        if self.slots.enqueue(event).is_err() {
            self.len.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Pop the next event, `None` when empty.
    pub fn pop(&self) -> Option<Event> {
        let event = self.slots.dequeue()?;
        self.len.fetch_sub(1, Ordering::Relaxed);
        Some(event)
    }

    /// Drain all pending events into a callback, in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    /// Number of pending events. Approximate while producers are active.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The queue shared by ISRs, driver callbacks and the main loop.
pub static EVENTS: EventQueue = EventQueue::new();

/// Push an event into the global queue.
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    EVENTS.push(event)
}

/// Drain the global queue into a callback.
pub fn drain_events(handler: impl FnMut(Event)) {
    EVENTS.drain(handler)
}

// ── Scheduler delegate ────────────────────────────────────────
//
// Bridges the scheduler (which knows nothing about the event system)
// to the event queue: a due task becomes an event the loop drains.

/// Turns due scheduler tasks into queue events.
pub struct EventQueueDelegate<'a> {
    queue: &'a EventQueue,
}

impl<'a> EventQueueDelegate<'a> {
    pub fn new(queue: &'a EventQueue) -> Self {
        Self { queue }
    }
}

impl SchedulerDelegate for EventQueueDelegate<'_> {
    fn on_task_due(&mut self, task: TaskId, _now: Tick) -> bool {
        let event = match task {
            TaskId::PresenceWindow => Event::PresenceWindow,
        };
        let accepted = self.queue.push(event);
        if !accepted {
            warn!("Event queue full, '{}' deferred", task.label());
        }
        accepted
    }
}
