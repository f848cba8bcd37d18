//! Sample mailboxes between driver callbacks and the main loop.
//!
//! A driver callback deposits its latest reading here and then posts the
//! matching [`Event`] on the queue.  The main loop takes the reading when
//! it handles the event.  One slot per sensor: a newer reading overwrites
//! one the loop has not consumed yet, which is what a periodic sampler
//! wants.
//!
//! Floats travel as their bit pattern in an `AtomicU32`; a separate
//! `AtomicBool` marks whether the slot holds a fresh value.  A `take`
//! that finds the flag clear maps to `Update(None)`, the same transient
//! read failure the drivers report.  The three-axis sample sits behind a
//! sequence counter so the loop never sees axes from two different
//! samples.

use core::hint::spin_loop;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering, fence};

use crate::app::commands::{ButtonEvent, DriverEvent, PirEvent, SensorInput};
use crate::events::{Event, push_event};
use crate::orientation::Acceleration;

/// One `f32` slot, lock-free.
struct FloatSlot {
    bits: AtomicU32,
    full: AtomicBool,
}

impl FloatSlot {
    const fn new() -> Self {
        Self {
            bits: AtomicU32::new(0),
            full: AtomicBool::new(false),
        }
    }

    fn put(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
        self.full.store(true, Ordering::Release);
    }

    fn take(&self) -> Option<f32> {
        if self.full.swap(false, Ordering::Acquire) {
            Some(f32::from_bits(self.bits.load(Ordering::Relaxed)))
        } else {
            None
        }
    }
}

/// Three-axis slot guarded by a sequence counter (odd while a write is in
/// progress).  One writer, one reader.
struct VectorSlot {
    seq: AtomicU32,
    axes: [AtomicU32; 3],
    full: AtomicBool,
}

impl VectorSlot {
    const fn new() -> Self {
        Self {
            seq: AtomicU32::new(0),
            axes: [const { AtomicU32::new(0) }; 3],
            full: AtomicBool::new(false),
        }
    }

    fn put(&self, a: Acceleration) {
        self.seq.fetch_add(1, Ordering::Relaxed);
        fence(Ordering::Release);
        for (axis, value) in self.axes.iter().zip([a.x, a.y, a.z]) {
            axis.store(value.to_bits(), Ordering::Relaxed);
        }
        self.seq.fetch_add(1, Ordering::Release);
        self.full.store(true, Ordering::Release);
    }

    fn take(&self) -> Option<Acceleration> {
        if !self.full.swap(false, Ordering::Acquire) {
            return None;
        }
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before % 2 == 1 {
                spin_loop();
                continue;
            }
            let [x, y, z] = [0, 1, 2].map(|i| f32::from_bits(self.axes[i].load(Ordering::Relaxed)));
            fence(Ordering::Acquire);
            if self.seq.load(Ordering::Relaxed) == before {
                return Some(Acceleration { x, y, z });
            }
        }
    }
}

static TEMPERATURE: FloatSlot = FloatSlot::new();
static BATTERY: FloatSlot = FloatSlot::new();
static ACCELERATION: VectorSlot = VectorSlot::new();

// ── Producer side (driver callbacks) ──────────────────────────

/// Thermometer callback: `None` when the result could not be read.
pub fn post_temperature(celsius: Option<f32>) -> bool {
    if let Some(c) = celsius {
        TEMPERATURE.put(c);
    }
    push_event(Event::TemperatureReady)
}

/// Battery monitor callback: `None` when the voltage could not be read.
pub fn post_battery(voltage: Option<f32>) -> bool {
    if let Some(v) = voltage {
        BATTERY.put(v);
    }
    push_event(Event::BatteryReady)
}

/// Accelerometer callback: `None` when the sample could not be read.
pub fn post_acceleration(sample: Option<Acceleration>) -> bool {
    if let Some(a) = sample {
        ACCELERATION.put(a);
    }
    push_event(Event::AccelerometerReady)
}

// ── Consumer side (main loop) ─────────────────────────────────

pub fn take_temperature() -> Option<f32> {
    TEMPERATURE.take()
}

pub fn take_battery() -> Option<f32> {
    BATTERY.take()
}

pub fn take_acceleration() -> Option<Acceleration> {
    ACCELERATION.take()
}

/// Resolve a queued event into the driver callback it stands for,
/// taking the matching reading out of its mailbox.
///
/// Returns `None` for events that are not driver callbacks.
pub fn input_for(event: Event) -> Option<SensorInput> {
    let input = match event {
        Event::PirMotion => SensorInput::Pir(PirEvent::Motion),
        Event::PirError => SensorInput::Pir(PirEvent::Error),
        Event::ButtonClick => SensorInput::Button(ButtonEvent::Click),
        Event::ButtonHold => SensorInput::Button(ButtonEvent::Hold),
        Event::TemperatureReady => SensorInput::Temperature(DriverEvent::Update(take_temperature())),
        Event::TemperatureError => SensorInput::Temperature(DriverEvent::Error),
        Event::AccelerometerReady => {
            SensorInput::Accelerometer(DriverEvent::Update(take_acceleration()))
        }
        Event::AccelerometerError => SensorInput::Accelerometer(DriverEvent::Error),
        Event::BatteryReady => SensorInput::Battery(DriverEvent::Update(take_battery())),
        Event::BatteryError => SensorInput::Battery(DriverEvent::Error),
        Event::PresenceWindow => return None,
    };
    Some(input)
}
