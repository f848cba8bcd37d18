//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the configuration record and every piece of
//! aggregation state: the publish gates, the presence detector, the
//! orientation debouncer, and the cumulative PIR counter.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  SensorInput ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                  │          AppService           │
//!   DriverPort ◀── │ gates · presence · debouncer  │ ──▶ TimerPort
//!                  └──────────────────────────────┘ ◀─▶ ConfigPort
//! ```
//!
//! Every handler runs to completion and never blocks; the caller is a
//! single cooperative loop, so no state here needs a lock.

use log::{debug, info, warn};

use crate::config::{NodeConfig, Param};
use crate::error::Result;
use crate::gate::{IntervalGate, PublishGate, Tick};
use crate::orientation::{Acceleration, OrientationDebouncer};
use crate::presence::{PresenceDetector, PresenceState};
use crate::scheduler::TaskId;

use super::commands::{
    ButtonEvent, ConfigListing, ConsoleCommand, ConsoleReply, DriverEvent, PirEvent, SensorInput,
};
use super::events::{CORE_THERMOMETER_CHANNEL, DEVICE_NAME, Publication};
use super::ports::{
    ConfigError, ConfigPort, DriverPort, EventSink, FaceClassifier, IndicatorPort, TimerPort,
};

/// LED pulse shown once the node has booted.
const BOOT_PULSE_MS: u32 = 2000;
/// LED pulse acknowledging a button click.
const CLICK_PULSE_MS: u32 = 100;
/// Battery updates arrive at the gate's own interval; an update handled
/// up to this much early still counts as the next one.
const BATTERY_JITTER_MS: Tick = 1000;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: NodeConfig,
    presence: PresenceDetector,
    orientation: OrientationDebouncer,
    temperature_gate: PublishGate,
    battery_gate: IntervalGate,
    pir_gate: IntervalGate,
    /// Pulses since boot.  Never reset; independent of the presence window.
    pir_event_count: u32,
    temperature_channel: u8,
}

impl AppService {
    /// Construct the service from a loaded configuration.
    ///
    /// Does **not** touch any driver; call [`start`](Self::start) next.
    pub fn new(config: NodeConfig) -> Self {
        config.audit();
        Self {
            config,
            presence: PresenceDetector::new(),
            orientation: OrientationDebouncer::new(),
            temperature_gate: PublishGate::new(),
            battery_gate: IntervalGate::new(),
            pir_gate: IntervalGate::new(),
            pir_event_count: 0,
            temperature_channel: CORE_THERMOMETER_CHANNEL,
        }
    }

    /// Publish temperature on a different radio channel.
    pub fn with_temperature_channel(mut self, channel: u8) -> Self {
        self.temperature_channel = channel;
        self
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Arm every driver from the configuration, plan the first presence
    /// window, and announce the node to the radio gateway.
    pub fn start(
        &mut self,
        now: Tick,
        hw: &mut (impl DriverPort + IndicatorPort),
        timers: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) {
        self.arm_drivers(hw);
        timers.plan_relative(
            TaskId::PresenceWindow,
            now,
            self.config.presence.window_interval_ms,
        );
        sink.publish(&Publication::Pairing {
            device: DEVICE_NAME,
            firmware: env!("CARGO_PKG_VERSION"),
        });
        hw.pulse(BOOT_PULSE_MS);
        info!("AppService started at tick {}", now);
    }

    // ── Driver callbacks ──────────────────────────────────────

    /// Dispatch one driver callback to its handler.
    pub fn handle_input(
        &mut self,
        input: SensorInput,
        now: Tick,
        hw: &mut (impl DriverPort + IndicatorPort + FaceClassifier),
        store: &mut impl ConfigPort,
        sink: &mut impl EventSink,
    ) {
        match input {
            SensorInput::Pir(event) => self.on_pir(event, now, sink),
            SensorInput::Temperature(event) => self.on_temperature(event, now, sink),
            SensorInput::Accelerometer(event) => self.on_accelerometer(event, hw, sink),
            SensorInput::Battery(event) => self.on_battery(event, now, sink),
            SensorInput::Button(event) => self.on_button(event, hw, store),
        }
    }

    /// Motion pulse: feed the presence window and the rate-limited
    /// cumulative counter.
    pub fn on_pir(&mut self, event: PirEvent, now: Tick, sink: &mut impl EventSink) {
        match event {
            PirEvent::Motion => {
                self.presence.record_pulse();
                self.pir_event_count = self.pir_event_count.wrapping_add(1);
                debug!("PIR event count {}", self.pir_event_count);

                if self
                    .pir_gate
                    .evaluate(now, self.config.pir_publish_min_interval_ms)
                {
                    sink.publish(&Publication::PirMotionCount(self.pir_event_count));
                    info!("PIR event count published: {}", self.pir_event_count);
                }
            }
            PirEvent::Error => warn!("PIR module error"),
        }
    }

    pub fn on_temperature(&mut self, event: DriverEvent<f32>, now: Tick, sink: &mut impl EventSink) {
        match event {
            DriverEvent::Update(Some(celsius)) => {
                let cfg = &self.config.temperature;
                if self.temperature_gate.evaluate(
                    celsius,
                    now,
                    cfg.publish_interval_ms,
                    cfg.publish_delta_c,
                ) {
                    sink.publish(&Publication::Temperature {
                        channel: self.temperature_channel,
                        celsius,
                    });
                } else {
                    debug!("Thermometer: {:.2} °C suppressed", celsius);
                }
            }
            DriverEvent::Update(None) => debug!("Thermometer: no result, sample skipped"),
            DriverEvent::Error => warn!("Thermometer error"),
        }
    }

    /// Accelerometer sample: classify into a face and publish on change.
    pub fn on_accelerometer(
        &mut self,
        event: DriverEvent<Acceleration>,
        classifier: &mut impl FaceClassifier,
        sink: &mut impl EventSink,
    ) {
        match event {
            DriverEvent::Update(Some(sample)) => {
                let face = classifier.classify(sample);
                if let Some(face) = self.orientation.update(face) {
                    info!("Orientation changed to {:?}", face);
                    sink.publish(&Publication::Orientation(face.code()));
                }
            }
            DriverEvent::Update(None) => debug!("Accelerometer: no result, sample skipped"),
            DriverEvent::Error => warn!("Accelerometer error"),
        }
    }

    pub fn on_battery(&mut self, event: DriverEvent<f32>, now: Tick, sink: &mut impl EventSink) {
        match event {
            DriverEvent::Update(Some(voltage)) => {
                let interval = self.config.battery.publish_interval_ms;
                let slack = BATTERY_JITTER_MS.min(interval / 2);
                if self.battery_gate.evaluate(now, interval - slack) {
                    sink.publish(&Publication::BatteryVoltage(voltage));
                }
            }
            DriverEvent::Update(None) => debug!("Battery: no result, sample skipped"),
            DriverEvent::Error => warn!("Battery monitor error"),
        }
    }

    /// Click acknowledges with a short pulse; hold steps the PIR
    /// sensitivity, persists it, and blinks the new level.
    pub fn on_button(
        &mut self,
        event: ButtonEvent,
        hw: &mut (impl DriverPort + IndicatorPort),
        store: &mut impl ConfigPort,
    ) {
        match event {
            ButtonEvent::Click => hw.pulse(CLICK_PULSE_MS),
            ButtonEvent::Hold => {
                let sensitivity = self.config.pir_sensitivity.next();
                self.config.pir_sensitivity = sensitivity;
                hw.set_pir_sensitivity(sensitivity);
                info!("PIR sensitivity -> {:?}", sensitivity);

                if let Err(e) = store.save(&self.config) {
                    warn!("Config save after sensitivity change failed: {}", e);
                }
                hw.blink(sensitivity.as_u8() + 1);
            }
        }
    }

    // ── Scheduled tasks ───────────────────────────────────────

    /// Presence window boundary.
    ///
    /// With a zero window interval this is a no-op and nothing is
    /// re-planned, leaving the detector dormant until the interval is
    /// set again.
    pub fn on_presence_window(
        &mut self,
        now: Tick,
        timers: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) {
        let cfg = self.config.presence;
        if cfg.window_interval_ms == 0 {
            debug!("Presence window disabled");
            return;
        }

        let report = self.presence.close_window(
            u32::from(cfg.enter_threshold),
            u32::from(cfg.leave_threshold),
        );
        sink.publish(&Publication::PresenceState(report.state.is_present()));
        sink.publish(&Publication::PresenceEvents(report.pulses));
        info!(
            "Presence: {}, presence event count {}",
            report.state.is_present(),
            report.pulses
        );

        timers.plan_relative(TaskId::PresenceWindow, now, cfg.window_interval_ms);
    }

    // ── Console ───────────────────────────────────────────────

    pub fn handle_console(
        &mut self,
        cmd: ConsoleCommand<'_>,
        now: Tick,
        drivers: &mut impl DriverPort,
        timers: &mut impl TimerPort,
        store: &mut impl ConfigPort,
    ) -> Result<ConsoleReply> {
        match cmd {
            ConsoleCommand::ListConfig => Ok(ConsoleReply::Config(self.list_config())),
            ConsoleCommand::SetConfig { name, value } => {
                self.set_param(name, value, now, drivers, timers)?;
                Ok(ConsoleReply::Ok)
            }
            ConsoleCommand::FactoryReset => {
                self.config = store.reset_to_default();
                self.arm_drivers(drivers);
                timers.plan_relative(
                    TaskId::PresenceWindow,
                    now,
                    self.config.presence.window_interval_ms,
                );
                info!("Config restored to factory defaults (not persisted)");
                Ok(ConsoleReply::Ok)
            }
            ConsoleCommand::Store => {
                store.save(&self.config)?;
                info!("Config stored");
                Ok(ConsoleReply::Ok)
            }
        }
    }

    /// Set one named parameter from its wire value and apply its side
    /// effects.  Name and value are both validated before anything
    /// changes.
    pub fn set_param(
        &mut self,
        name: &str,
        value: &str,
        now: Tick,
        drivers: &mut impl DriverPort,
        timers: &mut impl TimerPort,
    ) -> core::result::Result<(), ConfigError> {
        let param = Param::from_name(name).ok_or(ConfigError::UnknownParameter)?;
        let value: u32 = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::MalformedValue)?;
        self.config.set(param, value)?;
        info!("Config: \"{}\" = {}", param.name(), value);

        match param {
            Param::PirSensitivity => drivers.set_pir_sensitivity(self.config.pir_sensitivity),
            Param::PresenceInterval => timers.plan_relative(
                TaskId::PresenceWindow,
                now,
                self.config.presence.window_interval_ms,
            ),
            Param::TemperatureMeasureInterval => {
                drivers.set_temperature_interval(self.config.temperature.measure_interval_ms);
            }
            Param::AccelerometerMeasureInterval => {
                drivers.set_accelerometer_interval(self.config.accelerometer.measure_interval_ms);
            }
            Param::BatteryPublishInterval => {
                drivers.set_battery_interval(self.config.battery.publish_interval_ms);
            }
            Param::PirPublishMinInterval
            | Param::PresenceEnterThreshold
            | Param::PresenceLeaveThreshold
            | Param::TemperaturePublishInterval
            | Param::TemperaturePublishValueChange => {}
        }
        Ok(())
    }

    pub fn list_config(&self) -> ConfigListing {
        let mut lines = ConfigListing::new();
        for param in Param::ALL {
            // Listing capacity equals the parameter count.
            let _ = lines.push(self.config.render_line(param));
        }
        lines
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn presence_state(&self) -> PresenceState {
        self.presence.state()
    }

    /// Pulses counted in the currently open presence window.
    pub fn window_pulses(&self) -> u32 {
        self.presence.pulses()
    }

    /// Cumulative PIR pulses since boot.
    pub fn pir_event_count(&self) -> u32 {
        self.pir_event_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Push every driver-backed setting to its driver.
    fn arm_drivers(&self, drivers: &mut impl DriverPort) {
        drivers.set_battery_interval(self.config.battery.publish_interval_ms);
        drivers.set_temperature_interval(self.config.temperature.measure_interval_ms);
        drivers.set_pir_sensitivity(self.config.pir_sensitivity);
        drivers.set_accelerometer_interval(self.config.accelerometer.measure_interval_ms);
    }
}
