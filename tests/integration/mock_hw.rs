//! Mock adapters for integration tests.
//!
//! Records every driver and LED call so tests can assert on the full
//! command history without touching real peripherals, and bundles the
//! service with a real [`Scheduler`] so windows fire the way they do on
//! the node.

use std::collections::VecDeque;

use motion_detector::app::commands::SensorInput;
use motion_detector::app::events::Publication;
use motion_detector::app::ports::{
    ConfigError, ConfigPort, DriverPort, EventSink, FaceClassifier, IndicatorPort,
    SchedulerDelegate,
};
use motion_detector::app::service::AppService;
use motion_detector::config::{NodeConfig, PirSensitivity};
use motion_detector::gate::Tick;
use motion_detector::orientation::{Acceleration, Face};
use motion_detector::scheduler::{Scheduler, TaskId};

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    PirSensitivity(PirSensitivity),
    TemperatureInterval(Tick),
    AccelerometerInterval(Tick),
    BatteryInterval(Tick),
    Pulse(u32),
    Blink(u8),
}

// ── MockHardware ──────────────────────────────────────────────

/// Driver settings, LED and face classifier in one recorder.
pub struct MockHardware {
    pub calls: Vec<HwCall>,
    /// Faces handed out by `classify`, front first.  Empty ⇒ `Unknown`.
    pub faces: VecDeque<Face>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            faces: VecDeque::new(),
        }
    }

    pub fn last_call(&self) -> Option<&HwCall> {
        self.calls.last()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverPort for MockHardware {
    fn set_pir_sensitivity(&mut self, sensitivity: PirSensitivity) {
        self.calls.push(HwCall::PirSensitivity(sensitivity));
    }

    fn set_temperature_interval(&mut self, interval_ms: Tick) {
        self.calls.push(HwCall::TemperatureInterval(interval_ms));
    }

    fn set_accelerometer_interval(&mut self, interval_ms: Tick) {
        self.calls.push(HwCall::AccelerometerInterval(interval_ms));
    }

    fn set_battery_interval(&mut self, interval_ms: Tick) {
        self.calls.push(HwCall::BatteryInterval(interval_ms));
    }
}

impl IndicatorPort for MockHardware {
    fn pulse(&mut self, duration_ms: u32) {
        self.calls.push(HwCall::Pulse(duration_ms));
    }

    fn blink(&mut self, count: u8) {
        self.calls.push(HwCall::Blink(count));
    }
}

impl FaceClassifier for MockHardware {
    fn classify(&mut self, _sample: Acceleration) -> Face {
        self.faces.pop_front().unwrap_or(Face::Unknown)
    }
}

// ── MockConfigStore ───────────────────────────────────────────

/// Config persistence that keeps the last saved record in memory.
pub struct MockConfigStore {
    pub saved: Option<NodeConfig>,
    pub saves: u32,
    pub fail_saves: bool,
    default: NodeConfig,
}

#[allow(dead_code)]
impl MockConfigStore {
    pub fn new() -> Self {
        Self {
            saved: None,
            saves: 0,
            fail_saves: false,
            default: NodeConfig::default(),
        }
    }
}

impl Default for MockConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPort for MockConfigStore {
    fn load(&mut self, _schema_id: u16, default: &NodeConfig) -> NodeConfig {
        self.default = *default;
        self.saved.unwrap_or(*default)
    }

    fn save(&mut self, config: &NodeConfig) -> Result<(), ConfigError> {
        if self.fail_saves {
            return Err(ConfigError::Storage(
                motion_detector::app::ports::StorageError::Full,
            ));
        }
        self.saved = Some(*config);
        self.saves += 1;
        Ok(())
    }

    fn reset_to_default(&mut self) -> NodeConfig {
        self.default
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub published: Vec<Publication>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self {
            published: Vec::new(),
        }
    }

    /// Presence publications as `(state, pulses)` pairs, one per window.
    pub fn presence_windows(&self) -> Vec<(bool, u32)> {
        let states = self.published.iter().filter_map(|p| match p {
            Publication::PresenceState(s) => Some(*s),
            _ => None,
        });
        let counts = self.published.iter().filter_map(|p| match p {
            Publication::PresenceEvents(n) => Some(*n),
            _ => None,
        });
        states.zip(counts).collect()
    }

    pub fn count_where(&self, f: impl Fn(&Publication) -> bool) -> usize {
        self.published.iter().filter(|p| f(p)).count()
    }

    pub fn clear(&mut self) {
        self.published.clear();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn publish(&mut self, publication: &Publication) {
        self.published.push(*publication);
    }
}

// ── Test rig ──────────────────────────────────────────────────

/// Collects due tasks so they can be dispatched after `poll` returns.
#[derive(Default)]
struct DueTasks(Vec<TaskId>);

impl SchedulerDelegate for DueTasks {
    fn on_task_due(&mut self, task: TaskId, _now: Tick) -> bool {
        self.0.push(task);
        true
    }
}

/// The service wired to mocks and a real scheduler, with a virtual clock.
pub struct Rig {
    pub app: AppService,
    pub hw: MockHardware,
    pub sched: Scheduler,
    pub sink: RecordingSink,
    pub store: MockConfigStore,
    pub now: Tick,
}

#[allow(dead_code)]
impl Rig {
    /// Boot at tick 0 with `config`.
    pub fn boot(config: NodeConfig) -> Self {
        let mut rig = Self {
            app: AppService::new(config),
            hw: MockHardware::new(),
            sched: Scheduler::new(),
            sink: RecordingSink::new(),
            store: MockConfigStore::new(),
            now: 0,
        };
        rig.app
            .start(rig.now, &mut rig.hw, &mut rig.sched, &mut rig.sink);
        rig
    }

    /// Move the clock forward to `t`, firing every task that falls due on
    /// the way at its own deadline.
    pub fn advance_to(&mut self, t: Tick) {
        while let Some(due) = self.sched.next_due().filter(|&d| d <= t) {
            self.now = due.max(self.now);
            self.poll();
        }
        self.now = t;
        self.poll();
    }

    pub fn advance_by(&mut self, ms: Tick) {
        self.advance_to(self.now + ms);
    }

    pub fn input(&mut self, input: SensorInput) {
        self.app.handle_input(
            input,
            self.now,
            &mut self.hw,
            &mut self.store,
            &mut self.sink,
        );
    }

    fn poll(&mut self) {
        let mut due = DueTasks::default();
        self.sched.poll(self.now, &mut due);
        for task in due.0 {
            match task {
                TaskId::PresenceWindow => {
                    self.app
                        .on_presence_window(self.now, &mut self.sched, &mut self.sink)
                }
            }
        }
    }
}
