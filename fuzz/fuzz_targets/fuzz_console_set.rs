//! Fuzz target: console `SetConfig`
//!
//! Splits the input into a parameter name and a value string and feeds
//! them to `AppService::set_param`.
//!
//! Invariants checked:
//! - No panics under any input
//! - A rejected set leaves the configuration untouched
//! - An accepted set reads back the value that was written (within f32
//!   precision for the temperature delta)
//!
//! cargo fuzz run fuzz_console_set

#![no_main]

use libfuzzer_sys::fuzz_target;
use motion_detector::app::ports::{DriverPort, TimerPort};
use motion_detector::app::service::AppService;
use motion_detector::config::{NodeConfig, Param, PirSensitivity};
use motion_detector::gate::Tick;
use motion_detector::scheduler::{Scheduler, TaskId};

struct NullDrivers;

impl DriverPort for NullDrivers {
    fn set_pir_sensitivity(&mut self, _sensitivity: PirSensitivity) {}
    fn set_temperature_interval(&mut self, _interval_ms: Tick) {}
    fn set_accelerometer_interval(&mut self, _interval_ms: Tick) {}
    fn set_battery_interval(&mut self, _interval_ms: Tick) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    // First byte picks a real parameter name half the time so the value
    // parser gets exercised.
    let (name, value) = match text.split_once('\u{0}') {
        Some((name, value)) => (name.to_owned(), value),
        None => match data.first() {
            Some(&b) if b % 2 == 0 => {
                let param = Param::ALL[usize::from(b / 2) % Param::ALL.len()];
                (param.name().to_owned(), text.get(1..).unwrap_or(""))
            }
            _ => return,
        },
    };

    let mut app = AppService::new(NodeConfig::default());
    let mut sched = Scheduler::new();
    sched.plan_relative(TaskId::PresenceWindow, 0, 1);
    let before = *app.config();

    match app.set_param(&name, value, 0, &mut NullDrivers, &mut sched) {
        Ok(()) => {
            let param = Param::from_name(&name).expect("accepted name resolves");
            let written: u32 = value.trim().parse().expect("accepted value parses");
            // The delta is held as f32 tenths; huge values lose precision.
            if param != Param::TemperaturePublishValueChange || written <= 100_000 {
                assert_eq!(app.config().get(param), written);
            }
        }
        Err(_) => assert_eq!(*app.config(), before),
    }
});
