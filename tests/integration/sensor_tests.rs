//! Sampled sensors: thermometer delta/interval gating, battery cadence,
//! orientation edge detection, and the mailbox → event queue hand-off.

use motion_detector::app::commands::{DriverEvent, PirEvent, SensorInput};
use motion_detector::app::events::{CORE_THERMOMETER_CHANNEL, Publication};
use motion_detector::config::NodeConfig;
use motion_detector::events::{self, Event};
use motion_detector::orientation::{Acceleration, Face};
use motion_detector::sensors;

use crate::mock_hw::Rig;

fn temperatures(rig: &Rig) -> Vec<f32> {
    rig.sink
        .published
        .iter()
        .filter_map(|p| match p {
            Publication::Temperature { celsius, .. } => Some(*celsius),
            _ => None,
        })
        .collect()
}

fn sample_temperature(rig: &mut Rig, at: u64, celsius: f32) {
    rig.advance_to(at);
    rig.input(SensorInput::Temperature(DriverEvent::Update(Some(celsius))));
}

#[test]
fn temperature_publishes_on_delta_or_interval() {
    let mut rig = Rig::boot(NodeConfig::default());

    sample_temperature(&mut rig, 5_000, 21.0); // first sample
    sample_temperature(&mut rig, 10_000, 21.5); // small change, suppressed
    sample_temperature(&mut rig, 15_000, 22.0); // Δ = 1.0 → publish
    sample_temperature(&mut rig, 20_000, 21.2); // Δ = 0.8, suppressed
    sample_temperature(&mut rig, 15_000 + 900_000, 21.2); // interval elapsed

    assert_eq!(temperatures(&rig), vec![21.0, 22.0, 21.2]);
}

#[test]
fn temperature_uses_core_thermometer_channel() {
    let mut rig = Rig::boot(NodeConfig::default());
    sample_temperature(&mut rig, 1_000, 19.5);
    assert!(rig.sink.published.contains(&Publication::Temperature {
        channel: CORE_THERMOMETER_CHANNEL,
        celsius: 19.5
    }));
}

#[test]
fn temperature_zero_delta_is_interval_only() {
    let mut cfg = NodeConfig::default();
    cfg.temperature.publish_delta_c = 0.0;
    cfg.temperature.publish_interval_ms = 60_000;
    let mut rig = Rig::boot(cfg);

    sample_temperature(&mut rig, 1_000, 20.0);
    sample_temperature(&mut rig, 2_000, 35.0);
    sample_temperature(&mut rig, 61_000, 35.0);
    assert_eq!(temperatures(&rig), vec![20.0, 35.0]);
}

#[test]
fn failed_reads_change_nothing() {
    let mut rig = Rig::boot(NodeConfig::default());
    rig.sink.clear();

    rig.input(SensorInput::Temperature(DriverEvent::Update(None)));
    rig.input(SensorInput::Temperature(DriverEvent::Error));
    rig.input(SensorInput::Battery(DriverEvent::Update(None)));
    rig.input(SensorInput::Battery(DriverEvent::Error));
    rig.input(SensorInput::Accelerometer(DriverEvent::Update(None)));
    rig.input(SensorInput::Accelerometer(DriverEvent::Error));
    rig.input(SensorInput::Pir(PirEvent::Error));

    assert!(rig.sink.published.is_empty());
    assert_eq!(rig.app.pir_event_count(), 0);
    assert_eq!(rig.app.window_pulses(), 0);

    // The first real sample still counts as the first.
    sample_temperature(&mut rig, 1_000, 20.0);
    assert_eq!(temperatures(&rig), vec![20.0]);
}

#[test]
fn battery_is_published_once_per_interval() {
    let mut rig = Rig::boot(NodeConfig::default());

    for minute in 1..=150u64 {
        rig.advance_to(minute * 60_000);
        rig.input(SensorInput::Battery(DriverEvent::Update(Some(3.0))));
    }
    // Minutes 1, 61, 121.
    assert_eq!(
        rig.sink
            .count_where(|p| matches!(p, Publication::BatteryVoltage(_))),
        3
    );
}

#[test]
fn battery_update_handled_slightly_early_is_still_published() {
    let mut rig = Rig::boot(NodeConfig::default());
    let battery = |rig: &Rig| {
        rig.sink
            .count_where(|p| matches!(p, Publication::BatteryVoltage(_)))
    };

    rig.advance_to(3_600_000);
    rig.input(SensorInput::Battery(DriverEvent::Update(Some(3.0))));
    assert_eq!(battery(&rig), 1);

    // Loop jitter: the next hourly update is handled 40 ms early.
    rig.advance_to(2 * 3_600_000 - 40);
    rig.input(SensorInput::Battery(DriverEvent::Update(Some(2.9))));
    assert_eq!(battery(&rig), 2);

    // Well inside the interval it is still suppressed.
    rig.advance_to(2 * 3_600_000 + 600_000);
    rig.input(SensorInput::Battery(DriverEvent::Update(Some(2.9))));
    assert_eq!(battery(&rig), 2);
}

#[test]
fn orientation_publishes_only_changes() {
    let mut rig = Rig::boot(NodeConfig::default());
    rig.hw
        .faces
        .extend([Face::Two, Face::Two, Face::Five, Face::Five, Face::Five, Face::Two]);

    for _ in 0..6 {
        rig.input(SensorInput::Accelerometer(DriverEvent::Update(Some(
            Acceleration::default(),
        ))));
    }
    let codes: Vec<i32> = rig
        .sink
        .published
        .iter()
        .filter_map(|p| match p {
            Publication::Orientation(code) => Some(*code),
            _ => None,
        })
        .collect();
    assert_eq!(codes, vec![2, 5, 2]);
}

#[test]
fn mailbox_events_reach_the_service() {
    let mut rig = Rig::boot(NodeConfig::default());
    rig.sink.clear();
    events::drain_events(|_| {});

    assert!(sensors::post_temperature(Some(23.5)));
    assert!(events::push_event(Event::PirMotion));
    assert!(sensors::post_battery(None));

    let mut inputs = Vec::new();
    events::drain_events(|e| inputs.extend(sensors::input_for(e)));
    assert_eq!(inputs.len(), 3);
    assert_eq!(
        inputs[2],
        SensorInput::Battery(DriverEvent::Update(None))
    );
    for input in inputs {
        rig.input(input);
    }

    assert_eq!(rig.app.pir_event_count(), 1);
    assert_eq!(temperatures(&rig), vec![23.5]);
}
