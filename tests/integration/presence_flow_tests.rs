//! Presence detection end to end: PIR pulses → window boundary fired by
//! the scheduler → state/event-count publications.

use motion_detector::app::commands::{PirEvent, SensorInput};
use motion_detector::app::events::Publication;
use motion_detector::config::NodeConfig;
use motion_detector::presence::PresenceState;
use motion_detector::scheduler::TaskId;

use crate::mock_hw::Rig;

const WINDOW: u64 = 120_000;

fn pulses(rig: &mut Rig, n: u32) {
    for _ in 0..n {
        rig.advance_by(1_000);
        rig.input(SensorInput::Pir(PirEvent::Motion));
    }
}

#[test]
fn first_window_is_planned_at_boot() {
    let rig = Rig::boot(NodeConfig::default());
    assert_eq!(rig.sched.due_at(TaskId::PresenceWindow), Some(WINDOW));
}

#[test]
fn enter_then_leave_with_hysteresis() {
    let mut rig = Rig::boot(NodeConfig::default());

    // Window 1: 4 pulses ≥ enter (4) → present.
    pulses(&mut rig, 4);
    rig.advance_to(WINDOW);
    assert_eq!(rig.app.presence_state(), PresenceState::Present);

    // Window 2: 3 pulses, between thresholds → unchanged.
    pulses(&mut rig, 3);
    rig.advance_to(2 * WINDOW);
    assert_eq!(rig.app.presence_state(), PresenceState::Present);

    // Window 3: 1 pulse ≤ leave (2) → absent.
    pulses(&mut rig, 1);
    rig.advance_to(3 * WINDOW);
    assert_eq!(rig.app.presence_state(), PresenceState::Absent);

    assert_eq!(
        rig.sink.presence_windows(),
        vec![(true, 4), (true, 3), (false, 1)]
    );
}

#[test]
fn three_pulses_from_absent_stay_absent() {
    let mut rig = Rig::boot(NodeConfig::default());
    pulses(&mut rig, 3);
    rig.advance_to(WINDOW);
    assert_eq!(rig.sink.presence_windows(), vec![(false, 3)]);
}

#[test]
fn window_counter_resets_but_cumulative_count_does_not() {
    let mut rig = Rig::boot(NodeConfig::default());
    pulses(&mut rig, 5);
    assert_eq!(rig.app.window_pulses(), 5);

    rig.advance_to(WINDOW);
    assert_eq!(rig.app.window_pulses(), 0);
    assert_eq!(rig.app.pir_event_count(), 5);

    pulses(&mut rig, 2);
    assert_eq!(rig.app.window_pulses(), 2);
    assert_eq!(rig.app.pir_event_count(), 7);
}

#[test]
fn empty_windows_keep_publishing() {
    let mut rig = Rig::boot(NodeConfig::default());
    rig.advance_to(3 * WINDOW);
    assert_eq!(
        rig.sink.presence_windows(),
        vec![(false, 0), (false, 0), (false, 0)]
    );
}

#[test]
fn zero_interval_suppresses_presence_until_reenabled() {
    let mut rig = Rig::boot(NodeConfig::default());
    rig.advance_to(WINDOW);
    assert_eq!(rig.sink.presence_windows().len(), 1);

    // Disable mid-run: the replanned firing becomes a no-op.
    rig.app
        .set_param("Presence Interval", "0", rig.now, &mut rig.hw, &mut rig.sched)
        .unwrap();
    pulses(&mut rig, 6);
    rig.advance_by(10 * WINDOW);
    assert_eq!(rig.sink.presence_windows().len(), 1);
    assert_eq!(rig.sched.next_due(), None);
    assert_eq!(rig.app.presence_state(), PresenceState::Absent);

    // Re-enable: windows resume `interval` after the set; the six pulses
    // from the dormant period are still in the open window.
    rig.app
        .set_param("Presence Interval", "60", rig.now, &mut rig.hw, &mut rig.sched)
        .unwrap();
    let resumed_at = rig.now;
    assert_eq!(
        rig.sched.due_at(TaskId::PresenceWindow),
        Some(resumed_at + 60_000)
    );
    rig.advance_by(60_000);
    assert_eq!(rig.sink.presence_windows(), vec![(false, 0), (true, 6)]);
}

#[test]
fn zero_interval_at_boot_never_evaluates() {
    let mut cfg = NodeConfig::default();
    cfg.presence.window_interval_ms = 0;
    let mut rig = Rig::boot(cfg);

    pulses(&mut rig, 10);
    rig.advance_by(10 * WINDOW);
    assert!(rig.sink.presence_windows().is_empty());
    assert_eq!(rig.sched.next_due(), None);
}

#[test]
fn shortening_interval_replans_from_now() {
    let mut rig = Rig::boot(NodeConfig::default());
    rig.advance_to(30_000);
    rig.app
        .set_param("Presence Interval", "10", rig.now, &mut rig.hw, &mut rig.sched)
        .unwrap();
    assert_eq!(rig.sched.due_at(TaskId::PresenceWindow), Some(40_000));

    rig.advance_to(WINDOW);
    // Fired at 40 s, 50 s, … 120 s; the 120 s firing planned at boot is gone.
    assert_eq!(rig.sink.presence_windows().len(), 9);
}

#[test]
fn inverted_thresholds_resolve_to_present() {
    let mut cfg = NodeConfig::default();
    cfg.presence.enter_threshold = 2;
    cfg.presence.leave_threshold = 3;
    let mut rig = Rig::boot(cfg);

    pulses(&mut rig, 2);
    rig.advance_to(WINDOW);
    assert_eq!(rig.app.presence_state(), PresenceState::Present);

    // Next window: 3 ≤ leave → absent.
    pulses(&mut rig, 3);
    rig.advance_to(2 * WINDOW);
    assert_eq!(rig.app.presence_state(), PresenceState::Absent);
}

#[test]
fn pir_count_publication_is_rate_limited() {
    let mut rig = Rig::boot(NodeConfig::default());
    rig.sink.clear();

    // 1 pulse/s for 90 s with a 60 s minimum interval.
    pulses(&mut rig, 90);
    let counts: Vec<u32> = rig
        .sink
        .published
        .iter()
        .filter_map(|p| match p {
            Publication::PirMotionCount(n) => Some(*n),
            _ => None,
        })
        .collect();
    // Pulse at t=1 s publishes; the next allowed is t=61 s (pulse 61).
    assert_eq!(counts, vec![1, 61]);
}

#[test]
fn pir_count_publication_disabled_by_zero_interval() {
    let mut cfg = NodeConfig::default();
    cfg.pir_publish_min_interval_ms = 0;
    let mut rig = Rig::boot(cfg);

    pulses(&mut rig, 20);
    assert_eq!(
        rig.sink
            .count_where(|p| matches!(p, Publication::PirMotionCount(_))),
        0
    );
    assert_eq!(rig.app.pir_event_count(), 20);
}
