//! Motion Detector Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      LogEventSink   NvsAdapter   Esp32Time    │
//! │  (Driver+LED+Face)    (EventSink)    (Config+NVS) (TickSource) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Gates · Presence · Orientation · Console              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) · Event queue · Sample mailboxes  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sensor drivers report through [`events::push_event`] (GPIO) and the
//! `sensors::post_*` mailboxes (sampled values); console commands enter
//! through `console::submit_command`.  This loop is the only consumer.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use motion_detector::adapters::hardware::HardwareAdapter;
use motion_detector::adapters::log_sink::LogEventSink;
use motion_detector::adapters::nvs::NvsAdapter;
use motion_detector::adapters::time::Esp32TimeAdapter;
use motion_detector::app::commands::ConsoleReply;
use motion_detector::app::ports::{ConfigPort, TickSource};
use motion_detector::app::service::AppService;
use motion_detector::config::{CONFIG_SCHEMA_ID, NodeConfig};
use motion_detector::console;
use motion_detector::events::{self, EVENTS, Event, EventQueueDelegate};
use motion_detector::scheduler::Scheduler;
use motion_detector::sensors;

/// Main loop period when idle.
const LOOP_PERIOD_MS: u32 = 10;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Motion Detector v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = NvsAdapter::new()?;
    let config = nvs.load(CONFIG_SCHEMA_ID, &NodeConfig::default());

    // ── 3. Construct adapters ─────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut hw = HardwareAdapter::new();
    hw.init()?;
    let mut log_sink = LogEventSink::new();
    let mut sched = Scheduler::new();
    let mut sched_delegate = EventQueueDelegate::new(&EVENTS);

    // ── 4. Construct app service ──────────────────────────────
    let mut app = AppService::new(config);
    app.start(clock.now_ms(), &mut hw, &mut sched, &mut log_sink);

    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    let mut last_tick = clock.now_ms();
    loop {
        let now = clock.now_ms();

        sched.poll(now, &mut sched_delegate);

        events::drain_events(|event| match sensors::input_for(event) {
            Some(input) => app.handle_input(input, now, &mut hw, &mut nvs, &mut log_sink),
            None => match event {
                Event::PresenceWindow => app.on_presence_window(now, &mut sched, &mut log_sink),
                _ => warn!("Unhandled event {:?}", event),
            },
        });

        while let Some(cmd) = console::take_command() {
            match app.handle_console(cmd.as_command(), now, &mut hw, &mut sched, &mut nvs) {
                Ok(ConsoleReply::Ok) => info!("OK"),
                Ok(ConsoleReply::Config(lines)) => lines.iter().for_each(|line| info!("{}", line)),
                Err(e) => warn!("ERROR: {}", e),
            }
        }

        let elapsed = now.saturating_sub(last_tick);
        hw.tick(u32::try_from(elapsed).unwrap_or(u32::MAX));
        last_tick = now;

        std::thread::sleep(std::time::Duration::from_millis(u64::from(LOOP_PERIOD_MS)));
    }
}
