//! Relative timer table.
//!
//! Stands in for the cooperative scheduler of the node: a task is planned
//! "N ms from now", fires once, and must re-plan itself if it wants to run
//! again.  When a task comes due the scheduler notifies a
//! [`SchedulerDelegate`]; the main loop implements the delegate to push
//! events into the ISR queue.
//!
//! ```text
//!  AppService ──plan_relative()──▶ ┌───────────┐
//!                                  │ Scheduler │──poll(now)──▶ SchedulerDelegate
//!  main loop  ──────poll()───────▶ └───────────┘                 (event queue)
//! ```
//!
//! Deadlines are stored as absolute ticks computed from the caller's
//! `now`; there is no wall-clock time anywhere.

use crate::app::ports::{SchedulerDelegate, TimerPort};
use crate::gate::Tick;
use log::{debug, warn};

/// Delay before a refused task is offered to the delegate again.
pub const RETRY_DELAY_MS: Tick = 100;

// ═══════════════════════════════════════════════════════════════
//  Task identity
// ═══════════════════════════════════════════════════════════════

/// Tasks that can be planned on the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskId {
    /// Presence detector window boundary.
    PresenceWindow = 0,
}

impl TaskId {
    /// Total number of tasks, sizes the slot table.
    pub const COUNT: usize = 1;

    pub const ALL: [TaskId; Self::COUNT] = [TaskId::PresenceWindow];

    pub const fn label(self) -> &'static str {
        match self {
            Self::PresenceWindow => "presence-window",
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// One-shot relative timers, one slot per [`TaskId`].
#[derive(Debug, Default)]
pub struct Scheduler {
    /// Absolute due tick per task, `None` when not planned.
    due: [Option<Tick>; TaskId::COUNT],
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every task whose deadline has passed.
    ///
    /// A fired task is removed from the table before the delegate runs,
    /// so the delegate (or whoever it hands off to) may re-plan it.  A task
    /// the delegate refuses is planned again `RETRY_DELAY_MS` later.
    pub fn poll(&mut self, now: Tick, delegate: &mut dyn SchedulerDelegate) {
        for task in TaskId::ALL {
            let slot = &mut self.due[task as usize];
            if slot.is_some_and(|due| now >= due) {
                *slot = None;
                debug!("Scheduler: '{}' due at {}", task.label(), now);
                if !delegate.on_task_due(task, now) {
                    warn!("Scheduler: '{}' refused, retry in {} ms", task.label(), RETRY_DELAY_MS);
                    self.plan_relative(task, now, RETRY_DELAY_MS);
                }
            }
        }
    }

    /// Deadline of `task`, if planned.
    pub fn due_at(&self, task: TaskId) -> Option<Tick> {
        self.due[task as usize]
    }

    /// Earliest deadline across all tasks.
    pub fn next_due(&self) -> Option<Tick> {
        self.due.iter().flatten().copied().min()
    }
}

impl TimerPort for Scheduler {
    fn plan_relative(&mut self, task: TaskId, now: Tick, delay_ms: Tick) {
        let due = now.saturating_add(delay_ms);
        debug!("Scheduler: '{}' planned for {} (+{} ms)", task.label(), due, delay_ms);
        self.due[task as usize] = Some(due);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
