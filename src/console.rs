//! Console command inbox.
//!
//! The diagnostic console (UART line reader and command parser) lives
//! outside this crate and runs in its own task.  It hands each parsed
//! command to [`submit_command`]; the main loop drains the inbox with
//! [`take_command`] and runs the command through
//! [`AppService::handle_console`](crate::app::service::AppService::handle_console).
//!
//! ```text
//!  UART task ──submit_command()──▶ ┌─────────┐ ──take_command()──▶ main loop
//!                                  │  inbox  │
//!                                  └─────────┘
//! ```
//!
//! The inbox copies names and values into fixed buffers, so the console
//! task can reuse its line buffer as soon as `submit` returns.

use std::sync::{Mutex, MutexGuard};

use heapless::{Deque, String};
use log::warn;

use crate::app::commands::ConsoleCommand;

/// Longest accepted parameter name.
pub const NAME_CAP: usize = 40;
/// Longest accepted value text.
pub const VALUE_CAP: usize = 16;
/// Commands held while the loop is busy.
const INBOX_DEPTH: usize = 4;

/// Owned copy of a [`ConsoleCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingCommand {
    ListConfig,
    SetConfig {
        name: String<NAME_CAP>,
        value: String<VALUE_CAP>,
    },
    FactoryReset,
    Store,
}

impl PendingCommand {
    /// `None` when the name or value does not fit its buffer.
    pub fn copy_of(cmd: &ConsoleCommand<'_>) -> Option<Self> {
        Some(match *cmd {
            ConsoleCommand::ListConfig => Self::ListConfig,
            ConsoleCommand::SetConfig { name, value } => Self::SetConfig {
                name: String::try_from(name).ok()?,
                value: String::try_from(value).ok()?,
            },
            ConsoleCommand::FactoryReset => Self::FactoryReset,
            ConsoleCommand::Store => Self::Store,
        })
    }

    pub fn as_command(&self) -> ConsoleCommand<'_> {
        match self {
            Self::ListConfig => ConsoleCommand::ListConfig,
            Self::SetConfig { name, value } => ConsoleCommand::SetConfig {
                name: name.as_str(),
                value: value.as_str(),
            },
            Self::FactoryReset => ConsoleCommand::FactoryReset,
            Self::Store => ConsoleCommand::Store,
        }
    }
}

/// FIFO of commands between the console task and the main loop.
// The console task is a regular task, not an ISR, so a std Mutex is safe.
pub struct ConsoleInbox {
    pending: Mutex<Deque<PendingCommand, INBOX_DEPTH>>,
}

impl ConsoleInbox {
    pub const fn new() -> Self {
        Self { pending: Mutex::new(Deque::new()) }
    }

    /// Queue a command.  Returns `false` when it was too long or the inbox
    /// is full; the console should answer with an error.
    pub fn submit(&self, cmd: ConsoleCommand<'_>) -> bool {
        let Some(owned) = PendingCommand::copy_of(&cmd) else {
            warn!("Console: command exceeds buffer, rejected");
            return false;
        };
        if self.lock().push_back(owned).is_err() {
            warn!("Console: inbox full, command rejected");
            return false;
        }
        true
    }

    pub fn take(&self) -> Option<PendingCommand> {
        self.lock().pop_front()
    }

    fn lock(&self) -> MutexGuard<'_, Deque<PendingCommand, INBOX_DEPTH>> {
        // A panic while holding the lock cannot leave the deque torn.
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ConsoleInbox {
    fn default() -> Self {
        Self::new()
    }
}

static INBOX: ConsoleInbox = ConsoleInbox::new();

/// Console task entry point.
pub fn submit_command(cmd: ConsoleCommand<'_>) -> bool {
    INBOX.submit(cmd)
}

/// Next command for the main loop, if any.
pub fn take_command() -> Option<PendingCommand> {
    INBOX.take()
}
