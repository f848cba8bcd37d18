//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every publication to the ESP-IDF
//! logger (UART / USB-CDC in production) as `topic payload`, with the
//! payload rendered as JSON the way a radio gateway would forward it.

use log::{info, warn};

use crate::app::events::Publication;
use crate::app::ports::EventSink;

/// Adapter that logs every [`Publication`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    published: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publications written since boot.
    pub fn published(&self) -> u32 {
        self.published
    }
}

impl EventSink for LogEventSink {
    fn publish(&mut self, publication: &Publication) {
        let topic = publication.topic();
        match serde_json::to_string(&publication.payload()) {
            Ok(payload) => info!("PUB | {} {}", topic, payload),
            Err(e) => warn!("PUB | {} <unencodable payload: {}>", topic, e),
        }
        self.published = self.published.wrapping_add(1);
    }
}
