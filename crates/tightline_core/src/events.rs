//! Outbound notification queue.
//!
//! Catch/escape/feeding/migration events are pushed here once per
//! occurrence and drained by the scoring and display collaborators,
//! decoupling the core from collaborator lifecycles.

use std::collections::VecDeque;
use tightline_data::SimEvent;

/// FIFO queue of discrete simulation events.
#[derive(Default)]
pub struct EventQueue {
    queue: VecDeque<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        tracing::debug!(?event, "event emitted");
        self.queue.push_back(event);
    }

    /// Removes and returns every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// RFC 3339 wall-clock stamp for event payloads.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
