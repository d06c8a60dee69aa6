//! Outbound message capability handed to a device
//!
//! A device only ever needs to push finished message strings towards the
//! transport; it never holds the transport itself.

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Sink for outbound wire messages
pub trait Publisher: Send + Sync {
    fn publish(&self, message: &str);
}

impl Publisher for mpsc::UnboundedSender<String> {
    fn publish(&self, message: &str) {
        if self.send(message.to_string()).is_err() {
            debug!("Outbound channel closed, dropping message");
        }
    }
}

/// Discards every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn publish(&self, message: &str) {
        trace!(len = message.len(), "Discarding outbound message");
    }
}

/// Keeps every published message; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages published so far
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drain the recorded messages
    pub fn take(&self) -> Vec<String> {
        std::mem::take(
            &mut *self
                .messages
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}
