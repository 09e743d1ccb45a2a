//! Event system for progress tracking
//!
//! In-process event bus distributing progress events to subscribers
//! without blocking operations. Uses `tokio::sync::broadcast`, so events
//! are dropped immediately when no subscribers exist and lagging
//! subscribers never block emitters.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::PostingOutcome;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Progress events emitted by the services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    GenerationStarted {
        content_id: String,
        topic: String,
    },
    GenerationCompleted {
        content_id: String,
    },
    GenerationFailed {
        content_id: String,
        error: String,
    },
    PostingStarted {
        content_id: String,
        platforms: Vec<String>,
    },
    PostingCompleted {
        content_id: String,
        outcomes: Vec<PostingOutcome>,
    },
    PostingFailed {
        content_id: String,
        error: String,
    },
}

/// Event bus for distributing progress events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the specified per-subscriber capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Non-blocking. A send error only means nobody is listening.
    pub fn emit(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}
