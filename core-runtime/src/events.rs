//! # Event Bus System
//!
//! Broadcasts sync lifecycle events over `tokio::sync::broadcast` so hosts
//! can observe batches without coupling to the engine.
//!
//! ## Overview
//!
//! ```text
//! ┌────────────┐   emit    ┌───────────┐   subscribe   ┌────────────┐
//! │ Sync queue ├──────────>│ EventBus  ├──────────────>│ Subscriber │
//! └────────────┘           └───────────┘               └────────────┘
//! ```
//!
//! Emitting never blocks and never fails the emitter: callers use
//! `emit(...).ok()` because a bus without subscribers is normal.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut events = bus.subscribe();
//!
//! bus.emit(CoreEvent::Sync(SyncEvent::BatchQueued {
//!     job_id: "job-1".to_string(),
//!     usernames: vec!["alice".to_string()],
//! }))
//! .ok();
//!
//! let event = events.recv().await.unwrap();
//! assert_eq!(event.description(), "Sync batch queued");
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, SendError},
};

pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Sync(SyncEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Sync(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Sync(SyncEvent::UserCompleted {
                succeeded: false, ..
            }) => EventSeverity::Warning,
            CoreEvent::Sync(SyncEvent::BatchCompleted { failed, .. }) if *failed > 0 => {
                EventSeverity::Warning
            }
            CoreEvent::Sync(SyncEvent::BatchRejected { .. }) => EventSeverity::Error,
            CoreEvent::Sync(SyncEvent::BatchQueued { .. }) => EventSeverity::Debug,
            _ => EventSeverity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Lifecycle of a sync batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// Batch accepted onto the queue.
    BatchQueued {
        job_id: String,
        usernames: Vec<String>,
    },
    /// The worker picked the batch up.
    BatchStarted { job_id: String, user_count: usize },
    /// One user finished, successfully or not.
    UserCompleted {
        job_id: String,
        username: String,
        succeeded: bool,
        total_films: usize,
        matched_count: usize,
        added_count: usize,
        unmatched_count: usize,
        error_message: Option<String>,
    },
    /// Every user of the batch was attempted.
    BatchCompleted {
        job_id: String,
        attempted: usize,
        succeeded: usize,
        failed: usize,
        duration_ms: u64,
    },
    /// The batch could not run at all (e.g. sync is not configured).
    BatchRejected { job_id: String, reason: String },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::BatchQueued { .. } => "Sync batch queued",
            SyncEvent::BatchStarted { .. } => "Sync batch started",
            SyncEvent::UserCompleted { .. } => "User sync finished",
            SyncEvent::BatchCompleted { .. } => "Sync batch completed",
            SyncEvent::BatchRejected { .. } => "Sync batch rejected",
        }
    }

    pub fn job_id(&self) -> &str {
        match self {
            SyncEvent::BatchQueued { job_id, .. }
            | SyncEvent::BatchStarted { job_id, .. }
            | SyncEvent::UserCompleted { job_id, .. }
            | SyncEvent::BatchCompleted { job_id, .. }
            | SyncEvent::BatchRejected { job_id, .. } => job_id,
        }
    }
}

/// Broadcast channel shared by everything that emits or observes events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    /// Slower subscribers receive `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Returns the number of subscribers reached, or an
    /// error when there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Receive the next sync event for `job_id`, skipping unrelated events.
pub async fn next_for_job(
    receiver: &mut Receiver<CoreEvent>,
    job_id: &str,
) -> Result<SyncEvent, RecvError> {
    loop {
        let CoreEvent::Sync(event) = receiver.recv().await?;
        if event.job_id() == job_id {
            return Ok(event);
        }
    }
}
