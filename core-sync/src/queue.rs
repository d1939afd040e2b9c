//! # Sync Queue
//!
//! Accepts sync batches from any caller and runs them on a single background
//! worker, one batch at a time.
//!
//! ## Overview
//!
//! - [`SyncQueue::enqueue`] returns immediately with a [`SyncTicket`]; the
//!   HTTP trigger and the scheduler never wait for a batch to finish.
//! - Batches run in submission order. Because there is one worker, two
//!   batches never sync concurrently.
//! - Cancelling the token stops the worker between batches. A batch already
//!   running is allowed to finish.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let (queue, worker) = SyncQueue::start(coordinator, event_bus, shutdown.clone());
//! let ticket = queue.enqueue(vec!["alice".to_string()]).await?;
//! let report = ticket.completion.await?;
//! ```

use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::coordinator::BatchSyncCoordinator;
use crate::error::{Result, SyncError};
use crate::job::SyncJobId;
use crate::outcome::BatchSyncReport;

/// Batches that may wait behind the running one.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

struct QueuedBatch {
    job_id: SyncJobId,
    usernames: Vec<String>,
    completion: oneshot::Sender<BatchSyncReport>,
}

/// Handle returned for an accepted batch.
#[derive(Debug)]
pub struct SyncTicket {
    pub job_id: SyncJobId,
    /// Usernames exactly as queued
    pub usernames: Vec<String>,
    /// Resolves with the report once the batch has run. Dropping it is fine.
    pub completion: oneshot::Receiver<BatchSyncReport>,
}

#[derive(Clone)]
pub struct SyncQueue {
    sender: mpsc::Sender<QueuedBatch>,
    event_bus: EventBus,
}

impl SyncQueue {
    /// Spawn the worker and return the queue handle with the worker's join
    /// handle.
    pub fn start(
        coordinator: Arc<BatchSyncCoordinator>,
        event_bus: EventBus,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        Self::with_capacity(coordinator, event_bus, shutdown, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(
        coordinator: Arc<BatchSyncCoordinator>,
        event_bus: EventBus,
        shutdown: CancellationToken,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(coordinator, receiver, shutdown));
        (Self { sender, event_bus }, worker)
    }

    /// Queue a batch. Fails only when the worker has stopped.
    pub async fn enqueue(&self, usernames: Vec<String>) -> Result<SyncTicket> {
        let job_id = SyncJobId::new();
        let (completion_tx, completion_rx) = oneshot::channel();

        // Reserve first so BatchQueued is always published before BatchStarted.
        let permit = self
            .sender
            .reserve()
            .await
            .map_err(|_| SyncError::QueueClosed)?;

        debug!(job_id = %job_id, user_count = usernames.len(), "Sync batch queued");
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::BatchQueued {
                job_id: job_id.to_string(),
                usernames: usernames.clone(),
            }))
            .ok();

        permit.send(QueuedBatch {
            job_id,
            usernames: usernames.clone(),
            completion: completion_tx,
        });

        Ok(SyncTicket {
            job_id,
            usernames,
            completion: completion_rx,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

async fn run_worker(
    coordinator: Arc<BatchSyncCoordinator>,
    mut receiver: mpsc::Receiver<QueuedBatch>,
    shutdown: CancellationToken,
) {
    info!("Sync worker started");

    loop {
        let batch = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = receiver.recv() => match next {
                Some(batch) => batch,
                None => break,
            },
        };

        let report = coordinator.run_batch(batch.job_id, &batch.usernames).await;
        if batch.completion.send(report).is_err() {
            debug!(job_id = %batch.job_id, "Nobody waiting for batch report");
        }
    }

    receiver.close();
    info!("Sync worker stopped");
}
