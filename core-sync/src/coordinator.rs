//! # Batch Coordinator
//!
//! Syncs a list of users one after another and aggregates their outcomes.
//!
//! ## Overview
//!
//! - Users run strictly in input order, never concurrently, which keeps the
//!   catalog rate limit meaningful.
//! - A failing user is recorded and the batch continues. A panic inside one
//!   user's sync is caught at the task boundary and recorded the same way.
//! - Each user's sync holds that username's lock, so a second batch naming
//!   the same user waits instead of racing on the list.
//! - Progress is published on the [`EventBus`] and summarised in the logs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let report = coordinator
//!     .sync_users(&["alice".to_string(), "bob".to_string()])
//!     .await;
//! assert_eq!(report.attempted, 2);
//! ```

use bridge_traits::Clock;
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::job::SyncJobId;
use crate::lock::UserLocks;
use crate::orchestrator::UserSyncOrchestrator;
use crate::outcome::{BatchSyncReport, SyncOutcome};

/// How many unmatched titles are spelled out in the per-user summary.
const UNMATCHED_PREVIEW: usize = 5;

pub struct BatchSyncCoordinator {
    orchestrator: Arc<UserSyncOrchestrator>,
    locks: UserLocks,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
}

impl BatchSyncCoordinator {
    pub fn new(
        orchestrator: Arc<UserSyncOrchestrator>,
        event_bus: EventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orchestrator,
            locks: UserLocks::new(),
            event_bus,
            clock,
        }
    }

    /// Share a lock registry with other coordinators.
    pub fn with_locks(mut self, locks: UserLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn locks(&self) -> &UserLocks {
        &self.locks
    }

    /// Sync `usernames` under a fresh job id.
    pub async fn sync_users(&self, usernames: &[String]) -> BatchSyncReport {
        self.run_batch(SyncJobId::new(), usernames).await
    }

    #[instrument(skip(self, usernames), fields(job_id = %job_id, user_count = usernames.len()))]
    pub async fn run_batch(&self, job_id: SyncJobId, usernames: &[String]) -> BatchSyncReport {
        let started_at = self.clock.now();
        info!(usernames = ?usernames, "Starting sync batch");

        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::BatchStarted {
                job_id: job_id.to_string(),
                user_count: usernames.len(),
            }))
            .ok();

        let mut outcomes = Vec::with_capacity(usernames.len());
        for username in usernames {
            let outcome = self.sync_one(username).await;
            log_outcome(&outcome);

            self.event_bus
                .emit(CoreEvent::Sync(SyncEvent::UserCompleted {
                    job_id: job_id.to_string(),
                    username: outcome.username.clone(),
                    succeeded: outcome.succeeded,
                    total_films: outcome.total_films,
                    matched_count: outcome.matched_count,
                    added_count: outcome.added_count,
                    unmatched_count: outcome.unmatched_titles.len(),
                    error_message: outcome.error_message.clone(),
                }))
                .ok();

            outcomes.push(outcome);
        }

        let report = BatchSyncReport::new(job_id, outcomes, started_at, self.clock.now());
        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            duration_ms = report.duration_ms(),
            "Sync batch completed"
        );

        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::BatchCompleted {
                job_id: job_id.to_string(),
                attempted: report.attempted,
                succeeded: report.succeeded,
                failed: report.failed,
                duration_ms: report.duration_ms(),
            }))
            .ok();

        report
    }

    async fn sync_one(&self, username: &str) -> SyncOutcome {
        let _guard = self.locks.acquire(username).await;

        let orchestrator = Arc::clone(&self.orchestrator);
        let name = username.to_string();
        let task = tokio::spawn(async move { orchestrator.sync_user(&name).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                error!(username, error = %join_error, "User sync task aborted");
                SyncOutcome::failed(username, format!("sync task aborted: {}", join_error))
            }
        }
    }
}

fn log_outcome(outcome: &SyncOutcome) {
    if !outcome.succeeded {
        warn!(
            username = %outcome.username,
            error = outcome.error_message.as_deref().unwrap_or("unknown error"),
            "Sync failed for user"
        );
        return;
    }

    info!(
        username = %outcome.username,
        total = outcome.total_films,
        matched = outcome.matched_count,
        added = outcome.added_count,
        not_matched = outcome.unmatched_titles.len(),
        "Sync finished for user"
    );

    if !outcome.unmatched_titles.is_empty() {
        info!(
            username = %outcome.username,
            "Unmatched films: {}",
            unmatched_preview(&outcome.unmatched_titles)
        );
    }
}

/// First few unmatched labels, with a count of the rest.
fn unmatched_preview(titles: &[String]) -> String {
    let shown = titles
        .iter()
        .take(UNMATCHED_PREVIEW)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    match titles.len().saturating_sub(UNMATCHED_PREVIEW) {
        0 => shown,
        rest => format!("{} ... and {} more", shown, rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_preview_truncates() {
        let titles: Vec<String> = (1..=7).map(|i| format!("Film {}", i)).collect();
        assert_eq!(
            unmatched_preview(&titles),
            "Film 1, Film 2, Film 3, Film 4, Film 5 ... and 2 more"
        );
        assert_eq!(unmatched_preview(&titles[..2]), "Film 1, Film 2");
    }
}
