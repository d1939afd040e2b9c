//! Result types produced by a sync run.

use bridge_traits::{CatalogId, ListId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::job::SyncJobId;

/// Why a film could not be matched in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// The search succeeded but returned no candidates.
    NoResults,
    /// The search call itself failed.
    SearchError(String),
    /// The title was unusable, so no search was made.
    InvalidInput(String),
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::NoResults => f.write_str("no results"),
            UnmatchedReason::SearchError(message) => write!(f, "search error: {}", message),
            UnmatchedReason::InvalidInput(message) => write!(f, "invalid input: {}", message),
        }
    }
}

/// Outcome of resolving one film against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogMatch {
    Matched { catalog_id: CatalogId },
    Unmatched { reason: UnmatchedReason },
}

impl CatalogMatch {
    pub fn catalog_id(&self) -> Option<CatalogId> {
        match self {
            CatalogMatch::Matched { catalog_id } => Some(*catalog_id),
            CatalogMatch::Unmatched { .. } => None,
        }
    }
}

/// Result of a successful list reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileResult {
    pub list_id: ListId,
    /// Items the catalog reported as added
    pub added: usize,
}

/// Result of syncing one user. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub username: String,
    /// Films considered after sorting and truncation
    pub total_films: usize,
    pub matched_count: usize,
    /// As reported by the catalog, which may be lower than `matched_count`
    pub added_count: usize,
    /// `"Title (Year)"` labels in processing order
    pub unmatched_titles: Vec<String>,
    pub list_id: Option<ListId>,
    pub succeeded: bool,
    pub error_message: Option<String>,
}

impl SyncOutcome {
    /// Failed outcome for a user whose sync stopped before completing.
    pub fn failed(username: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            total_films: 0,
            matched_count: 0,
            added_count: 0,
            unmatched_titles: Vec::new(),
            list_id: None,
            succeeded: false,
            error_message: Some(error_message.into()),
        }
    }
}

/// Aggregate result of one batch, outcomes in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSyncReport {
    pub job_id: SyncJobId,
    pub outcomes: Vec<SyncOutcome>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSyncReport {
    pub fn new(
        job_id: SyncJobId,
        outcomes: Vec<SyncOutcome>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        Self {
            job_id,
            attempted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
            started_at,
            finished_at,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}
