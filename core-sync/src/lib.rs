//! # Sync Engine Module
//!
//! Mirrors a film tracker user's rated-and-liked films into a list on the
//! movie catalog.
//!
//! ## Overview
//!
//! ```text
//! SyncQueue ─> BatchSyncCoordinator ─> UserSyncOrchestrator ─┬─> MatchResolver ─> CatalogSearch
//!                 (per-user lock)                           └─> ListReconciler ─> CatalogLists
//! ```
//!
//! ## Components
//!
//! - **Match Resolver** (`resolver`): title and year to catalog id, first hit wins
//! - **List Reconciler** (`reconciler`): find or create the list, clear it, batch-add
//! - **Per-User Orchestrator** (`orchestrator`): fetch, filter, sort, truncate, resolve, reconcile
//! - **Batch Coordinator** (`coordinator`): sequential users with failure isolation
//! - **User Locks** (`lock`): one sync per username at a time
//! - **Sync Queue** (`queue`): background worker fed by the trigger and the scheduler

pub mod coordinator;
pub mod error;
pub mod job;
pub mod lock;
pub mod orchestrator;
pub mod outcome;
pub mod queue;
pub mod reconciler;
pub mod resolver;

pub use coordinator::BatchSyncCoordinator;
pub use error::{Result, SyncError};
pub use job::SyncJobId;
pub use lock::{UserLockGuard, UserLocks};
pub use orchestrator::{SyncOptions, UserSyncOrchestrator};
pub use outcome::{BatchSyncReport, CatalogMatch, ReconcileResult, SyncOutcome, UnmatchedReason};
pub use queue::{SyncQueue, SyncTicket, DEFAULT_QUEUE_CAPACITY};
pub use reconciler::{list_description, list_name, ListReconciler};
pub use resolver::MatchResolver;
