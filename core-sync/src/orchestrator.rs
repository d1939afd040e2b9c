//! # Per-User Orchestrator
//!
//! Runs one user's sync end to end:
//!
//! ```text
//! fetch films ─> keep rated+liked ─> sort ─> truncate ─> resolve each ─> reconcile list
//! ```
//!
//! [`UserSyncOrchestrator::sync_user`] never fails. Source and catalog errors
//! are folded into a [`SyncOutcome`] with `succeeded = false` so the batch can
//! carry on with the next user.

use bridge_traits::{CatalogId, FilmSource};
use core_library::{select_top, RatedFilm, SortField, SortOrder};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::outcome::{CatalogMatch, SyncOutcome};
use crate::reconciler::ListReconciler;
use crate::resolver::MatchResolver;

/// How many films to sync and in which order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub limit: usize,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            sort_by: SortField::Rating,
            sort_order: SortOrder::Desc,
        }
    }
}

pub struct UserSyncOrchestrator {
    source: Arc<dyn FilmSource>,
    resolver: MatchResolver,
    reconciler: ListReconciler,
    options: SyncOptions,
}

impl UserSyncOrchestrator {
    pub fn new(
        source: Arc<dyn FilmSource>,
        resolver: MatchResolver,
        reconciler: ListReconciler,
        options: SyncOptions,
    ) -> Self {
        Self {
            source,
            resolver,
            reconciler,
            options,
        }
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    #[instrument(skip(self), fields(limit = self.options.limit))]
    pub async fn sync_user(&self, username: &str) -> SyncOutcome {
        match self.try_sync_user(username).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "User sync failed");
                SyncOutcome::failed(username, e.to_string())
            }
        }
    }

    async fn try_sync_user(&self, username: &str) -> Result<SyncOutcome> {
        let films = self
            .source
            .fetch_rated_and_liked_films(username)
            .await
            .map_err(SyncError::Source)?;
        let fetched = films.len();

        let eligible = RatedFilm::collect_eligible(films);
        let selected = select_top(
            eligible,
            self.options.sort_by,
            self.options.sort_order,
            self.options.limit,
        );
        info!(
            fetched,
            selected = selected.len(),
            sort_by = %self.options.sort_by,
            sort_order = %self.options.sort_order,
            "Selected films to sync"
        );

        let mut matched: Vec<CatalogId> = Vec::with_capacity(selected.len());
        let mut unmatched_titles = Vec::new();

        for film in &selected {
            match self.resolver.resolve(&film.title, film.release_year).await {
                CatalogMatch::Matched { catalog_id } => matched.push(catalog_id),
                CatalogMatch::Unmatched { reason } => {
                    debug!(title = %film.title, %reason, "Film not matched");
                    unmatched_titles.push(film.display_label());
                }
            }
        }

        let reconciled = self.reconciler.reconcile(username, &matched).await?;

        Ok(SyncOutcome {
            username: username.to_string(),
            total_films: selected.len(),
            matched_count: matched.len(),
            added_count: reconciled.added,
            unmatched_titles,
            list_id: Some(reconciled.list_id),
            succeeded: true,
            error_message: None,
        })
    }
}
