//! # List Reconciler
//!
//! Makes the user's catalog list contain exactly the matched films, in order.
//!
//! ## Steps
//!
//! 1. Look up `"{username}'s Top Rated Movies"` among the account's lists
//! 2. Create it with a fixed description when it does not exist
//! 3. Clear it, even when it was just created
//! 4. Add every id with one batch call, skipped when there is nothing to add
//!
//! Any failure aborts the remaining steps and propagates as
//! [`SyncError::Catalog`]. Re-running with the same ids leaves the list in the
//! same state.

use bridge_traits::{CatalogId, CatalogLists};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::{Result, SyncError};
use crate::outcome::ReconcileResult;

/// Name of the list owned by `username`.
pub fn list_name(username: &str) -> String {
    format!("{}'s Top Rated Movies", username)
}

/// Description given to newly created lists.
pub fn list_description(username: &str) -> String {
    format!(
        "Top-rated and liked movies from Letterboxd user {}, automatically synced",
        username
    )
}

pub struct ListReconciler {
    lists: Arc<dyn CatalogLists>,
}

impl ListReconciler {
    pub fn new(lists: Arc<dyn CatalogLists>) -> Self {
        Self { lists }
    }

    #[instrument(skip(self, ids), fields(item_count = ids.len()))]
    pub async fn reconcile(&self, username: &str, ids: &[CatalogId]) -> Result<ReconcileResult> {
        let name = list_name(username);

        let list_id = match self
            .lists
            .find_list_by_name(&name)
            .await
            .map_err(SyncError::Catalog)?
        {
            Some(existing) => {
                debug!(list_id = %existing, "Found existing list");
                existing
            }
            None => {
                let created = self
                    .lists
                    .create_list(&name, &list_description(username))
                    .await
                    .map_err(SyncError::Catalog)?;
                info!(list_id = %created, list_name = %name, "Created list");
                created
            }
        };

        self.lists
            .clear_list(list_id)
            .await
            .map_err(SyncError::Catalog)?;

        let added = if ids.is_empty() {
            debug!(list_id = %list_id, "No matched films, list left empty");
            0
        } else {
            self.lists
                .add_items(list_id, ids)
                .await
                .map_err(SyncError::Catalog)?
        };

        if added < ids.len() {
            debug!(
                list_id = %list_id,
                requested = ids.len(),
                added,
                "Catalog accepted fewer items than requested"
            );
        }

        Ok(ReconcileResult { list_id, added })
    }
}
