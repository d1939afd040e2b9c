//! Catalog capabilities.
//!
//! The catalog is the movie database that owns the searchable ids and the
//! per-user lists. Search and list management are separate traits because
//! they use different credentials and fail differently.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Identifier of a movie in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(pub u64);

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user list in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub u64);

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One search hit, in the order the catalog ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCandidate {
    pub catalog_id: CatalogId,
    pub title: String,
    /// Release date as the catalog reports it (`YYYY-MM-DD`), if any
    pub release_date: Option<String>,
}

/// Movie search.
///
/// Failures are reported as
/// [`BridgeError::CatalogUnavailable`](crate::BridgeError::CatalogUnavailable).
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Search by title, narrowed by release year when one is given.
    /// Returns an empty vector when nothing matched.
    async fn search(&self, title: &str, year: Option<i32>) -> Result<Vec<CatalogCandidate>>;
}

/// Management of the lists owned by the configured catalog account.
///
/// Failures are reported as
/// [`BridgeError::PermissionDenied`](crate::BridgeError::PermissionDenied)
/// when credentials are rejected and
/// [`BridgeError::CatalogUnavailable`](crate::BridgeError::CatalogUnavailable)
/// otherwise.
#[async_trait]
pub trait CatalogLists: Send + Sync {
    /// Look up a list by its exact name.
    async fn find_list_by_name(&self, name: &str) -> Result<Option<ListId>>;

    async fn create_list(&self, name: &str, description: &str) -> Result<ListId>;

    /// Remove every item from the list.
    async fn clear_list(&self, list_id: ListId) -> Result<()>;

    /// Add movies in the given order with one batch call. Returns how many
    /// items the catalog reports as added.
    async fn add_items(&self, list_id: ListId, ids: &[CatalogId]) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let candidate = CatalogCandidate {
            catalog_id: CatalogId(949),
            title: "Heat".to_string(),
            release_date: Some("1995-12-15".to_string()),
        };

        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["catalog_id"], 949);
        assert_eq!(ListId(12).to_string(), "12");
    }
}
