//! Source tracker capability.
//!
//! The source tracker is the film-logging site users rate and like films on.
//! Only the data the sync engine and the read endpoints need crosses this
//! boundary; page structure and scraping stay inside the adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A film as reported by the source tracker, before eligibility filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilm {
    pub title: String,
    /// Site-specific identifier used to build the film's URL
    pub slug: String,
    pub release_year: Option<i32>,
    /// Rating on the tracker's internal 1-10 scale (half stars)
    pub rating_units: Option<u8>,
    pub liked: bool,
}

impl SourceFilm {
    /// Rated (non-zero) and liked.
    pub fn is_eligible(&self) -> bool {
        matches!(self.rating_units, Some(units) if units > 0) && self.liked
    }
}

/// A film on the user's watchlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub title: String,
    pub slug: String,
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub films_watched: u32,
    pub lists: u32,
    pub following: u32,
    pub followers: u32,
}

/// Public profile details of a tracker user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProfile {
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub stats: ProfileStats,
}

/// Read access to a user's data on the source tracker.
///
/// Errors are [`BridgeError::UserNotFound`](crate::BridgeError::UserNotFound)
/// for unknown usernames and
/// [`BridgeError::SourceUnavailable`](crate::BridgeError::SourceUnavailable)
/// for anything else that prevented the fetch.
#[async_trait]
pub trait FilmSource: Send + Sync {
    /// All films the user both rated and liked. Implementations apply
    /// [`SourceFilm::is_eligible`] before returning.
    async fn fetch_rated_and_liked_films(&self, username: &str) -> Result<Vec<SourceFilm>>;

    async fn fetch_watchlist(&self, username: &str) -> Result<Vec<WatchlistEntry>>;

    async fn fetch_profile(&self, username: &str) -> Result<SourceProfile>;
}
