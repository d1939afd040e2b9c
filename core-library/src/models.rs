//! Domain models for tracker users and their films
//!
//! Raw adapter output ([`SourceFilm`], [`WatchlistEntry`], [`SourceProfile`])
//! is converted here into the shapes the sync engine and the API work with.

use bridge_traits::source::{ProfileStats, SourceFilm, SourceProfile, WatchlistEntry};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LibraryError, Result};

const TRACKER_BASE_URL: &str = "https://letterboxd.com";

pub const USERNAME_MAX_LEN: usize = 100;

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid username pattern"));

// =============================================================================
// Username
// =============================================================================

/// A validated tracker username, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and normalize a raw username.
    ///
    /// Accepts 1 to 100 characters from `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(LibraryError::invalid(
                "username",
                "Username cannot be empty or whitespace",
            ));
        }
        if raw.chars().count() > USERNAME_MAX_LEN {
            return Err(LibraryError::invalid(
                "username",
                format!("Username must be at most {} characters", USERNAME_MAX_LEN),
            ));
        }
        if !USERNAME_PATTERN.is_match(raw) {
            return Err(LibraryError::invalid(
                "username",
                "Username may only contain letters, digits, '_' and '-'",
            ));
        }
        Ok(Self(raw.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public profile URL on the tracker.
    pub fn profile_url(&self) -> String {
        format!("{}/{}/", TRACKER_BASE_URL, self.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = LibraryError;

    fn try_from(value: String) -> Result<Self> {
        Username::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Public URL of a film page on the tracker.
pub fn film_url(slug: &str) -> String {
    format!("{}/film/{}/", TRACKER_BASE_URL, slug)
}

// =============================================================================
// Films
// =============================================================================

/// An eligible film (rated and liked) with its rating on the five-star scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedFilm {
    pub title: String,
    pub slug: String,
    #[serde(rename = "year")]
    pub release_year: Option<i32>,
    #[serde(skip)]
    pub rating_units: u8,
    /// `rating_units / 2`, between 0.5 and 5.0
    #[serde(rename = "rating")]
    pub rating_stars: f32,
    pub url: String,
}

impl RatedFilm {
    /// Convert a tracker film, returning `None` unless it is rated and liked.
    pub fn from_source(film: SourceFilm) -> Option<Self> {
        if !film.is_eligible() {
            return None;
        }
        let units = film.rating_units?;

        Some(Self {
            url: film_url(&film.slug),
            title: film.title,
            slug: film.slug,
            release_year: film.release_year,
            rating_units: units,
            rating_stars: f32::from(units) / 2.0,
        })
    }

    /// Filter and convert a batch of tracker films, keeping their order.
    pub fn collect_eligible(films: impl IntoIterator<Item = SourceFilm>) -> Vec<Self> {
        films.into_iter().filter_map(Self::from_source).collect()
    }

    /// `"Title (Year)"`, or just the title when the year is unknown.
    pub fn display_label(&self) -> String {
        match self.release_year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

/// A watchlist entry as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchlistFilm {
    pub title: String,
    #[serde(rename = "year")]
    pub release_year: Option<i32>,
    pub url: String,
}

impl From<WatchlistEntry> for WatchlistFilm {
    fn from(entry: WatchlistEntry) -> Self {
        Self {
            url: film_url(&entry.slug),
            title: entry.title,
            release_year: entry.release_year,
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub stats: ProfileStats,
    pub url: String,
}

impl UserProfile {
    pub fn from_source(username: &Username, profile: SourceProfile) -> Self {
        Self {
            username: username.to_string(),
            display_name: profile
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| username.to_string()),
            bio: profile.bio.filter(|bio| !bio.trim().is_empty()),
            stats: profile.stats,
            url: username.profile_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(title: &str, rating_units: Option<u8>, liked: bool) -> SourceFilm {
        SourceFilm {
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            release_year: Some(2001),
            rating_units,
            liked,
        }
    }

    #[test]
    fn test_username_validation() {
        assert_eq!(Username::parse("Alice_99").unwrap().as_str(), "alice_99");
        assert!(Username::parse("dave-k").is_ok());
        assert!(Username::parse("").is_err());
        assert!(Username::parse("   ").is_err());
        assert!(Username::parse("bad name").is_err());
        assert!(Username::parse("semi;colon").is_err());
        assert!(Username::parse(&"a".repeat(100)).is_ok());
        assert!(Username::parse(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_username_deserializes_with_validation() {
        let ok: Username = serde_json::from_str("\"Bob\"").unwrap();
        assert_eq!(ok.as_str(), "bob");
        assert!(serde_json::from_str::<Username>("\"no/slash\"").is_err());
    }

    #[test]
    fn test_rating_conversion_covers_full_scale() {
        for units in 1..=10u8 {
            let film = RatedFilm::from_source(source("Heat", Some(units), true)).unwrap();
            assert_eq!(film.rating_stars, units as f32 / 2.0);
        }
    }

    #[test]
    fn test_filter_keeps_only_rated_and_liked() {
        let films = vec![
            source("Rated Liked", Some(8), true),
            source("Rated Only", Some(9), false),
            source("Liked Only", None, true),
            source("Zero Rating", Some(0), true),
            source("Neither", None, false),
        ];

        let eligible = RatedFilm::collect_eligible(films);

        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].title, "Rated Liked");
        assert_eq!(eligible[0].rating_stars, 4.0);
        assert_eq!(eligible[0].url, "https://letterboxd.com/film/rated-liked/");
    }

    #[test]
    fn test_display_label() {
        let mut film = RatedFilm::from_source(source("Heat", Some(10), true)).unwrap();
        assert_eq!(film.display_label(), "Heat (2001)");
        film.release_year = None;
        assert_eq!(film.display_label(), "Heat");
    }

    #[test]
    fn test_rated_film_serializes_public_fields() {
        let film = RatedFilm::from_source(source("Heat", Some(9), true)).unwrap();
        let json = serde_json::to_value(&film).unwrap();

        assert_eq!(json["rating"], 4.5);
        assert_eq!(json["year"], 2001);
        assert!(json.get("rating_units").is_none());
    }

    #[test]
    fn test_profile_falls_back_to_username() {
        let username = Username::parse("alice").unwrap();
        let profile = UserProfile::from_source(
            &username,
            SourceProfile {
                username: "alice".to_string(),
                display_name: None,
                bio: Some("  ".to_string()),
                stats: ProfileStats::default(),
            },
        );

        assert_eq!(profile.display_name, "alice");
        assert_eq!(profile.bio, None);
        assert_eq!(profile.url, "https://letterboxd.com/alice/");
    }
}
