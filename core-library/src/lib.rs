//! # Film Library Module
//!
//! Domain model shared by the sync engine and the read-only API.
//!
//! ## Overview
//!
//! - [`models`]: validated usernames, eligible films and their five-star
//!   ratings, watchlist entries and profiles
//! - [`query`]: stable sorting and top-N selection
//! - [`pagination`]: limit-then-page slicing with 1-indexed pages

pub mod error;
pub mod models;
pub mod pagination;
pub mod query;

pub use error::{LibraryError, Result};
pub use models::{film_url, RatedFilm, UserProfile, Username, WatchlistFilm};
pub use pagination::{Page, PageRequest};
pub use query::{select_top, sort_films, SortField, SortOrder};
