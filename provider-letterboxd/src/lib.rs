//! # Letterboxd Provider
//!
//! Implements the `FilmSource` bridge trait by reading Letterboxd's public
//! pages:
//! - `/{user}/films/page/{n}/` for ratings and likes
//! - `/{user}/watchlist/page/{n}/` for the watchlist
//! - `/{user}/` for the profile
//!
//! A missing user (HTTP 404 on the first page) is reported as
//! `BridgeError::UserNotFound`; every other failure as
//! `BridgeError::SourceUnavailable`.

mod client;
mod error;
pub mod parser;

pub use client::{LetterboxdClient, DEFAULT_MAX_PAGES};
pub use error::{LetterboxdError, Result};
