//! TMDb catalog provider
//!
//! Implements the `CatalogSearch` and `CatalogLists` bridge traits against
//! The Movie Database:
//! - Movie search by title and year (v3, API key)
//! - Discovery, creation, clearing and batch filling of account lists (v4,
//!   user access token)
//!
//! Every request goes through a shared rate limiter so a long sync stays
//! under TMDb's request quota.

mod client;
mod error;
mod types;

pub use client::{TmdbClient, TmdbCredentials, DEFAULT_RATE_LIMIT};
pub use error::{Result, TmdbError};
