//! # Bridge Traits
//!
//! Capability traits between the sync engine and the outside world.
//!
//! ## Overview
//!
//! The engine never talks to the source tracker or the catalog directly. Each
//! external system is described by a narrow trait here and implemented by
//! exactly one concrete adapter crate:
//!
//! | Capability | Trait | Adapter |
//! |------------|-------|---------|
//! | Film data of a tracker user | [`FilmSource`](source::FilmSource) | `provider-letterboxd` |
//! | Movie search | [`CatalogSearch`](catalog::CatalogSearch) | `provider-tmdb` |
//! | Per-user list management | [`CatalogLists`](catalog::CatalogLists) | `provider-tmdb` |
//! | Outbound HTTP | [`HttpClient`](http::HttpClient) | `bridge-native` |
//! | Log forwarding | [`LoggerSink`](logging::LoggerSink) | `bridge-native` |
//! | Time | [`Clock`](time::Clock) | [`SystemClock`](time::SystemClock) |
//!
//! ## Error Handling
//!
//! Every trait reports failures as [`BridgeError`](error::BridgeError). The
//! variants the engine branches on are `UserNotFound`, `SourceUnavailable`,
//! `CatalogUnavailable` and `PermissionDenied`; adapters map transport and
//! status-code failures onto them.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` so adapters can be shared as
//! `Arc<dyn Trait>` across the HTTP handlers, the scheduler and the sync
//! worker.

pub mod catalog;
pub mod error;
pub mod http;
pub mod logging;
pub mod source;
pub mod time;

pub use error::BridgeError;

pub use catalog::{CatalogCandidate, CatalogId, CatalogLists, CatalogSearch, ListId};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use source::{FilmSource, ProfileStats, SourceFilm, SourceProfile, WatchlistEntry};
pub use time::{Clock, ManualClock, SystemClock};
