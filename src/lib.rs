//! Workspace umbrella crate.
//!
//! Re-exports the service façade so hosts can depend on `reelsync-workspace`
//! alone. The HTTP server lives in the `api-server` crate.

pub use core_service::{
    CatalogDependencies, CoreDependencies, CoreError, CoreService, FilmQuery, ScheduleSettings,
    SyncAvailability, SyncScheduler,
};
