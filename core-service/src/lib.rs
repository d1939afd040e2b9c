//! Core service façade and bootstrap helpers.
//!
//! This crate wires the concrete adapters (Letterboxd pages, the TMDb API,
//! reqwest) into the sync engine and exposes the handful of operations the
//! HTTP surface and the scheduler need:
//!
//! - [`CoreService::trigger_sync`] validates usernames and hands the batch
//!   to the single sync worker
//! - [`CoreService::profile`], [`CoreService::watchlist`] and
//!   [`CoreService::top_rated`] serve read-only tracker data
//!
//! When the sync settings do not validate, the service still starts. The
//! read-only operations keep working and every sync request is rejected
//! with the configuration message, without attempting any user.

pub mod error;
pub mod scheduler;

pub use error::{CoreError, Result};
pub use scheduler::{to_scheduler_expression, ScheduleSettings, SyncScheduler};

use std::sync::Arc;

use bridge_native::ReqwestHttpClient;
use bridge_traits::{
    http::HttpClient, CatalogLists, CatalogSearch, Clock, FilmSource, SystemClock,
};
use core_library::{
    pagination::validate_limit, sort_films, LibraryError, Page, PageRequest, RatedFilm,
    SortField, SortOrder, UserProfile, Username, WatchlistFilm,
};
use core_runtime::config::AppConfig;
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use core_sync::{
    BatchSyncCoordinator, ListReconciler, MatchResolver, SyncJobId, SyncOptions, SyncQueue,
    SyncTicket, UserSyncOrchestrator,
};
use provider_letterboxd::LetterboxdClient;
use provider_tmdb::{TmdbClient, TmdbCredentials};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Catalog capabilities used by the sync engine.
#[derive(Clone)]
pub struct CatalogDependencies {
    pub search: Arc<dyn CatalogSearch>,
    pub lists: Arc<dyn CatalogLists>,
}

/// Whether sync can run, decided once at startup.
pub enum SyncAvailability {
    Ready {
        catalog: CatalogDependencies,
        options: SyncOptions,
    },
    /// Sync requests are rejected with this message.
    Unavailable(String),
}

/// Aggregated handle to everything the core requires.
pub struct CoreDependencies {
    pub film_source: Arc<dyn FilmSource>,
    pub sync: SyncAvailability,
    pub clock: Arc<dyn Clock>,
    pub event_bus: EventBus,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit handles.
    pub fn new(film_source: Arc<dyn FilmSource>, sync: SyncAvailability) -> Self {
        Self {
            film_source,
            sync,
            clock: Arc::new(SystemClock),
            event_bus: EventBus::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = event_bus;
        self
    }

    /// Build the native adapters described by `config`.
    ///
    /// # Errors
    ///
    /// Only fails when the HTTP client cannot be created. Invalid sync
    /// settings produce [`SyncAvailability::Unavailable`] instead.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http: Arc<dyn HttpClient> = Arc::new(
            ReqwestHttpClient::with_timeout(config.http_timeout)
                .map_err(|e| CoreError::InitializationFailed(e.to_string()))?,
        );

        let film_source =
            Arc::new(LetterboxdClient::new(Arc::clone(&http)).with_timeout(config.http_timeout));

        let sync = match config.sync.validate() {
            Ok(settings) => {
                let credentials = TmdbCredentials {
                    api_key: settings.api_key,
                    access_token: settings.access_token,
                    account_object_id: settings.account_object_id,
                };
                match TmdbClient::new(http, credentials, settings.rate_limit) {
                    Ok(client) => {
                        let client = Arc::new(client.with_timeout(config.http_timeout));
                        info!(
                            limit = settings.limit,
                            sort_by = %settings.sort_by,
                            sort_order = %settings.sort_order,
                            "TMDb sync enabled"
                        );
                        SyncAvailability::Ready {
                            catalog: CatalogDependencies {
                                search: client.clone(),
                                lists: client,
                            },
                            options: SyncOptions {
                                limit: settings.limit,
                                sort_by: settings.sort_by,
                                sort_order: settings.sort_order,
                            },
                        }
                    }
                    Err(e) => SyncAvailability::Unavailable(format!(
                        "TMDb client could not be created: {}",
                        e
                    )),
                }
            }
            Err(core_runtime::Error::Config(message)) => SyncAvailability::Unavailable(message),
            Err(other) => SyncAvailability::Unavailable(other.to_string()),
        };

        if let SyncAvailability::Unavailable(reason) = &sync {
            warn!(reason = %reason, "TMDb sync unavailable; sync requests will be rejected");
        }

        Ok(Self::new(film_source, sync))
    }
}

enum SyncState {
    Ready(SyncQueue),
    Unavailable(String),
}

/// Listing options for the watchlist and top-rated views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilmQuery {
    /// Applied after sorting, before pagination
    pub limit: Option<u32>,
    pub page: PageRequest,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl FilmQuery {
    /// Title ascending, first page.
    pub fn watchlist() -> Self {
        Self {
            limit: None,
            page: PageRequest::default(),
            sort_by: SortField::Title,
            sort_order: SortOrder::Asc,
        }
    }

    /// Rating descending, first page.
    pub fn top_rated() -> Self {
        Self {
            limit: None,
            page: PageRequest::default(),
            sort_by: SortField::Rating,
            sort_order: SortOrder::Desc,
        }
    }
}

/// Primary façade exposed to the server and the scheduler.
pub struct CoreService {
    source: Arc<dyn FilmSource>,
    sync: SyncState,
    event_bus: EventBus,
    shutdown: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl CoreService {
    /// Create the service and, when sync is available, spawn its worker.
    /// Must be called inside a Tokio runtime.
    pub fn start(deps: CoreDependencies) -> Self {
        let shutdown = CancellationToken::new();
        let event_bus = deps.event_bus;

        let (sync, worker) = match deps.sync {
            SyncAvailability::Ready { catalog, options } => {
                let orchestrator = Arc::new(UserSyncOrchestrator::new(
                    Arc::clone(&deps.film_source),
                    MatchResolver::new(catalog.search),
                    ListReconciler::new(catalog.lists),
                    options,
                ));
                let coordinator = Arc::new(BatchSyncCoordinator::new(
                    orchestrator,
                    event_bus.clone(),
                    deps.clock,
                ));
                let (queue, worker) =
                    SyncQueue::start(coordinator, event_bus.clone(), shutdown.clone());
                (SyncState::Ready(queue), Some(worker))
            }
            SyncAvailability::Unavailable(reason) => (SyncState::Unavailable(reason), None),
        };

        Self {
            source: deps.film_source,
            sync,
            event_bus,
            shutdown,
            worker: Mutex::new(worker),
        }
    }

    /// Build native adapters from `config` and start the service.
    pub fn bootstrap(config: &AppConfig) -> Result<Self> {
        Ok(Self::start(CoreDependencies::from_config(config)?))
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn is_sync_available(&self) -> bool {
        matches!(self.sync, SyncState::Ready(_))
    }

    /// Why sync requests are being rejected, if they are.
    pub fn sync_unavailable_reason(&self) -> Option<&str> {
        match &self.sync {
            SyncState::Ready(_) => None,
            SyncState::Unavailable(reason) => Some(reason),
        }
    }

    /// Validate `usernames` and queue them as one batch.
    ///
    /// Returns as soon as the batch is queued. Usernames are normalized to
    /// lowercase and keep their order.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Library`] when the list is empty or a username is
    ///   malformed
    /// - [`CoreError::SyncUnavailable`] when sync is not configured
    /// - [`CoreError::Sync`] when the worker has stopped
    pub async fn trigger_sync(&self, usernames: Vec<String>) -> Result<SyncTicket> {
        if usernames.is_empty() {
            return Err(LibraryError::invalid("usernames", "At least one username is required").into());
        }
        let usernames = usernames
            .iter()
            .map(|raw| Username::parse(raw).map(String::from))
            .collect::<core_library::Result<Vec<_>>>()?;

        match &self.sync {
            SyncState::Ready(queue) => {
                let ticket = queue.enqueue(usernames.clone()).await?;
                info!(
                    job_id = %ticket.job_id,
                    usernames = %usernames.join(", "),
                    "TMDb sync job queued for {} user(s)",
                    usernames.len()
                );
                Ok(ticket)
            }
            SyncState::Unavailable(reason) => {
                let job_id = SyncJobId::new();
                warn!(job_id = %job_id, reason = %reason, "Rejected sync request");
                self.event_bus
                    .emit(CoreEvent::Sync(SyncEvent::BatchRejected {
                        job_id: job_id.to_string(),
                        reason: reason.clone(),
                    }))
                    .ok();
                Err(CoreError::SyncUnavailable(reason.clone()))
            }
        }
    }

    /// Profile of a tracker user.
    pub async fn profile(&self, username: &str) -> Result<UserProfile> {
        let username = Username::parse(username)?;
        let profile = self
            .source
            .fetch_profile(username.as_str())
            .await
            .map_err(CoreError::Source)?;
        Ok(UserProfile::from_source(&username, profile))
    }

    /// Watchlist of a tracker user; sortable by title or year only.
    pub async fn watchlist(&self, username: &str, query: FilmQuery) -> Result<Page<WatchlistFilm>> {
        let username = Username::parse(username)?;
        if query.sort_by == SortField::Rating {
            return Err(LibraryError::invalid("sort_by", "expected one of title, year").into());
        }
        let limit = validate_limit(query.limit)?;

        let mut films: Vec<WatchlistFilm> = self
            .source
            .fetch_watchlist(username.as_str())
            .await
            .map_err(CoreError::Source)?
            .into_iter()
            .map(WatchlistFilm::from)
            .collect();

        sort_films(&mut films, query.sort_by, query.sort_order);
        Ok(Page::paginate(films, limit, query.page))
    }

    /// Rated and liked films of a tracker user.
    pub async fn top_rated(&self, username: &str, query: FilmQuery) -> Result<Page<RatedFilm>> {
        let username = Username::parse(username)?;
        let limit = validate_limit(query.limit)?;

        let films = self
            .source
            .fetch_rated_and_liked_films(username.as_str())
            .await
            .map_err(CoreError::Source)?;
        let mut films = RatedFilm::collect_eligible(films);

        sort_films(&mut films, query.sort_by, query.sort_order);
        Ok(Page::paginate(films, limit, query.page))
    }

    /// Stop accepting batches and wait for the worker. A batch already
    /// running finishes first.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        if let Some(worker) = self.worker.lock().await.take() {
            if let Err(e) = worker.await {
                warn!(error = %e, "Sync worker ended abnormally");
            }
        }
        info!("Core service stopped");
    }
}
