//! TMDb API client
//!
//! Implements [`CatalogSearch`] on the v3 search endpoint and
//! [`CatalogLists`] on the v4 list endpoints.
//!
//! Search authenticates with the v3 API key. List management needs a v4 user
//! access token with write approval; the lists it sees are those of the
//! account that approved the token.

use async_trait::async_trait;
use base64::Engine;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::time::{Clock, SystemClock};
use bridge_traits::{CatalogCandidate, CatalogId, CatalogLists, CatalogSearch, ListId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, TmdbError};
use crate::types::{
    AccountListsResponse, AddItemsRequest, AddItemsResponse, CreateListRequest,
    CreateListResponse, ListItem, SearchMovieResponse, StatusResponse, TokenClaims,
};

/// TMDb API base URL
const API_BASE: &str = "https://api.themoviedb.org";

/// Minimum delay between requests; TMDb allows roughly 40 requests per 10s
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(250);

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on account list pages walked during discovery
const MAX_LIST_PAGES: u32 = 100;

const LIST_LANGUAGE: &str = "en";
const LIST_COUNTRY: &str = "US";

/// Credentials for the two API generations.
#[derive(Clone)]
pub struct TmdbCredentials {
    /// v3 API key used for search
    pub api_key: String,
    /// v4 user access token used for list management
    pub access_token: String,
    /// v4 account object id; read from the token when absent
    pub account_object_id: Option<String>,
}

impl fmt::Debug for TmdbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbCredentials")
            .field("api_key_len", &self.api_key.len())
            .field("access_token_len", &self.access_token.len())
            .field("account_object_id", &self.account_object_id)
            .finish()
    }
}

/// Simple rate limiter to enforce delay between requests
struct RateLimiter {
    clock: Arc<dyn Clock>,
    last_request_ms: Option<i64>,
    min_delay: Duration,
}

impl RateLimiter {
    fn new(min_delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_request_ms: None,
            min_delay,
        }
    }

    async fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request_ms {
            let elapsed_ms = self.clock.unix_timestamp_millis() - last;
            let required_ms = self.min_delay.as_millis() as i64;
            if elapsed_ms < required_ms {
                let wait_time = Duration::from_millis((required_ms - elapsed_ms) as u64);
                debug!("Rate limiting: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }
        self.last_request_ms = Some(self.clock.unix_timestamp_millis());
    }
}

/// TMDb API client
///
/// # Example
///
/// ```ignore
/// let client = TmdbClient::new(http_client, credentials, DEFAULT_RATE_LIMIT)?;
/// let hits = client.search("Heat", Some(1995)).await?;
/// ```
pub struct TmdbClient {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    access_token: String,
    account_object_id: String,
    base_url: String,
    timeout: Duration,
    rate_limiter: Mutex<RateLimiter>,
}

impl TmdbClient {
    /// Create a client, resolving the account object id up front.
    ///
    /// # Errors
    ///
    /// Returns [`TmdbError::MissingAccount`] when no account id is configured
    /// and the access token does not carry one.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        credentials: TmdbCredentials,
        rate_limit: Duration,
    ) -> Result<Self> {
        Self::with_clock(http_client, credentials, rate_limit, Arc::new(SystemClock))
    }

    pub fn with_clock(
        http_client: Arc<dyn HttpClient>,
        credentials: TmdbCredentials,
        rate_limit: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let account_object_id = match credentials.account_object_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => account_from_token(&credentials.access_token)?,
        };

        Ok(Self {
            http_client,
            api_key: credentials.api_key,
            access_token: credentials.access_token,
            account_object_id,
            base_url: API_BASE.to_string(),
            timeout: REQUEST_TIMEOUT,
            rate_limiter: Mutex::new(RateLimiter::new(rate_limit, clock)),
        })
    }

    /// Point the client at another host, e.g. a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn account_object_id(&self) -> &str {
        &self.account_object_id
    }

    fn v4(&self, path: &str) -> HttpRequest {
        HttpRequest::get(format!("{}/4{}", self.base_url, path))
            .bearer_token(&self.access_token)
            .header("Accept", "application/json")
            .timeout(self.timeout)
    }

    /// Rate-limit, send, and turn non-2xx responses into [`TmdbError::ApiError`].
    async fn send(&self, request: HttpRequest, policy: Option<RetryPolicy>) -> Result<HttpResponse> {
        self.rate_limiter.lock().await.wait_if_needed().await;

        let response = match policy {
            Some(policy) => self.http_client.execute_with_retry(request, policy).await?,
            None => self.http_client.execute(request).await?,
        };

        if response.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<StatusResponse>()
            .ok()
            .and_then(|body| body.status_message)
            .unwrap_or_else(|| String::from_utf8_lossy(&response.body).into_owned());
        warn!(status = response.status, %message, "TMDb request failed");

        Err(TmdbError::ApiError {
            status_code: response.status,
            message,
        })
    }

    fn parse<T: serde::de::DeserializeOwned>(response: &HttpResponse, what: &str) -> Result<T> {
        serde_json::from_slice(&response.body)
            .map_err(|e| TmdbError::ParseError(format!("{}: {}", what, e)))
    }

    async fn search_movies(&self, title: &str, year: Option<i32>) -> Result<Vec<CatalogCandidate>> {
        let mut request = HttpRequest::get(format!("{}/3/search/movie", self.base_url))
            .query("api_key", &self.api_key)
            .query("query", title)
            .query("include_adult", "false")
            .header("Accept", "application/json")
            .timeout(self.timeout);
        if let Some(year) = year {
            request = request.query("year", year.to_string());
        }

        let response = self.send(request, Some(RetryPolicy::none())).await?;
        let body: SearchMovieResponse = Self::parse(&response, "search results")?;

        Ok(body
            .results
            .into_iter()
            .map(|movie| CatalogCandidate {
                catalog_id: CatalogId(movie.id),
                title: movie.title,
                release_date: movie.release_date.filter(|date| !date.is_empty()),
            })
            .collect())
    }

    async fn find_list(&self, name: &str) -> Result<Option<ListId>> {
        let mut page = 1;

        loop {
            let request = self
                .v4(&format!("/account/{}/lists", self.account_object_id))
                .query("page", page.to_string());
            let response = self.send(request, None).await?;
            let body: AccountListsResponse = Self::parse(&response, "account lists")?;

            debug!(page, lists = body.results.len(), "Fetched account lists page");
            if let Some(list) = body.results.iter().find(|list| list.name == name) {
                return Ok(Some(ListId(list.id)));
            }

            if body.page >= body.total_pages || page >= MAX_LIST_PAGES {
                return Ok(None);
            }
            page += 1;
        }
    }

    async fn create(&self, name: &str, description: &str) -> Result<ListId> {
        let request = HttpRequest::post(format!("{}/4/list", self.base_url))
            .bearer_token(&self.access_token)
            .timeout(self.timeout)
            .json(&CreateListRequest {
                name,
                description,
                iso_639_1: LIST_LANGUAGE,
                iso_3166_1: LIST_COUNTRY,
                public: true,
            })?;

        // A retried POST after a timeout can create a second list.
        let response = self.send(request, Some(RetryPolicy::none())).await?;
        let body: CreateListResponse = Self::parse(&response, "created list")?;

        body.id.map(ListId).ok_or_else(|| {
            TmdbError::ParseError(format!(
                "created list has no id: {}",
                body.status_message.unwrap_or_default()
            ))
        })
    }

    async fn clear(&self, list_id: ListId) -> Result<()> {
        let request = self.v4(&format!("/list/{}/clear", list_id));
        self.send(request, None).await?;
        Ok(())
    }

    async fn add(&self, list_id: ListId, ids: &[CatalogId]) -> Result<usize> {
        let request = HttpRequest::post(format!("{}/4/list/{}/items", self.base_url, list_id))
            .bearer_token(&self.access_token)
            .timeout(self.timeout)
            .json(&AddItemsRequest {
                items: ids.iter().map(|id| ListItem::movie(id.0)).collect(),
            })?;

        let response = self.send(request, Some(RetryPolicy::none())).await?;
        let body: AddItemsResponse = Self::parse(&response, "add items result")?;

        Ok(body.results.iter().filter(|item| item.success).count())
    }
}

/// Read the `sub` claim from a v4 access token (a JWT).
fn account_from_token(token: &str) -> Result<String> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| TmdbError::MissingAccount("access token is not a JWT".to_string()))?;

    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TmdbError::MissingAccount(format!("undecodable token payload: {}", e)))?;

    let claims: TokenClaims = serde_json::from_slice(&decoded)
        .map_err(|e| TmdbError::MissingAccount(format!("unreadable token claims: {}", e)))?;

    claims
        .sub
        .filter(|sub| !sub.is_empty())
        .ok_or_else(|| TmdbError::MissingAccount("token has no subject".to_string()))
}

#[async_trait]
impl CatalogSearch for TmdbClient {
    #[instrument(skip(self))]
    async fn search(&self, title: &str, year: Option<i32>) -> BridgeResult<Vec<CatalogCandidate>> {
        let results = self.search_movies(title, year).await?;
        debug!(hits = results.len(), "TMDb search finished");
        Ok(results)
    }
}

#[async_trait]
impl CatalogLists for TmdbClient {
    #[instrument(skip(self))]
    async fn find_list_by_name(&self, name: &str) -> BridgeResult<Option<ListId>> {
        Ok(self.find_list(name).await?)
    }

    #[instrument(skip(self, description))]
    async fn create_list(&self, name: &str, description: &str) -> BridgeResult<ListId> {
        let list_id = self.create(name, description).await?;
        info!(list_id = %list_id, "Created TMDb list");
        Ok(list_id)
    }

    #[instrument(skip(self))]
    async fn clear_list(&self, list_id: ListId) -> BridgeResult<()> {
        self.clear(list_id).await?;
        info!(list_id = %list_id, "Cleared TMDb list");
        Ok(())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn add_items(&self, list_id: ListId, ids: &[CatalogId]) -> BridgeResult<usize> {
        let added = self.add(list_id, ids).await?;
        info!(list_id = %list_id, added, requested = ids.len(), "Added movies to TMDb list");
        Ok(added)
    }
}
