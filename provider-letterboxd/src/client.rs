//! Letterboxd page client
//!
//! Implements [`FilmSource`] by walking the paginated film and watchlist
//! grids and reading the profile page.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::{FilmSource, SourceFilm, SourceProfile, WatchlistEntry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::{LetterboxdError, Result};
use crate::parser::{parse_film_grid, parse_profile, GridFilm};

/// Letterboxd base URL
const BASE_URL: &str = "https://letterboxd.com";

/// Safety cap on grid pages walked for one user
pub const DEFAULT_MAX_PAGES: u32 = 200;

/// Timeout for page requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which grid to walk.
#[derive(Debug, Clone, Copy)]
enum Grid {
    Films,
    Watchlist,
}

impl Grid {
    fn path(self) -> &'static str {
        match self {
            Grid::Films => "films",
            Grid::Watchlist => "watchlist",
        }
    }
}

pub struct LetterboxdClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    max_pages: u32,
    timeout: Duration,
}

impl LetterboxdClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: BASE_URL.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn user_url(&self, username: &str, suffix: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(username),
            suffix
        )
    }

    /// Fetch a page. `Ok(None)` means the page does not exist.
    async fn fetch_page(&self, url: String) -> Result<Option<String>> {
        let request = HttpRequest::get(url.clone())
            .header("Accept", "text/html")
            .timeout(self.timeout);
        let response = self.http_client.execute(request).await?;

        if response.is_not_found() {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(LetterboxdError::HttpStatus {
                status: response.status,
                url,
            });
        }

        let body = response
            .text()
            .map_err(|e| LetterboxdError::InvalidPage(e.to_string()))?;
        Ok(Some(body))
    }

    /// Walk a grid until an empty or missing page.
    async fn fetch_grid(&self, username: &str, grid: Grid) -> Result<Vec<GridFilm>> {
        let mut films = Vec::new();

        for page in 1..=self.max_pages {
            let url = self.user_url(username, &format!("{}/page/{}/", grid.path(), page));
            let html = match self.fetch_page(url).await? {
                Some(html) => html,
                None if page == 1 => {
                    return Err(LetterboxdError::UserNotFound(username.to_string()))
                }
                None => break,
            };

            let posters = parse_film_grid(&html);
            debug!(page, posters = posters.len(), grid = grid.path(), "Parsed grid page");
            if posters.is_empty() {
                break;
            }
            films.extend(posters);
        }

        Ok(films)
    }
}

#[async_trait]
impl FilmSource for LetterboxdClient {
    #[instrument(skip(self))]
    async fn fetch_rated_and_liked_films(&self, username: &str) -> BridgeResult<Vec<SourceFilm>> {
        let films = self.fetch_grid(username, Grid::Films).await?;
        let total = films.len();

        let eligible: Vec<SourceFilm> = films
            .into_iter()
            .map(SourceFilm::from)
            .filter(SourceFilm::is_eligible)
            .collect();

        info!(total, eligible = eligible.len(), "Fetched Letterboxd films");
        Ok(eligible)
    }

    #[instrument(skip(self))]
    async fn fetch_watchlist(&self, username: &str) -> BridgeResult<Vec<WatchlistEntry>> {
        let films = self.fetch_grid(username, Grid::Watchlist).await?;
        info!(count = films.len(), "Fetched Letterboxd watchlist");
        Ok(films.into_iter().map(WatchlistEntry::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_profile(&self, username: &str) -> BridgeResult<SourceProfile> {
        let html = self
            .fetch_page(self.user_url(username, ""))
            .await?
            .ok_or_else(|| LetterboxdError::UserNotFound(username.to_string()))?;

        Ok(parse_profile(username, &html))
    }
}
