//! Read-only tracker views: profile, watchlist and top-rated films.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use core_library::{
    pagination::DEFAULT_PAGE_SIZE, Page, PageRequest, RatedFilm, SortField, SortOrder,
    UserProfile, WatchlistFilm,
};
use core_service::{CoreError, FilmQuery};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::AppResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListParams {
    /// Overlay the supplied values on `defaults`.
    fn into_query(self, defaults: FilmQuery) -> Result<FilmQuery, CoreError> {
        let page = PageRequest::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )?;
        let sort_by = match self.sort_by.as_deref() {
            Some(raw) => SortField::from_str(raw)?,
            None => defaults.sort_by,
        };
        let sort_order = match self.sort_order.as_deref() {
            Some(raw) => SortOrder::from_str(raw)?,
            None => defaults.sort_order,
        };

        Ok(FilmQuery {
            limit: self.limit,
            page,
            sort_by,
            sort_order,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub username: String,
    pub total_watchlist: usize,
    pub films_count: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
    pub films: Vec<WatchlistFilm>,
}

#[derive(Debug, Serialize)]
pub struct TopRatedResponse {
    pub username: String,
    pub total_rated: usize,
    pub films_count: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
    pub films: Vec<RatedFilm>,
}

pub async fn profile_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.core.profile(&username).await?))
}

pub async fn watchlist_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<WatchlistResponse>> {
    let Query(params) = params?;
    let query = params.into_query(FilmQuery::watchlist())?;
    let page: Page<WatchlistFilm> = state.core.watchlist(&username, query).await?;

    Ok(Json(WatchlistResponse {
        username: username.to_lowercase(),
        total_watchlist: page.total_count,
        films_count: page.items_count(),
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        films: page.items,
    }))
}

pub async fn top_rated_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<TopRatedResponse>> {
    let Query(params) = params?;
    let query = params.into_query(FilmQuery::top_rated())?;
    let page = state.core.top_rated(&username, query).await?;

    Ok(Json(TopRatedResponse {
        username: username.to_lowercase(),
        total_rated: page.total_count,
        films_count: page.items_count(),
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        films: page.items,
    }))
}
