//! TMDb API request and response types
//!
//! Only the fields the sync needs are modelled; everything else in the
//! payloads is ignored.

use serde::{Deserialize, Serialize};

/// `GET /3/search/movie`
#[derive(Debug, Deserialize)]
pub struct SearchMovieResponse {
    #[serde(default)]
    pub results: Vec<MovieResult>,
}

#[derive(Debug, Deserialize)]
pub struct MovieResult {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// `YYYY-MM-DD`, sometimes an empty string
    #[serde(default)]
    pub release_date: Option<String>,
}

/// `GET /4/account/{account_object_id}/lists`
#[derive(Debug, Deserialize)]
pub struct AccountListsResponse {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<ListSummary>,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ListSummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// `POST /4/list`
#[derive(Debug, Serialize)]
pub struct CreateListRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub iso_639_1: &'a str,
    pub iso_3166_1: &'a str,
    pub public: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateListResponse {
    pub id: Option<u64>,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// `POST /4/list/{list_id}/items`
#[derive(Debug, Serialize)]
pub struct AddItemsRequest {
    pub items: Vec<ListItem>,
}

#[derive(Debug, Serialize)]
pub struct ListItem {
    pub media_type: &'static str,
    pub media_id: u64,
}

impl ListItem {
    pub fn movie(media_id: u64) -> Self {
        Self {
            media_type: "movie",
            media_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemsResponse {
    #[serde(default)]
    pub results: Vec<ItemResult>,
}

#[derive(Debug, Deserialize)]
pub struct ItemResult {
    #[serde(default)]
    pub success: bool,
}

/// Error body shared by the v3 and v4 APIs.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status_message: Option<String>,
}

/// Claims read from the v4 access token.
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
}
