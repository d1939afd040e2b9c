//! Sync trigger.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncTmdbRequest {
    pub usernames: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncTmdbResponse {
    pub message: String,
    pub usernames: Vec<String>,
    pub job_started: bool,
    pub job_id: String,
}

/// Queue a TMDb sync for the given users and return immediately.
///
/// The response echoes the usernames as queued, lowercased.
///
/// Each user gets their own list named `"{username}'s Top Rated Movies"`,
/// cleared and refilled with their current top-rated films.
pub async fn sync_tmdb_handler(
    State(state): State<AppState>,
    body: Result<Json<SyncTmdbRequest>, JsonRejection>,
) -> AppResult<Json<SyncTmdbResponse>> {
    let Json(request) = body?;

    let ticket = state.core.trigger_sync(request.usernames).await?;

    Ok(Json(SyncTmdbResponse {
        message: format!(
            "TMDb sync job started for {} user(s). Each user will get their own list.",
            ticket.usernames.len()
        ),
        job_id: ticket.job_id.to_string(),
        usernames: ticket.usernames,
        job_started: true,
    }))
}
