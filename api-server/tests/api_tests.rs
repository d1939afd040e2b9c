//! Router tests driven through `tower::ServiceExt::oneshot`.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bridge_traits::{
    error::Result as BridgeResult, BridgeError, CatalogCandidate, CatalogId, CatalogLists,
    CatalogSearch, FilmSource, ListId, ProfileStats, SourceFilm, SourceProfile, WatchlistEntry,
};
use api_server::{create_router, AppState};
use core_service::{CatalogDependencies, CoreDependencies, CoreService, SyncAvailability};
use core_sync::SyncOptions;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct OneUserSource;

#[async_trait]
impl FilmSource for OneUserSource {
    async fn fetch_rated_and_liked_films(&self, username: &str) -> BridgeResult<Vec<SourceFilm>> {
        if username != "alice" {
            return Err(BridgeError::UserNotFound(username.to_string()));
        }
        Ok((1..=25u8)
            .map(|n| SourceFilm {
                title: format!("Film {:02}", n),
                slug: format!("film-{:02}", n),
                release_year: Some(1990 + i32::from(n)),
                rating_units: Some(n % 10 + 1),
                liked: true,
            })
            .collect())
    }

    async fn fetch_watchlist(&self, username: &str) -> BridgeResult<Vec<WatchlistEntry>> {
        if username != "alice" {
            return Err(BridgeError::SourceUnavailable("HTTP 503".to_string()));
        }
        Ok(vec![
            WatchlistEntry {
                title: "Memento".to_string(),
                slug: "memento".to_string(),
                release_year: Some(2000),
            },
            WatchlistEntry {
                title: "Alien".to_string(),
                slug: "alien".to_string(),
                release_year: Some(1979),
            },
        ])
    }

    async fn fetch_profile(&self, username: &str) -> BridgeResult<SourceProfile> {
        if username != "alice" {
            return Err(BridgeError::UserNotFound(username.to_string()));
        }
        Ok(SourceProfile {
            username: username.to_string(),
            display_name: Some("Alice".to_string()),
            bio: Some("Mostly horror.".to_string()),
            stats: ProfileStats {
                films_watched: 10,
                lists: 1,
                following: 2,
                followers: 3,
            },
        })
    }
}

/// Matches nothing and keeps no state; enough for the trigger to succeed.
struct NullCatalog;

#[async_trait]
impl CatalogSearch for NullCatalog {
    async fn search(&self, _title: &str, _year: Option<i32>) -> BridgeResult<Vec<CatalogCandidate>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl CatalogLists for NullCatalog {
    async fn find_list_by_name(&self, _name: &str) -> BridgeResult<Option<ListId>> {
        Ok(Some(ListId(1)))
    }

    async fn create_list(&self, _name: &str, _description: &str) -> BridgeResult<ListId> {
        Ok(ListId(1))
    }

    async fn clear_list(&self, _list_id: ListId) -> BridgeResult<()> {
        Ok(())
    }

    async fn add_items(&self, _list_id: ListId, ids: &[CatalogId]) -> BridgeResult<usize> {
        Ok(ids.len())
    }
}

fn app(sync_ready: bool) -> Router {
    let sync = if sync_ready {
        let catalog = Arc::new(NullCatalog);
        SyncAvailability::Ready {
            catalog: CatalogDependencies {
                search: catalog.clone(),
                lists: catalog,
            },
            options: SyncOptions::default(),
        }
    } else {
        SyncAvailability::Unavailable(
            "TMDb sync is disabled. Set TMDB_SYNC_ENABLED=true to enable it.".to_string(),
        )
    };

    let core = CoreService::start(CoreDependencies::new(Arc::new(OneUserSource), sync));
    create_router(AppState::new(Arc::new(core)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(false), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_profile() {
    let (status, body) = get(app(false), "/users/Alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["display_name"], "Alice");
    assert_eq!(body["stats"]["followers"], 3);
    assert_eq!(body["url"], "https://letterboxd.com/alice/");
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let (status, body) = get(app(false), "/users/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], 404);
}

#[tokio::test]
async fn test_invalid_username_is_422() {
    let (status, _) = get(app(false), "/users/bad.name/top-rated").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_top_rated_pagination() {
    let (status, body) = get(
        app(false),
        "/users/alice/top-rated?limit=12&page=2&page_size=5&sort_by=title&sort_order=asc",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_rated"], 25);
    assert_eq!(body["films_count"], 5);
    assert_eq!(body["page"], 2);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["has_next"], true);
    assert_eq!(body["has_previous"], true);
    assert_eq!(body["films"][0]["title"], "Film 06");
    assert!(body["films"][0]["rating"].is_number());
}

#[tokio::test]
async fn test_query_validation_is_422() {
    for uri in [
        "/users/alice/top-rated?page=0",
        "/users/alice/top-rated?page_size=101",
        "/users/alice/top-rated?limit=1001",
        "/users/alice/top-rated?page=abc",
        "/users/alice/watchlist?sort_by=rating",
    ] {
        let (status, body) = get(app(false), uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert_eq!(body["error"]["status"], 422, "{}", uri);
    }
}

#[tokio::test]
async fn test_watchlist_defaults_to_title_ascending() {
    let (status, body) = get(app(false), "/users/alice/watchlist").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_watchlist"], 2);
    assert_eq!(body["films"][0]["title"], "Alien");
    assert_eq!(body["films"][0]["year"], 1979);
}

#[tokio::test]
async fn test_source_outage_is_502() {
    let (status, _) = get(app(false), "/users/bob/watchlist").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_sync_trigger_accepts_batch() {
    let (status, body) = post_json(
        app(true),
        "/jobs/sync-tmdb",
        json!({ "usernames": ["alice", "bob"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job_started"], true);
    assert_eq!(body["usernames"], json!(["alice", "bob"]));
    assert!(body["job_id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("TMDb sync job started for 2 user(s)"));
}

#[tokio::test]
async fn test_sync_trigger_echoes_queued_usernames() {
    let (status, body) = post_json(
        app(true),
        "/jobs/sync-tmdb",
        json!({ "usernames": ["Alice", "BOB_99"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usernames"], json!(["alice", "bob_99"]));
}

#[tokio::test]
async fn test_sync_trigger_when_disabled_is_503() {
    let (status, body) = post_json(
        app(false),
        "/jobs/sync-tmdb",
        json!({ "usernames": ["alice"] }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body["error"]["message"],
        "TMDb sync is disabled. Set TMDB_SYNC_ENABLED=true to enable it."
    );
}

#[tokio::test]
async fn test_sync_trigger_validation_is_422() {
    for body in [
        json!({ "usernames": [] }),
        json!({ "usernames": ["ok", "not ok"] }),
        json!({ "users": ["alice"] }),
    ] {
        let (status, _) = post_json(app(true), "/jobs/sync-tmdb", body.clone()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
    }
}
