//! Letterboxd client against saved page fixtures
//!
//! A small in-memory `HttpClient` serves the fixtures by URL so the client's
//! paging, filtering and profile extraction run end to end.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::FilmSource;
use provider_letterboxd::LetterboxdClient;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const FILMS_PAGE: &str = include_str!("fixtures/films_page.html");
const PROFILE_PAGE: &str = include_str!("fixtures/profile_page.html");
const EMPTY_PAGE: &str = "<html><body><ul class=\"poster-list\"></ul></body></html>";

/// Serves fixed pages by URL; anything else is a 404.
struct FixtureHttpClient {
    pages: HashMap<String, &'static str>,
    requested: Mutex<Vec<String>>,
}

impl FixtureHttpClient {
    fn new(pages: &[(&str, &'static str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), *body))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for FixtureHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requested.lock().unwrap().push(request.url.clone());
        Ok(match self.pages.get(&request.url) {
            Some(body) => HttpResponse::new(200, *body),
            None => HttpResponse::new(404, "Not found"),
        })
    }
}

#[tokio::test]
async fn test_rated_and_liked_films_from_fixture() {
    let http = Arc::new(FixtureHttpClient::new(&[
        ("https://letterboxd.com/alice/films/page/1/", FILMS_PAGE),
        ("https://letterboxd.com/alice/films/page/2/", EMPTY_PAGE),
    ]));
    let client = LetterboxdClient::new(http.clone());

    let films = client.fetch_rated_and_liked_films("alice").await.unwrap();

    // Ronin is rated but not liked, Amélie is liked but not rated.
    assert_eq!(films.len(), 2);
    assert_eq!(films[0].title, "Heat");
    assert_eq!(films[0].slug, "heat");
    assert_eq!(films[0].release_year, Some(1995));
    assert_eq!(films[0].rating_units, Some(10));
    assert_eq!(films[1].title, "Schindler's List");
    assert_eq!(films[1].rating_units, Some(9));
    assert!(films.iter().all(|f| f.liked));

    assert_eq!(http.requested().len(), 2);
}

#[tokio::test]
async fn test_watchlist_keeps_every_poster() {
    let http = Arc::new(FixtureHttpClient::new(&[(
        "https://letterboxd.com/alice/watchlist/page/1/",
        FILMS_PAGE,
    )]));
    let client = LetterboxdClient::new(http);

    // Page 2 is a 404, which ends the walk rather than failing it.
    let watchlist = client.fetch_watchlist("alice").await.unwrap();

    let titles: Vec<&str> = watchlist.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, vec!["Heat", "Ronin", "Amélie", "Schindler's List"]);
    assert_eq!(watchlist[2].release_year, None);
}

#[tokio::test]
async fn test_profile_from_fixture() {
    let http = Arc::new(FixtureHttpClient::new(&[(
        "https://letterboxd.com/alice/",
        PROFILE_PAGE,
    )]));
    let client = LetterboxdClient::new(http);

    let profile = client.fetch_profile("alice").await.unwrap();

    assert_eq!(profile.username, "alice");
    assert_eq!(profile.display_name.as_deref(), Some("Alice Liddell"));
    assert_eq!(
        profile.bio.as_deref(),
        Some("Down the rabbit hole & through the looking glass. Mostly horror.")
    );
    assert_eq!(profile.stats.films_watched, 1204);
    assert_eq!(profile.stats.lists, 12);
    assert_eq!(profile.stats.following, 58);
    assert_eq!(profile.stats.followers, 2310);
}

#[tokio::test]
async fn test_unknown_profile_is_user_not_found() {
    let client = LetterboxdClient::new(Arc::new(FixtureHttpClient::new(&[])));

    let err = client.fetch_profile("ghost").await.unwrap_err();
    assert!(matches!(
        err,
        bridge_traits::BridgeError::UserNotFound(ref u) if u == "ghost"
    ));
}
