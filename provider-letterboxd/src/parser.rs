//! HTML extraction for Letterboxd pages.
//!
//! Letterboxd has no public API, so films and profiles are read from the
//! server-rendered markup. Extraction is best-effort: a poster missing its
//! slug is skipped, a missing year or rating is left as `None`.

use bridge_traits::{ProfileStats, SourceFilm, SourceProfile, WatchlistEntry};
use once_cell::sync::Lazy;
use regex::Regex;

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"data-(?:film|item)-slug="([^"]+)""#).expect("slug regex should compile")
});
static ITEM_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"data-(?:item|film)-name="([^"]+)""#).expect("item name regex should compile")
});
static ALT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\balt="([^"]+)""#).expect("alt regex should compile"));
static RELEASE_YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"data-film-release-year="(\d{4})""#).expect("release year regex should compile")
});
static TRAILING_YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s*\((\d{4})\)\s*$").expect("trailing year regex should compile")
});
static RATING_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\brated-(\d{1,2})\b").expect("rating regex should compile"));
static LIKED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:icon-liked|liked-micro)\b").expect("liked regex should compile")
});

static DISPLAY_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span class="displayname[^"]*"[^>]*>([^<]+)</span>"#)
        .expect("display name regex should compile")
});
static OG_TITLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<meta property="og:title" content="([^"]+)""#)
        .expect("og:title regex should compile")
});
static BIO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="[^"]*\bbio\b[^"]*"[^>]*>(.*?)</div>"#)
        .expect("bio regex should compile")
});
static STAT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<span class="value">([\d,]+)</span>\s*<span class="definition[^"]*">([^<]+)</span>"#,
    )
    .expect("statistic regex should compile")
});
static BLOCK_BREAK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</p>|<br\s*/?>").expect("block break regex should compile")
});
static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex should compile"));
static WHITESPACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

/// One poster from a films or watchlist grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFilm {
    pub slug: String,
    pub title: String,
    pub release_year: Option<i32>,
    pub rating_units: Option<u8>,
    pub liked: bool,
}

impl From<GridFilm> for SourceFilm {
    fn from(film: GridFilm) -> Self {
        SourceFilm {
            title: film.title,
            slug: film.slug,
            release_year: film.release_year,
            rating_units: film.rating_units,
            liked: film.liked,
        }
    }
}

impl From<GridFilm> for WatchlistEntry {
    fn from(film: GridFilm) -> Self {
        WatchlistEntry {
            title: film.title,
            slug: film.slug,
            release_year: film.release_year,
        }
    }
}

/// Extract every poster of a grid page, in page order.
pub fn parse_film_grid(html: &str) -> Vec<GridFilm> {
    html.split("<li").skip(1).filter_map(parse_poster).collect()
}

fn parse_poster(chunk: &str) -> Option<GridFilm> {
    let slug = capture(&SLUG_PATTERN, chunk)?;

    let raw_name = capture(&ITEM_NAME_PATTERN, chunk)
        .or_else(|| capture(&ALT_PATTERN, chunk))
        .map(|name| decode_entities(&name))
        .unwrap_or_else(|| slug.replace('-', " "));

    let (title, name_year) = split_trailing_year(&raw_name);
    let release_year = capture(&RELEASE_YEAR_PATTERN, chunk)
        .and_then(|year| year.parse().ok())
        .or(name_year);

    let rating_units = capture(&RATING_PATTERN, chunk)
        .and_then(|units| units.parse::<u8>().ok())
        .filter(|units| (1..=10).contains(units));

    Some(GridFilm {
        slug,
        title,
        release_year,
        rating_units,
        liked: LIKED_PATTERN.is_match(chunk),
    })
}

/// `"Heat (1995)"` becomes `("Heat", Some(1995))`.
fn split_trailing_year(name: &str) -> (String, Option<i32>) {
    match TRAILING_YEAR_PATTERN.captures(name) {
        Some(caps) => (
            caps[1].trim().to_string(),
            caps[2].parse().ok(),
        ),
        None => (name.trim().to_string(), None),
    }
}

/// Read display name, bio and statistics from a profile page.
pub fn parse_profile(username: &str, html: &str) -> SourceProfile {
    let display_name = capture(&DISPLAY_NAME_PATTERN, html)
        .map(|name| decode_entities(name.trim()))
        .or_else(|| capture(&OG_TITLE_PATTERN, html).map(|title| profile_title(&title)))
        .filter(|name| !name.is_empty());

    let bio = capture(&BIO_PATTERN, html)
        .map(|raw| collapse_text(&raw))
        .filter(|bio| !bio.is_empty());

    let mut stats = ProfileStats::default();
    for caps in STAT_PATTERN.captures_iter(html) {
        let value = caps[1].replace(',', "").parse().unwrap_or(0);
        match caps[2].trim().to_ascii_lowercase().as_str() {
            "film" | "films" => stats.films_watched = value,
            "list" | "lists" => stats.lists = value,
            "following" => stats.following = value,
            "follower" | "followers" => stats.followers = value,
            _ => {}
        }
    }

    SourceProfile {
        username: username.to_string(),
        display_name,
        bio,
        stats,
    }
}

/// `"Alice’s profile"` becomes `"Alice"`.
fn profile_title(title: &str) -> String {
    let decoded = decode_entities(title);
    decoded
        .trim_end_matches("\u{2019}s profile")
        .trim_end_matches("'s profile")
        .trim()
        .to_string()
}

fn collapse_text(html: &str) -> String {
    let text = BLOCK_BREAK_PATTERN.replace_all(html, " ");
    let text = TAG_PATTERN.replace_all(&text, "");
    let text = decode_entities(&text);
    WHITESPACE_PATTERN.replace_all(text.trim(), " ").into_owned()
}

fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode the handful of entities Letterboxd emits in attributes and text.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let decoded = tail.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
