//! Sorting and top-N selection over film collections.
//!
//! All sorts are stable: films that compare equal keep the order the tracker
//! returned them in, for ascending and descending order alike.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::LibraryError;
use crate::models::{RatedFilm, WatchlistFilm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Rating,
    Title,
    Year,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Rating => "rating",
            SortField::Title => "title",
            SortField::Year => "year",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rating" => Ok(SortField::Rating),
            "title" => Ok(SortField::Title),
            "year" => Ok(SortField::Year),
            other => Err(LibraryError::invalid(
                "sort_by",
                format!("expected one of rating, title, year; got '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(LibraryError::invalid(
                "sort_order",
                format!("expected asc or desc; got '{}'", other),
            )),
        }
    }
}

/// Fields a film collection can be ordered by.
pub trait FilmSortKey {
    fn sort_title(&self) -> &str;
    fn sort_year(&self) -> Option<i32>;
    /// `None` for collections without ratings; those sort as 0.
    fn sort_rating(&self) -> Option<f32>;
}

impl FilmSortKey for RatedFilm {
    fn sort_title(&self) -> &str {
        &self.title
    }

    fn sort_year(&self) -> Option<i32> {
        self.release_year
    }

    fn sort_rating(&self) -> Option<f32> {
        Some(self.rating_stars)
    }
}

impl FilmSortKey for WatchlistFilm {
    fn sort_title(&self) -> &str {
        &self.title
    }

    fn sort_year(&self) -> Option<i32> {
        self.release_year
    }

    fn sort_rating(&self) -> Option<f32> {
        None
    }
}

fn compare<T: FilmSortKey>(a: &T, b: &T, field: SortField) -> Ordering {
    match field {
        SortField::Rating => a
            .sort_rating()
            .unwrap_or(0.0)
            .total_cmp(&b.sort_rating().unwrap_or(0.0)),
        SortField::Title => a
            .sort_title()
            .to_lowercase()
            .cmp(&b.sort_title().to_lowercase()),
        SortField::Year => a.sort_year().unwrap_or(0).cmp(&b.sort_year().unwrap_or(0)),
    }
}

/// Stable in-place sort.
pub fn sort_films<T: FilmSortKey>(films: &mut [T], field: SortField, order: SortOrder) {
    match order {
        SortOrder::Asc => films.sort_by(|a, b| compare(a, b, field)),
        SortOrder::Desc => films.sort_by(|a, b| compare(b, a, field)),
    }
}

/// Sort the whole collection, then keep the first `limit` films.
pub fn select_top<T: FilmSortKey>(
    mut films: Vec<T>,
    field: SortField,
    order: SortOrder,
    limit: usize,
) -> Vec<T> {
    sort_films(&mut films, field, order);
    films.truncate(limit);
    films
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::film_url;

    fn rated(title: &str, year: Option<i32>, stars: f32) -> RatedFilm {
        RatedFilm {
            title: title.to_string(),
            slug: title.to_lowercase(),
            release_year: year,
            rating_units: (stars * 2.0) as u8,
            rating_stars: stars,
            url: film_url(&title.to_lowercase()),
        }
    }

    #[test]
    fn test_top_n_desc_is_stable() {
        let films = vec![
            rated("A", Some(2000), 3.0),
            rated("B", Some(2001), 5.0),
            rated("C", Some(2002), 4.5),
            rated("D", Some(2003), 2.0),
            rated("E", Some(2004), 5.0),
        ];

        let top = select_top(films, SortField::Rating, SortOrder::Desc, 3);

        let titles: Vec<_> = top.iter().map(|f| f.title.as_str()).collect();
        let ratings: Vec<_> = top.iter().map(|f| f.rating_stars).collect();
        assert_eq!(ratings, vec![5.0, 5.0, 4.5]);
        assert_eq!(titles, vec!["B", "E", "C"]);
    }

    #[test]
    fn test_limit_applies_after_sorting_whole_set() {
        let films = vec![
            rated("Low", None, 1.0),
            rated("Mid", None, 3.0),
            rated("High", None, 5.0),
        ];

        let top = select_top(films, SortField::Rating, SortOrder::Desc, 1);
        assert_eq!(top[0].title, "High");
    }

    #[test]
    fn test_title_sort_is_case_insensitive() {
        let mut films = vec![
            rated("zodiac", None, 4.0),
            rated("Alien", None, 4.0),
            rated("blade Runner", None, 4.0),
        ];

        sort_films(&mut films, SortField::Title, SortOrder::Asc);

        let titles: Vec<_> = films.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Alien", "blade Runner", "zodiac"]);
    }

    #[test]
    fn test_missing_year_sorts_as_zero() {
        let mut films = vec![
            rated("Known", Some(1999), 4.0),
            rated("Unknown", None, 4.0),
        ];

        sort_films(&mut films, SortField::Year, SortOrder::Asc);
        assert_eq!(films[0].title, "Unknown");

        sort_films(&mut films, SortField::Year, SortOrder::Desc);
        assert_eq!(films[0].title, "Known");
    }

    #[test]
    fn test_watchlist_rating_sort_keeps_order() {
        let mut films = vec![
            WatchlistFilm {
                title: "First".to_string(),
                release_year: None,
                url: film_url("first"),
            },
            WatchlistFilm {
                title: "Second".to_string(),
                release_year: None,
                url: film_url("second"),
            },
        ];

        sort_films(&mut films, SortField::Rating, SortOrder::Desc);
        assert_eq!(films[0].title, "First");
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!("Rating".parse::<SortField>().unwrap(), SortField::Rating);
        assert_eq!("year".parse::<SortField>().unwrap(), SortField::Year);
        assert!("popularity".parse::<SortField>().is_err());
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("up".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }
}
