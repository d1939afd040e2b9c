//! # Match Resolver
//!
//! Maps a film title and optional release year to a catalog id.
//!
//! Exactly one search is made per call. The first candidate wins; there is no
//! fuzzy re-ranking and no retry. Search failures never propagate: they turn
//! into [`CatalogMatch::Unmatched`] so one bad title cannot abort a user's
//! sync.

use bridge_traits::CatalogSearch;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::outcome::{CatalogMatch, UnmatchedReason};

/// Years outside this range are treated as missing.
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1870..=2100;

pub struct MatchResolver {
    search: Arc<dyn CatalogSearch>,
}

impl MatchResolver {
    pub fn new(search: Arc<dyn CatalogSearch>) -> Self {
        Self { search }
    }

    pub async fn resolve(&self, title: &str, year: Option<i32>) -> CatalogMatch {
        let title = title.trim();
        if title.is_empty() {
            return CatalogMatch::Unmatched {
                reason: UnmatchedReason::InvalidInput("empty title".to_string()),
            };
        }

        let year = match year {
            Some(y) if PLAUSIBLE_YEARS.contains(&y) => Some(y),
            Some(y) => {
                debug!(title, year = y, "Ignoring implausible release year");
                None
            }
            None => None,
        };

        match self.search.search(title, year).await {
            Ok(candidates) => match candidates.into_iter().next() {
                Some(best) => {
                    debug!(title, ?year, catalog_id = %best.catalog_id, "Matched film");
                    CatalogMatch::Matched {
                        catalog_id: best.catalog_id,
                    }
                }
                None => CatalogMatch::Unmatched {
                    reason: UnmatchedReason::NoResults,
                },
            },
            Err(e) => {
                warn!(title, ?year, error = %e, "Catalog search failed");
                CatalogMatch::Unmatched {
                    reason: UnmatchedReason::SearchError(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{BridgeError, CatalogCandidate, CatalogId};
    use mockall::predicate::*;

    mockall::mock! {
        Search {}

        #[async_trait]
        impl CatalogSearch for Search {
            async fn search(&self, title: &str, year: Option<i32>) -> BridgeResult<Vec<CatalogCandidate>>;
        }
    }

    fn candidate(id: u64, title: &str) -> CatalogCandidate {
        CatalogCandidate {
            catalog_id: CatalogId(id),
            title: title.to_string(),
            release_date: None,
        }
    }

    #[tokio::test]
    async fn test_first_candidate_wins() {
        let mut search = MockSearch::new();
        search
            .expect_search()
            .with(eq("Heat"), eq(Some(1995)))
            .times(1)
            .returning(|_, _| Ok(vec![candidate(949, "Heat"), candidate(1, "Heat 2")]));

        let resolver = MatchResolver::new(Arc::new(search));
        let result = resolver.resolve("Heat", Some(1995)).await;

        assert_eq!(
            result,
            CatalogMatch::Matched {
                catalog_id: CatalogId(949)
            }
        );
    }

    #[tokio::test]
    async fn test_no_candidates_is_no_results() {
        let mut search = MockSearch::new();
        search
            .expect_search()
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let resolver = MatchResolver::new(Arc::new(search));

        assert_eq!(
            resolver.resolve("Obscure Short", None).await,
            CatalogMatch::Unmatched {
                reason: UnmatchedReason::NoResults
            }
        );
    }

    #[tokio::test]
    async fn test_search_failure_is_reported_not_raised() {
        let mut search = MockSearch::new();
        search
            .expect_search()
            .times(1)
            .returning(|_, _| Err(BridgeError::CatalogUnavailable("HTTP 503".into())));

        let resolver = MatchResolver::new(Arc::new(search));
        let result = resolver.resolve("Heat", Some(1995)).await;

        match result {
            CatalogMatch::Unmatched {
                reason: UnmatchedReason::SearchError(message),
            } => assert!(message.contains("503")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_implausible_year_is_dropped() {
        let mut search = MockSearch::new();
        search
            .expect_search()
            .with(eq("Metropolis"), eq(None::<i32>))
            .times(1)
            .returning(|_, _| Ok(vec![candidate(19, "Metropolis")]));

        let resolver = MatchResolver::new(Arc::new(search));

        assert!(resolver.resolve("Metropolis", Some(27)).await.catalog_id().is_some());
    }

    #[tokio::test]
    async fn test_blank_title_skips_search() {
        let mut search = MockSearch::new();
        search.expect_search().times(0);

        let resolver = MatchResolver::new(Arc::new(search));

        assert!(matches!(
            resolver.resolve("   ", Some(2000)).await,
            CatalogMatch::Unmatched {
                reason: UnmatchedReason::InvalidInput(_)
            }
        ));
    }
}
