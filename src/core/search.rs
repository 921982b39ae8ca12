use crate::domain::model::SearchResult;
use crate::domain::ports::Geocoder;
use crate::utils::format::short_place_name;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const NOT_FOUND_NOTICE: &str =
    "Location not found. Try searching for: German University, Cairo University, New Cairo, etc.";
pub const FAILED_NOTICE: &str = "Search failed. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Fresh results, now the session's visible list.
    Results(Vec<SearchResult>),
    NoResults,
    Failed,
    /// A newer query was issued while this one was in flight.
    Stale,
    /// Blank query; nothing was sent.
    Skipped,
}

impl SearchOutcome {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SearchOutcome::NoResults => Some(NOT_FOUND_NOTICE),
            SearchOutcome::Failed => Some(FAILED_NOTICE),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    results: Vec<SearchResult>,
    results_visible: bool,
    searching: bool,
}

/// Free-text place search where only the newest query may update state.
///
/// Older requests are not cancelled; their responses are dropped on arrival.
pub struct SearchSession<G: Geocoder> {
    geocoder: G,
    latest: AtomicU64,
    state: Mutex<SearchState>,
}

impl<G: Geocoder> SearchSession<G> {
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            latest: AtomicU64::new(0),
            state: Mutex::new(SearchState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return SearchOutcome::Skipped;
        }

        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state();
            state.query = query.to_string();
            state.results_visible = false;
            state.searching = true;
        }

        tracing::debug!("Geocoding '{}' (request #{})", trimmed, ticket);
        let response = self.geocoder.geocode(trimmed).await;

        if self.latest.load(Ordering::SeqCst) != ticket {
            tracing::debug!("Discarding stale geocoding response for '{}'", trimmed);
            return SearchOutcome::Stale;
        }

        let mut state = self.state();
        state.searching = false;
        match response {
            Ok(results) if results.is_empty() => {
                tracing::info!("No places found for '{}'", trimmed);
                SearchOutcome::NoResults
            }
            Ok(results) => {
                tracing::info!("Found {} places for '{}'", results.len(), trimmed);
                state.results = results.clone();
                state.results_visible = true;
                SearchOutcome::Results(results)
            }
            Err(e) => {
                tracing::error!("Geocoding '{}' failed: {}", trimmed, e);
                SearchOutcome::Failed
            }
        }
    }

    /// Picks a listed result, hides the list and shortens the query text to
    /// the place's first name segment.
    pub fn select_result(&self, index: usize) -> Option<SearchResult> {
        let mut state = self.state();
        let result = state.results.get(index).cloned()?;
        state.query = short_place_name(&result.display_name).to_string();
        state.results_visible = false;
        Some(result)
    }

    pub fn query(&self) -> String {
        self.state().query.clone()
    }

    pub fn results(&self) -> Vec<SearchResult> {
        self.state().results.clone()
    }

    pub fn results_visible(&self) -> bool {
        self.state().results_visible
    }

    pub fn is_searching(&self) -> bool {
        self.state().searching
    }
}
