use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{
        FetchKey, FetchTicket, Movie, MovieId, Notifier, SearchResult, EMPTY_QUERY_MESSAGE,
        FETCH_FAILED_MESSAGE, NO_RESULTS_MESSAGE,
    },
};

/// Where the current fetch key is in its lifecycle
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// No query submitted yet
    Idle,
    Pending,
    /// Succeeded with at least one movie
    Loaded,
    /// Succeeded with zero movies; not an error
    Empty,
    Failed,
}

/// Snapshot of controller state for renderers
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchView {
    pub query: Option<String>,
    pub page: u32,
    pub phase: SearchPhase,
    pub loading: bool,
    pub movies: Vec<Movie>,
    pub total_pages: u32,
    pub show_pagination: bool,
    pub error: Option<String>,
    pub selected: Option<Movie>,
}

/// Owns the search state and decides when a fetch is needed
///
/// The controller never performs I/O. Operations that change the fetch key
/// hand back a [`FetchTicket`]; whoever owns the controller runs the fetch and
/// feeds the outcome to [`SearchController::resolve`]. Outcomes for any ticket
/// other than the most recently issued one are dropped.
pub struct SearchController {
    query: Option<String>,
    page: u32,
    selected: Option<Movie>,
    phase: SearchPhase,
    result: Option<SearchResult>,
    /// Previous page kept on screen while the next page of the same query loads
    placeholder: Option<SearchResult>,
    /// Page count of the last result for the active query
    known_total_pages: Option<u32>,
    error: Option<String>,
    active: Option<FetchTicket>,
    next_seq: u64,
    notifier: Notifier,
}

impl SearchController {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            query: None,
            page: 1,
            selected: None,
            phase: SearchPhase::Idle,
            result: None,
            placeholder: None,
            known_total_pages: None,
            error: None,
            active: None,
            next_seq: 0,
            notifier,
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == SearchPhase::Pending
    }

    pub fn selected(&self) -> Option<&Movie> {
        self.selected.as_ref()
    }

    /// Submits raw search input
    ///
    /// Blank input emits a warning and leaves every piece of state untouched.
    /// A new query always restarts at page 1.
    pub fn submit_query(&mut self, raw: &str) -> AppResult<Option<FetchTicket>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.notifier.error(EMPTY_QUERY_MESSAGE);
            return Err(AppError::Validation(EMPTY_QUERY_MESSAGE.to_string()));
        }

        let query_changed = self.query.as_deref() != Some(trimmed);
        if query_changed {
            self.known_total_pages = None;
            self.placeholder = None;
        }

        Ok(self.set_key(trimmed.to_string(), 1, query_changed))
    }

    /// Moves to another page of the active query
    ///
    /// Pages above the last known page count are rejected rather than clamped.
    pub fn change_page(&mut self, page: u32) -> AppResult<Option<FetchTicket>> {
        let query = self
            .query
            .clone()
            .ok_or_else(|| AppError::Validation("No active search query".to_string()))?;

        if page == 0 {
            return Err(AppError::Validation("Page numbers start at 1".to_string()));
        }
        if page == self.page && self.phase != SearchPhase::Failed {
            return Ok(None);
        }
        if let Some(total) = self.known_total_pages {
            if total == 0 {
                return Err(AppError::Validation(format!(
                    "No results to page through for \"{}\"",
                    query
                )));
            }
            if page > total {
                return Err(AppError::Validation(format!(
                    "Page {} is out of range (1-{})",
                    page, total
                )));
            }
        }

        Ok(self.set_key(query, page, false))
    }

    /// Focuses a movie from the displayed results
    pub fn select_movie(&mut self, id: MovieId) -> AppResult<&Movie> {
        let movie = self
            .displayed()
            .and_then(|result| result.movies.iter().find(|m| m.id == id))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Movie {} is not displayed", id)))?;

        Ok(&*self.selected.insert(movie))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Applies a fetch outcome
    ///
    /// Returns false when the ticket has been superseded and the outcome was
    /// discarded.
    pub fn resolve(&mut self, ticket: &FetchTicket, outcome: AppResult<SearchResult>) -> bool {
        if self.active.as_ref() != Some(ticket) {
            tracing::debug!(
                key = %ticket.key,
                seq = ticket.seq,
                "Discarding superseded search outcome"
            );
            return false;
        }

        self.placeholder = None;

        match outcome {
            Ok(result) => {
                self.known_total_pages = Some(result.total_pages);
                self.error = None;
                if result.is_empty() {
                    self.phase = SearchPhase::Empty;
                    self.notifier.info(NO_RESULTS_MESSAGE);
                } else {
                    self.phase = SearchPhase::Loaded;
                }
                self.result = Some(result);
            }
            Err(e) => {
                tracing::warn!(
                    key = %ticket.key,
                    fetch_error = e.is_fetch_error(),
                    error = %e,
                    "Movie search failed"
                );
                self.phase = SearchPhase::Failed;
                self.result = None;
                self.error = Some(e.to_string());
                self.notifier.error(FETCH_FAILED_MESSAGE);
            }
        }

        true
    }

    pub fn view(&self) -> SearchView {
        let displayed = self.displayed();
        let total_pages = displayed.map(|r| r.total_pages).unwrap_or(0);

        SearchView {
            query: self.query.clone(),
            page: self.page,
            phase: self.phase,
            loading: self.is_pending(),
            movies: displayed.map(|r| r.movies.clone()).unwrap_or_default(),
            total_pages,
            show_pagination: self.phase == SearchPhase::Loaded && total_pages > 1,
            error: self.error.clone(),
            selected: self.selected.clone(),
        }
    }

    fn displayed(&self) -> Option<&SearchResult> {
        match self.phase {
            SearchPhase::Pending => self.placeholder.as_ref(),
            _ => self.result.as_ref(),
        }
    }

    /// Records the new (query, page) pair and issues a ticket if it changed
    ///
    /// A failed key is always re-issued so the user can retry by resubmitting.
    fn set_key(&mut self, query: String, page: u32, query_changed: bool) -> Option<FetchTicket> {
        let key = FetchKey::new(query, page);
        let unchanged = self.active.as_ref().map(|t| &t.key) == Some(&key);
        if unchanged && self.phase != SearchPhase::Failed {
            return None;
        }

        if !query_changed && self.phase == SearchPhase::Loaded {
            self.placeholder = self.result.clone();
        }

        self.next_seq += 1;
        let ticket = FetchTicket {
            key,
            seq: self.next_seq,
        };

        self.query = Some(ticket.key.query.clone());
        self.page = ticket.key.page;
        self.phase = SearchPhase::Pending;
        self.result = None;
        self.error = None;
        self.active = Some(ticket.clone());

        tracing::debug!(key = %ticket.key, seq = ticket.seq, "Search key changed");

        Some(ticket)
    }
}
