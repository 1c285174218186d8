use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::Movie;

/// Raw response from TMDB `GET /search/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct MoviesResponse {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<Movie>,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// One page of search results for a single (query, page) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchResult {
    pub movies: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

impl From<MoviesResponse> for SearchResult {
    fn from(response: MoviesResponse) -> Self {
        Self {
            movies: response.results,
            total_pages: response.total_pages,
            total_results: response.total_results,
        }
    }
}

/// Identifies one logical search request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FetchKey {
    pub query: String,
    pub page: u32,
}

impl FetchKey {
    pub fn new(query: impl Into<String>, page: u32) -> Self {
        Self {
            query: query.into(),
            page,
        }
    }
}

impl Display for FetchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.query, self.page)
    }
}

/// A fetch key stamped with the sequence number it was issued under
///
/// Two tickets for the same key are still distinct; only the most recently
/// issued ticket may resolve the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: FetchKey,
    pub seq: u64,
}
