/// Movie catalog abstraction
///
/// The search controller only needs one capability from the outside world:
/// turning a (query, page) pair into a page of movies. Keeping it behind a
/// trait lets sessions run against TMDB in production and against mocks or
/// stubs in tests.
use crate::{error::AppResult, models::SearchResult};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

/// Page requested when the caller does not name one
pub const DEFAULT_PAGE: u32 = 1;

/// Trait for movie catalogs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Search movies by free text
    ///
    /// Issues exactly one request per call. No caching or retry happens here;
    /// failures are returned to the caller untouched.
    async fn search(&self, query: &str, page: u32) -> AppResult<SearchResult>;
}
