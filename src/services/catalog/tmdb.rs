/// TMDB (The Movie Database) catalog client
///
/// API Flow:
/// 1. Movie search: /search/movie?query=..&page=.. → one page of movies + page count
///
/// Authenticates with a v4 read access token sent as a bearer credential.
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{MoviesResponse, SearchResult},
    services::catalog::MovieCatalog,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const SEARCH_PATH: &str = "/search/movie";
/// TMDB rejects any page above this, whatever total_pages claims
pub const MAX_PAGE: u32 = 500;

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_url: String,
    token: String,
}

impl TmdbCatalog {
    pub fn new(api_url: String, token: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.tmdb_api_url.clone(),
            config.tmdb_token.clone(),
            config.request_timeout(),
        )
    }

    /// Builds the outbound search request without sending it
    fn build_request(&self, query: &str, page: u32) -> AppResult<reqwest::Request> {
        let url = format!("{}{}", self.api_url, SEARCH_PATH);

        let request = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("query", query.to_string()), ("page", page.to_string())])
            .build()?;

        Ok(request)
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn search(&self, query: &str, page: u32) -> AppResult<SearchResult> {
        let request = self.build_request(query, page)?;
        let response = self.http_client.execute(request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(query = %query, page, status = %status, "TMDB search rejected");
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let movies: MoviesResponse = response.json().await?;
        let served_page = movies.page;
        let mut result = SearchResult::from(movies);
        result.total_pages = result.total_pages.min(MAX_PAGE);

        tracing::info!(
            query = %query,
            page,
            served_page,
            results = result.movies.len(),
            total_pages = result.total_pages,
            provider = "tmdb",
            "Movie search completed"
        );

        Ok(result)
    }
}
