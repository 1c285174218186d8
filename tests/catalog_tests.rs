use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use movie_search::{
    error::AppError,
    services::{catalog::tmdb::MAX_PAGE, MovieCatalog, TmdbCatalog},
};

const TOKEN: &str = "test-read-token";

/// Minimal stand-in for TMDB's /search/movie
async fn fake_search(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let expected = format!("Bearer {}", TOKEN);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status_message": "Invalid API key" })),
        );
    }

    let query = params.get("query").cloned().unwrap_or_default();
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);

    match query.as_str() {
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status_message": "Internal error" })),
        ),
        "nothing" => (
            StatusCode::OK,
            Json(json!({ "page": 1, "results": [], "total_pages": 0, "total_results": 0 })),
        ),
        "love" => (
            StatusCode::OK,
            Json(json!({
                "page": page,
                "results": [{ "id": 1, "title": "Love" }],
                "total_pages": 812,
                "total_results": 16234
            })),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({
                "page": page,
                "results": [{
                    "id": 268,
                    "title": format!("{} (page {})", query, page),
                    "poster_path": "/cij4dd21v2Rk2YtUQbV5kW69WB2.jpg",
                    "vote_count": 7936
                }],
                "total_pages": 4,
                "total_results": 61
            })),
        ),
    }
}

async fn spawn_fake_tmdb() -> String {
    let app = Router::new().route("/3/search/movie", get(fake_search));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/3", addr)
}

fn catalog(api_url: String, token: &str) -> TmdbCatalog {
    TmdbCatalog::new(api_url, token.to_string(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_search_passes_query_and_page() {
    let api_url = spawn_fake_tmdb().await;
    let result = catalog(api_url, TOKEN).search("batman", 2).await.unwrap();

    assert_eq!(result.movies.len(), 1);
    assert_eq!(result.movies[0].title, "batman (page 2)");
    assert_eq!(result.movies[0].extra["vote_count"], 7936);
    assert_eq!(result.total_pages, 4);
    assert_eq!(result.total_results, 61);
}

#[tokio::test]
async fn test_empty_results_are_success() {
    let api_url = spawn_fake_tmdb().await;
    let result = catalog(api_url, TOKEN).search("nothing", 1).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.total_pages, 0);
}

#[tokio::test]
async fn test_total_pages_capped() {
    let api_url = spawn_fake_tmdb().await;
    let result = catalog(api_url, TOKEN).search("love", 1).await.unwrap();

    assert_eq!(result.total_pages, MAX_PAGE);
    assert_eq!(result.total_results, 16234);
}

#[tokio::test]
async fn test_error_status_is_fetch_error() {
    let api_url = spawn_fake_tmdb().await;
    let error = catalog(api_url, TOKEN).search("boom", 1).await.unwrap_err();

    assert!(error.is_fetch_error());
    match error {
        AppError::ExternalApi(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("Internal error"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_wrong_token_rejected() {
    let api_url = spawn_fake_tmdb().await;
    let error = catalog(api_url, "wrong").search("batman", 1).await.unwrap_err();

    assert!(matches!(error, AppError::ExternalApi(ref m) if m.contains("401")));
}

#[tokio::test]
async fn test_transport_failure_is_fetch_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let error = catalog(format!("http://{}/3", addr), TOKEN)
        .search("batman", 1)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::HttpClient(_)));
    assert!(error.is_fetch_error());
}
