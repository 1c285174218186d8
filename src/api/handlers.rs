use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{MovieId, Notice, SearchResult, EMPTY_QUERY_MESSAGE},
    services::{catalog::DEFAULT_PAGE, controller::SearchView},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct MovieSearchParams {
    pub query: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

#[derive(Debug, Deserialize)]
pub struct ViewParams {
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePageRequest {
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct SelectMovieRequest {
    pub movie_id: MovieId,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub view: SearchView,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// One-shot catalog search, no session involved
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<MovieSearchParams>,
) -> AppResult<Json<SearchResult>> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation(EMPTY_QUERY_MESSAGE.to_string()));
    }
    if params.page == 0 {
        return Err(AppError::Validation("Page numbers start at 1".to_string()));
    }

    let result = state.catalog.search(query, params.page).await?;
    Ok(Json(result))
}

/// Start a new search session
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session = state.create_session().await;
    let response = SessionResponse {
        session_id: session.id(),
        view: session.view().await,
    };

    (StatusCode::CREATED, Json(response))
}

/// Current view of a session; with `wait=true` blocks until the pending fetch settles
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ViewParams>,
) -> AppResult<Json<SearchView>> {
    let session = state.session(id).await?;
    let view = if params.wait {
        session.settled_view(state.settle_timeout).await
    } else {
        session.view().await
    };
    Ok(Json(view))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.remove_session(id).await?;
    tracing::info!(session_id = %id, "Search session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// Submit a search query
pub async fn submit_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitQueryRequest>,
) -> AppResult<(StatusCode, Json<SearchView>)> {
    let session = state.session(id).await?;
    let view = session.submit(&request.query).await?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// Move to another page of the active query
pub async fn change_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangePageRequest>,
) -> AppResult<(StatusCode, Json<SearchView>)> {
    let session = state.session(id).await?;
    let view = session.change_page(request.page).await?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// Open a movie's details
pub async fn select_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectMovieRequest>,
) -> AppResult<Json<SearchView>> {
    let session = state.session(id).await?;
    let view = session.select(request.movie_id).await?;
    Ok(Json(view))
}

pub async fn clear_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SearchView>> {
    let session = state.session(id).await?;
    Ok(Json(session.clear_selection().await))
}

/// Drain queued toast notifications
pub async fn notifications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Notice>>> {
    let session = state.session(id).await?;
    Ok(Json(session.drain_notices().await))
}
