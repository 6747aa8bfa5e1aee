use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::Serialize;

use data_loader::{MovieId, MovieRecord};
use search::SearchHit;

use super::AppState;
use crate::error::{RankError, RankResult};
use crate::orchestrator::{DEFAULT_SEARCH_LIMIT, RankRequest, RankResponse, normalize_count};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub movies: usize,
    pub users: usize,
}

/// Liveness plus loaded table sizes
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (movies, users) = state.orchestrator.store().counts();
    Json(HealthResponse {
        status: "ok",
        movies,
        users,
    })
}

pub async fn rank(
    State(state): State<AppState>,
    payload: Result<Json<RankRequest>, JsonRejection>,
) -> RankResult<Json<RankResponse>> {
    // An empty store answers before the body is even looked at
    if state.orchestrator.store().is_empty() {
        return Err(RankError::Unavailable("no data loaded".to_string()));
    }

    let Json(request) = payload.map_err(|rejection| {
        RankError::InvalidRequest(format!("invalid json: {}", rejection.body_text()))
    })?;

    state.orchestrator.rank(&request).map(Json)
}

/// `GET /search?q=...&limit=...`
///
/// `limit` is parsed leniently: missing, unparsable or non-positive values
/// fall back to the default.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> RankResult<Json<Vec<SearchHit>>> {
    let query = params
        .get("q")
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| RankError::InvalidRequest("q required".to_string()))?;

    let limit = normalize_count(
        params.get("limit").and_then(|raw| raw.trim().parse().ok()),
        DEFAULT_SEARCH_LIMIT,
    );

    Ok(Json(state.orchestrator.search(query, limit)))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RankResult<Json<MovieRecord>> {
    let movie_id: MovieId = id
        .trim()
        .parse()
        .map_err(|_| RankError::InvalidRequest(format!("invalid movie id: {}", id)))?;

    state.orchestrator.movie(movie_id).cloned().map(Json)
}
