use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::{run_search, ApiError, AppState, SearchResponse};

const DEFAULT_MAX_RESULTS: usize = 5;
const MAX_RESULTS_CEILING: usize = 20;

#[derive(Debug, Deserialize)]
pub(super) struct PriceParams {
    query: Option<String>,
    max_results: Option<usize>,
    store: Option<String>,
}

/// `GET /api/price` — search for a single product.
pub(super) async fn get_prices(
    State(state): State<AppState>,
    Query(params): Query<PriceParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(
                "Missing query parameter",
                "Provide a product name via ?query=",
            )
        })?;

    if query.chars().count() < 2 {
        return Err(ApiError::bad_request(
            "Query too short",
            "Query must be at least 2 characters",
        ));
    }

    let max_results = params
        .max_results
        .unwrap_or(DEFAULT_MAX_RESULTS)
        .clamp(1, MAX_RESULTS_CEILING);

    let store = params
        .store
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    tracing::info!(query, max_results, store = ?store, "price lookup");
    let response = run_search(&state, query, max_results, store).await?;
    Ok(Json(response))
}
