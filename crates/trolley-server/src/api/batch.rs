use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{run_search, ApiError, AppState, SearchResponse};

const DEFAULT_MAX_RESULTS_PER_QUERY: usize = 3;
const MAX_RESULTS_PER_QUERY_CEILING: usize = 10;
const MAX_BATCH_QUERIES: usize = 5;

#[derive(Debug, Deserialize)]
pub(super) struct BatchRequest {
    queries: Option<Vec<String>>,
    max_results_per_query: Option<usize>,
}

/// One slot in the batch result map: either a full search envelope or a
/// per-query error marker. Failures in one query never fail the batch.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BatchEntry {
    Ok(SearchResponse),
    Err { error: String },
}

#[derive(Debug, Serialize)]
pub(super) struct BatchResponse {
    batch_results: BTreeMap<String, BatchEntry>,
    metadata: BatchMetadata,
}

#[derive(Debug, Serialize)]
struct BatchMetadata {
    total_queries: usize,
    successful_queries: usize,
    max_results_per_query: usize,
    timestamp: DateTime<Utc>,
}

/// `POST /api/batch` — search for up to five products in one call.
pub(super) async fn batch_prices(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let queries = request.queries.unwrap_or_default();
    if queries.is_empty() {
        return Err(ApiError::bad_request(
            "Missing queries",
            "Provide a non-empty \"queries\" array",
        ));
    }
    if queries.len() > MAX_BATCH_QUERIES {
        return Err(ApiError::bad_request(
            "Too many queries",
            format!("Batch requests are limited to {MAX_BATCH_QUERIES} queries"),
        ));
    }

    let max_results = request
        .max_results_per_query
        .unwrap_or(DEFAULT_MAX_RESULTS_PER_QUERY)
        .clamp(1, MAX_RESULTS_PER_QUERY_CEILING);

    tracing::info!(total = queries.len(), max_results, "batch lookup");

    let mut batch_results = BTreeMap::new();
    let mut successful_queries = 0;

    for raw in &queries {
        let query = raw.trim();
        if query.chars().count() < 2 {
            batch_results.insert(
                raw.clone(),
                BatchEntry::Err {
                    error: "Query must be at least 2 characters".to_string(),
                },
            );
            continue;
        }

        match run_search(&state, query, max_results, None).await {
            Ok(response) => {
                successful_queries += 1;
                batch_results.insert(raw.clone(), BatchEntry::Ok(response));
            }
            Err(err) => {
                tracing::warn!(query, error = %err.message, "batch query failed");
                batch_results.insert(raw.clone(), BatchEntry::Err { error: err.error });
            }
        }
    }

    Ok(Json(BatchResponse {
        metadata: BatchMetadata {
            total_queries: queries.len(),
            successful_queries,
            max_results_per_query: max_results,
            timestamp: Utc::now(),
        },
        batch_results,
    }))
}
