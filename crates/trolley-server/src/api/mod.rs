mod batch;
mod price;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use trolley_core::ProductRecord;
use trolley_scraper::TrolleyClient;

use crate::cache::{cache_key, ResponseCache};
use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<TrolleyClient>,
    pub cache: Arc<ResponseCache<SearchResponse>>,
}

/// Per-route and service-wide request ceilings.
#[derive(Clone)]
pub struct RateLimits {
    pub price: RateLimitState,
    pub batch: RateLimitState,
    pub global: RateLimitState,
}

impl RateLimits {
    #[must_use]
    pub fn from_config(config: &trolley_core::AppConfig) -> Self {
        Self {
            price: RateLimitState::per_minute(config.price_rate_limit_per_min),
            batch: RateLimitState::per_minute(config.batch_rate_limit_per_min),
            global: RateLimitState::per_hour(config.global_rate_limit_per_hour),
        }
    }
}

/// Fixed error body shape: `{error, message}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: "Failed to fetch product data".to_string(),
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

/// Envelope returned for one search, cached as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<ProductRecord>,
    pub metadata: SearchMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub total_results: usize,
    pub max_results: usize,
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
}

/// Cache-aware search shared by the single and batch routes.
///
/// Single-flight: on a miss the per-key flight lock is taken and the cache
/// re-checked before fetching, so concurrent identical queries perform one
/// upstream fetch between them.
pub(super) async fn run_search(
    state: &AppState,
    query: &str,
    max_results: usize,
    store_filter: Option<&str>,
) -> Result<SearchResponse, ApiError> {
    let key = cache_key(query, max_results, store_filter);

    if let Some(hit) = state.cache.get(&key).await {
        return Ok(mark_cached(hit));
    }

    let _flight = state.cache.begin_flight(&key).await;
    if let Some(hit) = state.cache.get(&key).await {
        return Ok(mark_cached(hit));
    }

    let results =
        trolley_scraper::search_products(&state.client, query, max_results, store_filter)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, query, "search failed");
                ApiError::internal(e.to_string())
            })?;

    let response = SearchResponse {
        query: query.to_string(),
        metadata: SearchMetadata {
            total_results: results.len(),
            max_results,
            cached: false,
            timestamp: Utc::now(),
        },
        results,
    };

    state.cache.insert(key, response.clone()).await;
    Ok(response)
}

fn mark_cached(mut response: SearchResponse) -> SearchResponse {
    response.metadata.cached = true;
    response
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: AppState, limits: RateLimits) -> Router {
    let price_routes = Router::new()
        .route("/api/price", get(price::get_prices))
        .layer(axum::middleware::from_fn_with_state(
            limits.price,
            enforce_rate_limit,
        ));

    let batch_routes = Router::new()
        .route("/api/batch", post(batch::batch_prices))
        .layer(axum::middleware::from_fn_with_state(
            limits.batch,
            enforce_rate_limit,
        ));

    Router::new()
        .route("/", get(home))
        .route("/api/health", get(health))
        .route("/api/cache/clear", post(clear_cache))
        .merge(price_routes)
        .merge(batch_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(axum::middleware::from_fn_with_state(
                    limits.global,
                    enforce_rate_limit,
                )),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HomeData {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    endpoints: serde_json::Value,
}

async fn home() -> impl IntoResponse {
    Json(HomeData {
        status: "online",
        service: "Trolley Price Scraper API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: serde_json::json!({
            "/api/price": "GET - Search for product prices",
            "/api/batch": "POST - Search for multiple products",
            "/api/health": "GET - Health check",
        }),
    })
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    cache_size: usize,
    timestamp: DateTime<Utc>,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthData {
        status: "healthy",
        cache_size: state.cache.len().await,
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize)]
struct CacheClearData {
    message: String,
    timestamp: DateTime<Utc>,
}

async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    let removed = state.cache.clear().await;
    tracing::info!(removed, "cache cleared");
    Json(CacheClearData {
        message: format!("Cache cleared. Removed {removed} entries."),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const PRODUCT_PAGE: &str = r#"<html><body>
        <div class="product-item"><a href="/product/a">800gHovisSeed Sensations Seven Seeds Medium Sliced Seeded Bread269£1.95£0.24 per 100g</a></div>
        <div class="product-item"><a href="/store/tesco/b">700gWarburtonsToastie White Loaf£1.10</a></div>
        <div class="product-item"><a href="/product/c">400gKingsmill50/50 Medium Bread£0.95</a></div>
    </body></html>"#;

    fn test_app(upstream: &str, price_limit: usize) -> Router {
        let client = TrolleyClient::new(upstream, 5, "trolley-test/0.1").expect("client builds");
        let state = AppState {
            client: Arc::new(client),
            cache: Arc::new(ResponseCache::new(Duration::from_secs(60))),
        };
        let limits = RateLimits {
            price: RateLimitState::per_minute(price_limit),
            batch: RateLimitState::per_minute(5),
            global: RateLimitState::per_hour(100),
        };
        build_app(state, limits)
    }

    async fn mock_search_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
            .mount(&server)
            .await;
        server
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn price_without_query_is_bad_request() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 10);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/price")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn price_with_short_query_is_bad_request() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 10);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/price?query=a")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // -----------------------------------------------------------------------
    // Single search envelope and caching
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn price_returns_envelope_and_marks_cache_hits() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 10);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/price?query=bread&max_results=2")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["query"].as_str(), Some("bread"));
        assert_eq!(json["metadata"]["cached"].as_bool(), Some(false));
        assert_eq!(json["metadata"]["total_results"].as_u64(), Some(2));
        assert_eq!(json["results"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["results"][0]["price"].as_str(), Some("£1.95"));
        assert_eq!(json["results"][0]["brand"].as_str(), Some("Hovis"));

        // Same query again: served from cache, one upstream request total.
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/price?query=bread&max_results=2")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["metadata"]["cached"].as_bool(), Some(true));
        assert_eq!(
            server.received_requests().await.expect("requests").len(),
            1,
            "second call must be a cache hit"
        );
    }

    #[tokio::test]
    async fn price_passes_store_filter_through() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 10);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/price?query=bread&store=tesco")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let results = json["results"].as_array().expect("results");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["store"].as_str(), Some("Tesco"));
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_500_with_fixed_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let app = test_app(&server.uri(), 10);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/price?query=bread")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
        assert!(json["message"].is_string());
    }

    // -----------------------------------------------------------------------
    // Batch
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn batch_mixes_results_and_per_query_errors() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 10);
        let body = serde_json::json!({
            "queries": ["bread", "a", "milk"],
            "max_results_per_query": 2,
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/batch")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;

        let results = &json["batch_results"];
        assert!(results["bread"]["results"].is_array());
        assert!(results["milk"]["results"].is_array());
        assert!(
            results["a"]["error"].is_string(),
            "short query must get a per-query error marker"
        );
        assert_eq!(json["metadata"]["total_queries"].as_u64(), Some(3));
        assert_eq!(json["metadata"]["successful_queries"].as_u64(), Some(2));
    }

    #[tokio::test]
    async fn batch_rejects_more_than_five_queries() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 10);
        let body = serde_json::json!({
            "queries": ["a1", "b1", "c1", "d1", "e1", "f1"],
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/batch")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn batch_rejects_empty_query_list() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 10);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/batch")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"queries": []}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // -----------------------------------------------------------------------
    // Rate limiting and housekeeping routes
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn price_route_rate_limits_with_429() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 1);

        let first = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/price?query=bread")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(
                Request::builder()
                    .uri("/api/price?query=milk")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = body_json(second).await;
        assert!(json["error"].is_string());
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn global_ceiling_applies_across_routes() {
        let server = mock_search_server().await;
        let client =
            TrolleyClient::new(&server.uri(), 5, "trolley-test/0.1").expect("client builds");
        let state = AppState {
            client: Arc::new(client),
            cache: Arc::new(ResponseCache::new(Duration::from_secs(60))),
        };
        let limits = RateLimits {
            price: RateLimitState::per_minute(10),
            batch: RateLimitState::per_minute(5),
            global: RateLimitState::per_hour(2),
        };
        let app = build_app(state, limits);

        for uri in ["/api/health", "/"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }

        let third = app
            .oneshot(
                Request::builder()
                    .uri("/api/price?query=bread")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn health_reports_cache_size() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 10);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"].as_str(), Some("healthy"));
        assert_eq!(json["cache_size"].as_u64(), Some(0));
    }

    #[tokio::test]
    async fn cache_clear_reports_removed_entries() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 10);

        let warm = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/price?query=bread")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(warm.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/cache/clear")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json["message"].as_str(),
            Some("Cache cleared. Removed 1 entries.")
        );
    }

    #[tokio::test]
    async fn responses_carry_request_id_header() {
        let server = mock_search_server().await;
        let app = test_app(&server.uri(), 10);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("x-request-id", "req-test-1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .map(|v| v.to_str().map_err(|_| ())),
            Some(Ok("req-test-1"))
        );
    }
}
