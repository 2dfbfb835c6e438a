use std::net::SocketAddr;

/// Runtime configuration for the scraper and API server.
///
/// Loaded from `TROLLEY_*` environment variables via
/// [`crate::load_app_config`]; every field has a default so the service
/// starts with no environment at all.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Origin of the price-comparison site. Overridable so tests can point
    /// the fetcher at a local mock server.
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// How long a cached search response stays servable.
    pub cache_ttl_secs: u64,
    /// Per-minute ceiling for the single-search route.
    pub price_rate_limit_per_min: usize,
    /// Per-minute ceiling for the batch route.
    pub batch_rate_limit_per_min: usize,
    /// Hourly ceiling applied across all routes.
    pub global_rate_limit_per_hour: usize,
}
