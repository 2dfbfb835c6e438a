use crate::app_config::AppConfig;
use crate::ConfigError;

/// Default user agent: a realistic browser string. The target site serves
/// plain HTML to browsers; a bare library UA is more likely to be blocked.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set variable has an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a set variable has an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a present value fails to parse.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let bind_addr = parse_addr("TROLLEY_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("TROLLEY_LOG_LEVEL", "info");
    let base_url = or_default("TROLLEY_BASE_URL", "https://www.trolley.co.uk");
    let request_timeout_secs = parse_u64("TROLLEY_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("TROLLEY_USER_AGENT", DEFAULT_USER_AGENT);
    let cache_ttl_secs = parse_u64("TROLLEY_CACHE_TTL_SECS", "3600")?;
    let price_rate_limit_per_min = parse_usize("TROLLEY_PRICE_RATE_LIMIT_PER_MIN", "10")?;
    let batch_rate_limit_per_min = parse_usize("TROLLEY_BATCH_RATE_LIMIT_PER_MIN", "5")?;
    let global_rate_limit_per_hour = parse_usize("TROLLEY_GLOBAL_RATE_LIMIT_PER_HOUR", "100")?;

    Ok(AppConfig {
        bind_addr,
        log_level,
        base_url,
        request_timeout_secs,
        user_agent,
        cache_ttl_secs,
        price_rate_limit_per_min,
        batch_rate_limit_per_min,
        global_rate_limit_per_hour,
    })
}
