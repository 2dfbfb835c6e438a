//! Search orchestration: fetch → parse → locate → extract.

use scraper::Html;
use trolley_core::ProductRecord;

use crate::catalog::STORE_CATALOG;
use crate::client::TrolleyClient;
use crate::error::ScraperError;
use crate::extract::extract_product;
use crate::locate::locate_containers;

/// How many containers beyond `max_results` are scanned to absorb
/// extraction failures and store-filter rejections.
const OVER_FETCH_FACTOR: usize = 3;

/// Searches the price-comparison site for `query` and returns up to
/// `max_results` normalized records, optionally keeping only records whose
/// resolved store matches `store_filter`.
///
/// Low yield is not a failure: the result may hold fewer records than
/// requested, or none at all.
///
/// # Errors
///
/// Returns [`ScraperError`] when the page itself cannot be fetched or
/// parsed. Failures local to one result node are logged and skipped.
pub async fn search_products(
    client: &TrolleyClient,
    query: &str,
    max_results: usize,
    store_filter: Option<&str>,
) -> Result<Vec<ProductRecord>, ScraperError> {
    tracing::info!(query, max_results, "searching for products");

    let markup = client.fetch_search_page(query).await?;
    let records = extract_search_results(&markup, client.base_url(), max_results, store_filter);

    tracing::info!(query, count = records.len(), "search complete");
    Ok(records)
}

/// Extracts records from raw search-page markup.
///
/// Synchronous on purpose: `scraper::Html` is not `Send`, so the document
/// tree is built and fully consumed here without ever crossing an await
/// point in the async callers.
#[must_use]
pub fn extract_search_results(
    markup: &str,
    base_url: &str,
    max_results: usize,
    store_filter: Option<&str>,
) -> Vec<ProductRecord> {
    let document = Html::parse_document(markup);
    let containers = locate_containers(&document);
    tracing::debug!(count = containers.len(), "located product containers");

    let scan_cap = max_results.saturating_mul(OVER_FETCH_FACTOR);
    let mut records = Vec::new();

    for node in containers.into_iter().take(scan_cap) {
        if records.len() >= max_results {
            break;
        }

        let Some(record) = extract_product(node, base_url) else {
            tracing::warn!("failed to extract product fields from container; skipping");
            continue;
        };

        if let Some(filter) = store_filter {
            if !store_matches_filter(&record.store, filter) {
                continue;
            }
        }

        records.push(record);
    }

    records
}

/// Store-filter matching, two redundant paths kept deliberately:
/// a direct case-insensitive substring test against the resolved store
/// name, then a cross-check against catalog key/value aliases (a filter
/// naming any alias of the resolved store also matches).
fn store_matches_filter(store: &str, filter: &str) -> bool {
    let filter_lower = filter.trim().to_lowercase();
    if filter_lower.is_empty() {
        return true;
    }

    let store_lower = store.to_lowercase();
    if store_lower.contains(&filter_lower) {
        return true;
    }

    STORE_CATALOG.iter().any(|(key, canonical)| {
        (key.contains(&filter_lower)
            || filter_lower.contains(key)
            || canonical.to_lowercase().contains(&filter_lower))
            && canonical.to_lowercase() == store_lower
    })
}
