//! Container location: finding the repeating result nodes in a search page.

use scraper::{ElementRef, Html, Selector};

/// Container selector strategies, most structurally specific first.
///
/// The first selector that yields at least one match wins and later entries
/// are never tried, even if the match looks wrong. The target markup is
/// unversioned and drifts; cascading from a data attribute down to generic
/// class substrings tolerates that drift without pinning one schema.
pub const CONTAINER_SELECTORS: &[&str] = &[
    "div[data-product-id]",
    "div.product-item",
    "div[class*=\"product-item\"]",
    "div[class*=\"product\"]",
    "li[class*=\"product\"]",
];

/// Locates candidate product containers in a parsed search results page.
///
/// Returns the result set of the first matching strategy, or an empty vec
/// when nothing matches. A page with no recognizable containers is a valid
/// zero-product result, not an error.
#[must_use]
pub fn locate_containers(document: &Html) -> Vec<ElementRef<'_>> {
    for css in CONTAINER_SELECTORS {
        let selector = Selector::parse(css).expect("valid selector");
        let matches: Vec<ElementRef<'_>> = document.select(&selector).collect();
        if !matches.is_empty() {
            tracing::debug!(selector = css, count = matches.len(), "container strategy matched");
            return matches;
        }
    }

    tracing::debug!("no container strategy matched");
    Vec::new()
}
