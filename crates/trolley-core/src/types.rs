//! Domain types shared between the scraper and the API layer.

use serde::{Deserialize, Serialize};

/// One normalized product listing extracted from a search results page.
///
/// Records are produced fresh per search and never persisted. Emitted
/// records always have a non-empty `name` and `url`; candidates that fail
/// that invariant are dropped during extraction rather than emitted blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Cleaned product name, without size/brand/price fragments.
    pub name: String,
    /// Display price (`"£d.dd"`) or the sentinel `"Price not available"`.
    pub price: String,
    /// Brand name, possibly empty when none was recognized.
    pub brand: String,
    /// Pack size such as `"800g"`, possibly empty.
    pub size: String,
    /// Canonical retailer name, or `"Trolley.co.uk"` when unresolved.
    pub store: String,
    /// Absolute URL of the product page.
    pub url: String,
}
