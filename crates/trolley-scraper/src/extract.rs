//! Field extraction for a single result node.
//!
//! The listing pages render each product as one blob of concatenated,
//! delimiter-free text (`"800gHovisSeed Sensations...269£1.95£0.24 per
//! 100g"`). Extraction peels fields off that buffer in a strict order —
//! price, size, brand, then cleanup — each step consuming its match so the
//! later steps only see the remainder. The order and the first-match-only
//! rule are load-bearing: ambiguous tokens are resolved purely by position
//! and pattern priority, never by semantics.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use trolley_core::ProductRecord;

use crate::catalog::KNOWN_BRANDS;
use crate::store::resolve_store;

/// Price reported when no `£d.dd` token can be found anywhere in the node.
pub const PRICE_SENTINEL: &str = "Price not available";

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"£\d+\.\d{2}").expect("valid regex"));

/// Leading quantity token: digits (optionally fractional) immediately
/// followed by a unit abbreviation. Longer units first so "kg" is not read
/// as a bare "g" with a stray "k".
static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+(?:\.\d+)?(?:kg|ml|lb|oz|g|l)").expect("valid regex"));

/// Generic brand fallback: one or two capitalized words at the front.
static GENERIC_BRAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+(?: [A-Z][a-z]+)?").expect("valid regex"));

static LEADING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+").expect("valid regex"));
static TRAILING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+$").expect("valid regex"));
static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Extracts a [`ProductRecord`] from one result container.
///
/// Fails soft: any missing anchor, empty name buffer, or unresolvable URL
/// yields `None` so a single bad node never aborts the batch. Emitted
/// records always have a non-empty `name` and `url`.
#[must_use]
pub fn extract_product(node: ElementRef<'_>, base_url: &str) -> Option<ProductRecord> {
    let anchor_selector = Selector::parse("a").expect("valid selector");
    let anchor = node.select(&anchor_selector).next()?;

    let buffer = anchor.text().collect::<String>().trim().to_string();
    if buffer.is_empty() {
        return None;
    }

    let (price_in_buffer, name) = split_price(&buffer);
    let price = price_in_buffer
        .or_else(|| price_from_sub_elements(node))
        .unwrap_or_else(|| PRICE_SENTINEL.to_string());

    let (size, name) = split_leading_size(&name);
    let (brand, name) = split_leading_brand(&name);
    let name = clean_name(&name);
    if name.is_empty() {
        return None;
    }

    let store = resolve_store(node);
    let url = absolute_url(base_url, anchor.value().attr("href")?)?;

    Some(ProductRecord {
        name,
        price,
        brand: brand.unwrap_or_default(),
        size: size.unwrap_or_default(),
        store,
        url,
    })
}

/// Splits the leftmost `£d.dd` token out of the name buffer.
///
/// Everything from the price onward (unit pricing like "£0.24 per 100g"
/// included) is discarded from the name.
fn split_price(buffer: &str) -> (Option<String>, String) {
    match PRICE_RE.find(buffer) {
        Some(m) => (
            Some(m.as_str().to_string()),
            buffer[..m.start()].to_string(),
        ),
        None => (None, buffer.to_string()),
    }
}

/// Fallback price scan over price-flavored sub-elements of the node.
fn price_from_sub_elements(node: ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse("[class*=\"price\"], [class*=\"cost\"]").expect("valid selector");
    for element in node.select(&selector) {
        let text = element.text().collect::<String>();
        if let Some(m) = PRICE_RE.find(&text) {
            return Some(m.as_str().to_string());
        }
    }
    None
}

/// Strips a leading quantity token ("800g", "1.75l") from the buffer.
fn split_leading_size(buffer: &str) -> (Option<String>, String) {
    match SIZE_RE.find(buffer) {
        Some(m) => (
            Some(m.as_str().to_string()),
            buffer[m.end()..].trim_start().to_string(),
        ),
        None => (None, buffer.to_string()),
    }
}

/// Strips a leading brand from the buffer.
///
/// Known-brand literals are tested first, in list order; only when none
/// matches does the generic capitalized-words pattern run. The literal list
/// exists because the blob has no delimiter between brand and product name,
/// so "HovisSeed Sensations" needs "Hovis" recognized as an exact prefix.
fn split_leading_brand(buffer: &str) -> (Option<String>, String) {
    for brand in KNOWN_BRANDS {
        if buffer.starts_with(brand) {
            return (
                Some((*brand).to_string()),
                buffer[brand.len()..].trim_start().to_string(),
            );
        }
    }

    match GENERIC_BRAND_RE.find(buffer) {
        Some(m) => (
            Some(m.as_str().to_string()),
            buffer[m.end()..].trim_start().to_string(),
        ),
        None => (None, buffer.to_string()),
    }
}

/// Final name cleanup: strip leading/trailing digit runs (item counts and
/// review scores bleed into the blob), collapse whitespace runs, trim.
fn clean_name(buffer: &str) -> String {
    let stripped = LEADING_DIGITS_RE.replace(buffer, "");
    let stripped = TRAILING_DIGITS_RE.replace(&stripped, "");
    WHITESPACE_RUN_RE
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Resolves `href` against the site base URL to an absolute URL.
fn absolute_url(base_url: &str, href: &str) -> Option<String> {
    let base = reqwest::Url::parse(base_url).ok()?;
    let joined = base.join(href).ok()?;
    Some(joined.to_string())
}
