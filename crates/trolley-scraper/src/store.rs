//! Retailer resolution for a single result node.
//!
//! The aggregator's markup carries the retailer in no fixed place, so the
//! resolver cascades over six independent signal sources and returns on the
//! first hit. It is total: a node with no recognizable retailer signal
//! resolves to [`FALLBACK_STORE`].

use scraper::{ElementRef, Selector};

use crate::catalog::{FALLBACK_STORE, STORE_CATALOG, STORE_TEXT_PATTERNS};

/// Sub-element selectors likely to carry a retailer label (strategy 2).
const STORE_ELEMENT_SELECTORS: &[&str] = &[
    "[class*=\"store\"]",
    "[class*=\"retailer\"]",
    "[class*=\"shop\"]",
    "[class*=\"vendor\"]",
    "[data-store]",
    "[data-retailer]",
];

/// Resolves the retailer name for one result node.
///
/// Strategies, in fixed priority order:
/// 1. named retailer patterns (incl. variants) in the node's visible text
/// 2. store/retailer/shop/vendor sub-elements, normalized via the catalog
/// 3. catalog keywords in the anchor's `href`
/// 4. catalog keywords in image alt text
/// 5. catalog keywords in any attribute value of the node or a descendant
/// 6. catalog keywords anywhere in the node's lowercased text
#[must_use]
pub fn resolve_store(node: ElementRef<'_>) -> String {
    let text_lower = node.text().collect::<String>().to_lowercase();

    // Strategy 1: named patterns in visible text.
    for (pattern, canonical) in STORE_TEXT_PATTERNS {
        if text_lower.contains(pattern) {
            return (*canonical).to_string();
        }
    }

    // Strategy 2: store-flavored sub-elements.
    for css in STORE_ELEMENT_SELECTORS {
        let selector = Selector::parse(css).expect("valid selector");
        if let Some(element) = node.select(&selector).next() {
            let raw = element.text().collect::<String>().trim().to_string();
            if raw.is_empty() {
                continue;
            }
            let raw_lower = raw.to_lowercase();
            for (key, canonical) in STORE_CATALOG {
                if raw_lower.contains(key) {
                    return (*canonical).to_string();
                }
            }
            // Unknown retailer label: present it title-cased rather than
            // discarding the signal.
            return title_case(&raw);
        }
    }

    // Strategy 3: anchor URL keywords.
    let anchor_selector = Selector::parse("a[href]").expect("valid selector");
    if let Some(anchor) = node.select(&anchor_selector).next() {
        if let Some(href) = anchor.value().attr("href") {
            if let Some(name) = catalog_lookup(&href.to_lowercase()) {
                return name;
            }
        }
    }

    // Strategy 4: image alt text.
    let img_selector = Selector::parse("img[alt]").expect("valid selector");
    for image in node.select(&img_selector) {
        if let Some(alt) = image.value().attr("alt") {
            if let Some(name) = catalog_lookup(&alt.to_lowercase()) {
                return name;
            }
        }
    }

    // Strategy 5: any attribute value on the node or its descendants.
    for element in node.descendants().filter_map(ElementRef::wrap) {
        for (_, value) in element.value().attrs() {
            if let Some(name) = catalog_lookup(&value.to_lowercase()) {
                return name;
            }
        }
    }

    // Strategy 6: catalog sweep over the full text (broader net than the
    // named patterns of strategy 1).
    if let Some(name) = catalog_lookup(&text_lower) {
        return name;
    }

    FALLBACK_STORE.to_string()
}

/// First catalog key that appears as a substring of `haystack` (lowercased
/// by the caller), mapped to its canonical display name.
fn catalog_lookup(haystack: &str) -> Option<String> {
    STORE_CATALOG
        .iter()
        .find(|(key, _)| haystack.contains(key))
        .map(|(_, canonical)| (*canonical).to_string())
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
