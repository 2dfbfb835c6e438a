//! Static retailer and brand tables shared by extraction and filtering.
//!
//! All of these lists are matched in the order given; the order is part of
//! the extraction contract (earlier entries win ties), so keep more
//! specific entries ahead of the shorter keywords they contain.

/// Name reported when no retailer signal can be found in a result node.
/// This is the aggregator's own name and means "retailer not identified".
pub const FALLBACK_STORE: &str = "Trolley.co.uk";

/// Lowercase retailer keyword → canonical display name.
///
/// Keys are matched as substrings of lowercased text, URLs, and attribute
/// values, so they must be plain lowercase tokens with no punctuation that
/// could not appear in a URL slug.
pub const STORE_CATALOG: &[(&str, &str)] = &[
    ("sainsburys", "Sainsbury's"),
    ("sainsbury", "Sainsbury's"),
    ("tesco", "Tesco"),
    ("asda", "ASDA"),
    ("morrisons", "Morrisons"),
    ("waitrose", "Waitrose"),
    ("aldi", "Aldi"),
    ("lidl", "Lidl"),
    ("iceland", "Iceland"),
    ("ocado", "Ocado"),
    ("co-op", "Co-op"),
    ("coop", "Co-op"),
    ("marksandspencer", "M&S"),
    ("boots", "Boots"),
    ("superdrug", "Superdrug"),
    ("wilko", "Wilko"),
    ("poundland", "Poundland"),
    ("savers", "Savers"),
    ("homebargains", "Home Bargains"),
    ("amazon", "Amazon"),
];

/// Literal retailer names and common variants searched for in a node's
/// visible text (resolver strategy 1). Broader spellings than the catalog
/// keys: these may contain apostrophes, ampersands, and spaces.
pub const STORE_TEXT_PATTERNS: &[(&str, &str)] = &[
    ("sainsbury's", "Sainsbury's"),
    ("sainsburys", "Sainsbury's"),
    ("marks & spencer", "M&S"),
    ("marks and spencer", "M&S"),
    ("m&s", "M&S"),
    ("tesco", "Tesco"),
    ("asda", "ASDA"),
    ("morrisons", "Morrisons"),
    ("waitrose", "Waitrose"),
    ("aldi", "Aldi"),
    ("lidl", "Lidl"),
    ("iceland", "Iceland"),
    ("ocado", "Ocado"),
    ("co-op", "Co-op"),
    ("boots", "Boots"),
    ("superdrug", "Superdrug"),
    ("home bargains", "Home Bargains"),
    ("poundland", "Poundland"),
];

/// Known grocery brands tested literally at the front of the name buffer
/// before the generic capitalized-words fallback. The listing pages run
/// brand and product name together with no delimiter ("800gHovisSeed
/// Sensations..."), so a literal prefix test is the only reliable signal.
pub const KNOWN_BRANDS: &[&str] = &[
    "Coca-Cola",
    "Coca Cola",
    "Birds Eye",
    "McVitie's",
    "Kellogg's",
    "Ben & Jerry's",
    "Hovis",
    "Warburtons",
    "Kingsmill",
    "Heinz",
    "Cadbury",
    "Walkers",
    "Nescafe",
    "Lurpak",
    "Muller",
    "Pepsi",
    "Ribena",
    "Weetabix",
];
