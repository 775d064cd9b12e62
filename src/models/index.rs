//! Market index records and the display whitelist

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One index as returned by the market data endpoint.
///
/// Numeric fields may be missing or `null` upstream; they are rendered as a
/// placeholder instead of failing the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub index: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub change_pct: Option<f64>,
    #[serde(default)]
    pub ytd_pct: Option<f64>,
    #[serde(default)]
    pub week_52_high: Option<f64>,
}

/// Human-facing name and country badge for a whitelisted index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDisplay {
    pub display_name: &'static str,
    pub country_code: &'static str,
}

/// API name -> display entry, in canonical display order.
pub const INDEX_DISPLAY_MAPPING: &[(&str, IndexDisplay)] = &[
    ("Shanghai", IndexDisplay { display_name: "Shanghai", country_code: "CN" }),
    ("CSI 300", IndexDisplay { display_name: "CSI 300", country_code: "CN" }),
    ("Singapore", IndexDisplay { display_name: "STI", country_code: "SG" }),
    ("KOSPI", IndexDisplay { display_name: "KOSPI", country_code: "KR" }),
    ("Nikkei", IndexDisplay { display_name: "Nikkei", country_code: "JP" }),
    ("Hang Seng", IndexDisplay { display_name: "Hang Seng", country_code: "HK" }),
];

lazy_static! {
    static ref DISPLAY_LOOKUP: HashMap<&'static str, IndexDisplay> =
        INDEX_DISPLAY_MAPPING.iter().copied().collect();
}

/// Exact-match lookup of an API index name. Unmapped names yield `None`.
pub fn display_for(api_name: &str) -> Option<IndexDisplay> {
    DISPLAY_LOOKUP.get(api_name).copied()
}
