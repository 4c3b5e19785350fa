// src/models/listing.rs

//! Listing data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Untyped record produced by one extraction strategy.
///
/// Every field is optional: the embedded-state strategy fills the typed
/// fields (numeric price, parsed timestamps), while the DOM fallback can
/// only recover display text. Normalization turns either shape into a
/// [`Listing`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    /// Listing title
    pub title: Option<String>,

    /// Numeric price in won (0 means the item is given away)
    pub price: Option<f64>,

    /// Display price text when only rendered markup was available
    pub price_text: Option<String>,

    /// Region display name carried by the record
    pub region_name: Option<String>,

    /// Creation timestamp
    pub created_at: Option<DateTime<Utc>>,

    /// Re-promotion ("끌올") timestamp
    pub boosted_at: Option<DateTime<Utc>>,

    /// Display time text when only rendered markup was available
    pub time_text: Option<String>,

    /// Thumbnail image URL
    pub thumbnail: Option<String>,

    /// Absolute link to the listing detail page
    pub href: Option<String>,

    /// Site-relative identifier path, used to synthesize a link
    pub id_path: Option<String>,

    /// Upstream sale status label (e.g. "판매중", "예약중")
    pub status: Option<String>,
}

/// A normalized marketplace listing.
///
/// The canonical `link` is the listing's only identity; deduplication
/// across regions keys on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    /// Listing title ("제목 없음" when the record carried none)
    pub title: String,

    /// Display price ("나눔" for zero, "가격 미정" when absent)
    pub price: String,

    /// Region display name
    pub region: String,

    /// Relative time display, optionally prefixed with "끌올 "
    pub time: String,

    /// Thumbnail URL (may be empty)
    pub thumbnail: String,

    /// Canonical absolute link; deduplication key
    pub link: String,

    /// Upstream sale status label (may be empty)
    pub status: String,
}
