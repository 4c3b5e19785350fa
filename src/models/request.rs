// src/models/request.rs

//! Search request, result, and log record structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Listing;

/// Optional search filters forwarded to the upstream site.
///
/// The price bounds are passed through verbatim: the upstream site defines
/// what an inverted range (min > max) means, so no ordering is enforced
/// here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// Upstream category identifier
    pub category: Option<String>,

    /// Minimum price in won
    pub min_price: Option<u64>,

    /// Maximum price in won
    pub max_price: Option<u64>,
}

/// A search across one or more regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Query text (must be non-empty)
    pub query: String,

    /// Upstream region identifiers, in the order they will be crawled
    pub region_ids: Vec<String>,

    /// Optional filters
    pub filters: SearchFilters,
}

impl SearchRequest {
    /// Create a request with no filters.
    pub fn new(query: impl Into<String>, region_ids: Vec<String>) -> Self {
        Self {
            query: query.into(),
            region_ids,
            filters: SearchFilters::default(),
        }
    }

    /// Reject malformed requests before any crawling begins.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(AppError::validation("query must not be empty"));
        }
        if self.region_ids.is_empty() {
            return Err(AppError::validation("at least one region is required"));
        }
        Ok(())
    }

    /// Deterministic cache key over the full query signature.
    ///
    /// Absent filter fields render as empty segments so equivalent requests
    /// collide on the same key.
    pub fn cache_key(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            self.query,
            self.region_ids.join(","),
            self.filters.category.as_deref().unwrap_or(""),
            self.filters
                .min_price
                .map_or(String::new(), |p| p.to_string()),
            self.filters
                .max_price
                .map_or(String::new(), |p| p.to_string()),
        )
    }
}

/// Aggregated, deduplicated result of one search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    /// Originating query text
    pub query: String,

    /// Region identifiers that were crawled
    pub regions: Vec<String>,

    /// Number of deduplicated listings
    #[serde(rename = "totalItems")]
    pub total_items: usize,

    /// Listings, most recent first
    pub items: Vec<Listing>,

    /// Capture timestamp
    pub timestamp: DateTime<Utc>,
}

/// Identity of the caller, used for admission control and search logging.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// Source address (admission-control key)
    pub address: String,

    /// Optional display name
    pub user_name: Option<String>,
}

/// Record emitted to the persistence collaborator after each search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRecord {
    /// Client display name, "Anonymous" when none was supplied
    pub user_name: String,

    /// Query text
    pub query: String,

    /// Region identifiers that were queried
    pub regions: Vec<String>,

    /// Number of regions queried
    pub region_count: usize,

    /// Number of listings returned
    pub result_count: usize,

    /// Client source address
    pub ip_address: String,

    /// Emission timestamp
    pub timestamp: DateTime<Utc>,
}

impl SearchRecord {
    /// Build a record for a completed search.
    pub fn new(request: &SearchRequest, client: &ClientInfo, result_count: usize) -> Self {
        Self {
            user_name: client
                .user_name
                .clone()
                .unwrap_or_else(|| "Anonymous".to_string()),
            query: request.query.clone(),
            regions: request.region_ids.clone(),
            region_count: request.region_ids.len(),
            result_count,
            ip_address: client.address.clone(),
            timestamp: Utc::now(),
        }
    }
}
