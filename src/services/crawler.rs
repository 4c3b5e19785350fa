// src/services/crawler.rs

//! Per-region crawl driver.
//!
//! Drives fetch → extract → normalize for one region. Failure isolation is
//! deliberate: one region's outage or layout change never aborts the
//! overall search, it only contributes zero listings.

use std::sync::Arc;

use chrono::Utc;

use crate::models::{Listing, SearchFilters};
use crate::services::{ExtractionOutcome, PageFetch, extractor, normalizer};

/// Crawls a single region and yields normalized listings.
pub struct RegionCrawler {
    fetcher: Arc<dyn PageFetch>,
}

impl RegionCrawler {
    /// Create a crawler over the given page fetcher.
    pub fn new(fetcher: Arc<dyn PageFetch>) -> Self {
        Self { fetcher }
    }

    /// Crawl one region; never fails.
    pub async fn crawl(
        &self,
        region_id: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> Vec<Listing> {
        let html = match self.fetcher.fetch(region_id, query, filters).await {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Fetch failed for region {region_id}: {e}");
                return Vec::new();
            }
        };

        let outcome = extractor::extract(&html);
        if outcome == ExtractionOutcome::NoMatch {
            log::debug!("No listings recognized for region {region_id}");
            return Vec::new();
        }

        let strategy = outcome.strategy();
        let records = outcome.into_records();
        log::debug!(
            "Region {region_id}: {} record(s) via {strategy}",
            records.len()
        );

        let now = Utc::now();
        records
            .iter()
            .map(|raw| normalizer::normalize(raw, region_id, now))
            .collect()
    }
}
