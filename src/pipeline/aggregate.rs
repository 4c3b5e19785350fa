// src/pipeline/aggregate.rs

//! Multi-region aggregation.
//!
//! Regions are crawled one at a time, in request order, with a pacing delay
//! between consecutive fetches. The sequential flow is an etiquette
//! throttle toward the upstream site; parallelizing it would defeat the
//! throttle and risk blocking. A whole-crawl deadline bounds the worst
//! case: when it expires the in-flight fetch is abandoned and the result is
//! built from what was gathered.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::models::{Listing, SearchRequest, SearchResult};
use crate::pipeline::recency::recency_rank;
use crate::services::RegionCrawler;

/// Sequences per-region crawls and merges their output.
pub struct Aggregator {
    crawler: RegionCrawler,
    request_delay: Duration,
    crawl_deadline: Duration,
}

impl Aggregator {
    /// Create an aggregator with the given pacing delay and overall
    /// deadline.
    pub fn new(crawler: RegionCrawler, request_delay: Duration, crawl_deadline: Duration) -> Self {
        Self {
            crawler,
            request_delay,
            crawl_deadline,
        }
    }

    /// Crawl all requested regions and produce the merged result.
    pub async fn run(&self, request: &SearchRequest) -> SearchResult {
        log::info!(
            "Starting crawl for \"{}\" across {} region(s)",
            request.query,
            request.region_ids.len()
        );

        let deadline = Instant::now() + self.crawl_deadline;
        let last = request.region_ids.len().saturating_sub(1);
        let mut collected: Vec<Listing> = Vec::new();

        for (index, region_id) in request.region_ids.iter().enumerate() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                log::warn!(
                    "Crawl deadline reached; skipping {} remaining region(s)",
                    request.region_ids.len() - index
                );
                break;
            }

            let crawl = self.crawler.crawl(region_id, &request.query, &request.filters);
            match tokio::time::timeout(remaining, crawl).await {
                Ok(items) => {
                    log::info!("Found {} item(s) in {region_id}", items.len());
                    collected.extend(items);
                }
                Err(_) => {
                    log::warn!(
                        "Crawl deadline reached while fetching {region_id}; skipping {} remaining region(s)",
                        last - index
                    );
                    break;
                }
            }

            if index < last && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        let mut items = dedup_by_link(collected);
        items.sort_by_key(|listing| recency_rank(&listing.time));

        log::info!("Total unique items: {}", items.len());

        SearchResult {
            query: request.query.clone(),
            regions: request.region_ids.clone(),
            total_items: items.len(),
            items,
            timestamp: Utc::now(),
        }
    }
}

/// Keep the first occurrence of each canonical link in traversal order.
fn dedup_by_link(items: Vec<Listing>) -> Vec<Listing> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.link.clone()))
        .collect()
}
