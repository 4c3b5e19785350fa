// src/pipeline/search.rs

//! Search service entry point.
//!
//! Wires admission control, the result cache, the aggregation pipeline, and
//! search-log emission together. This is the surface the routing
//! collaborator calls; a denied admission surfaces as a distinct
//! `RateLimited` outcome for it to map (HTTP 429), never as an empty
//! result.

use std::sync::Arc;

use crate::cache::ResultCache;
use crate::error::{AppError, Result};
use crate::limiter::RateLimiter;
use crate::models::{ClientInfo, SearchRecord, SearchRequest, SearchResult};
use crate::pipeline::Aggregator;
use crate::storage::SearchLogSink;

/// Gated search entry point over the crawl pipeline.
pub struct SearchService {
    aggregator: Aggregator,
    cache: Arc<ResultCache>,
    limiter: Arc<RateLimiter>,
    search_log: Arc<dyn SearchLogSink>,
}

impl SearchService {
    /// Assemble the service from its injectable parts.
    pub fn new(
        aggregator: Aggregator,
        cache: Arc<ResultCache>,
        limiter: Arc<RateLimiter>,
        search_log: Arc<dyn SearchLogSink>,
    ) -> Self {
        Self {
            aggregator,
            cache,
            limiter,
            search_log,
        }
    }

    /// Run one search on behalf of a client.
    ///
    /// Malformed requests are rejected before any crawling begins. A search
    /// record is emitted after every completed search, cache hit or miss.
    pub async fn search(
        &self,
        request: &SearchRequest,
        client: &ClientInfo,
    ) -> Result<SearchResult> {
        request.validate()?;

        if !self.limiter.admit(&client.address) {
            log::warn!("Rate limited: {}", client.address);
            return Err(AppError::RateLimited);
        }

        let key = request.cache_key();
        if let Some(cached) = self.cache.get(&key) {
            log::info!("Returning cached result for: {key}");
            self.emit_record(request, client, cached.total_items).await;
            return Ok(cached);
        }

        let result = self.aggregator.run(request).await;
        self.cache.put(key, result.clone());
        self.emit_record(request, client, result.total_items).await;

        Ok(result)
    }

    /// Emit the search record; persistence failures are logged, never
    /// fatal to the search itself.
    async fn emit_record(&self, request: &SearchRequest, client: &ClientInfo, result_count: usize) {
        let record = SearchRecord::new(request, client, result_count);
        if let Err(e) = self.search_log.record(&record).await {
            log::error!("Failed to log search: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::models::SearchFilters;
    use crate::services::{PageFetch, RegionCrawler};

    /// Counts fetches and serves an unrecognizable page.
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetch for CountingFetcher {
        async fn fetch(&self, _: &str, _: &str, _: &SearchFilters) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("<html><body></body></html>".to_string())
        }
    }

    /// Captures emitted records in memory.
    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<SearchRecord>>,
    }

    #[async_trait]
    impl SearchLogSink for RecordingSink {
        async fn record(&self, record: &SearchRecord) -> Result<()> {
            self.records
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(record.clone());
            Ok(())
        }
    }

    struct Harness {
        service: SearchService,
        fetcher: Arc<CountingFetcher>,
        sink: Arc<RecordingSink>,
    }

    fn harness(max_requests: usize) -> Harness {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let sink = Arc::new(RecordingSink::default());

        let crawler = RegionCrawler::new(fetcher.clone());
        let aggregator = Aggregator::new(crawler, Duration::ZERO, Duration::from_secs(30));
        let cache = Arc::new(ResultCache::new(Duration::from_secs(300), 16));
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(60), max_requests));

        Harness {
            service: SearchService::new(aggregator, cache, limiter, sink.clone()),
            fetcher,
            sink,
        }
    }

    fn request() -> SearchRequest {
        SearchRequest::new("자전거", vec!["역삼동-6035".to_string()])
    }

    fn client() -> ClientInfo {
        ClientInfo {
            address: "127.0.0.1".to_string(),
            user_name: None,
        }
    }

    #[tokio::test]
    async fn test_malformed_request_rejected_before_crawling() {
        let h = harness(5);
        let bad = SearchRequest::new("", vec!["역삼동-6035".to_string()]);

        let outcome = h.service.search(&bad, &client()).await;
        assert!(matches!(outcome, Err(AppError::Validation(_))));
        assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_search_served_from_cache() {
        let h = harness(5);

        let first = h.service.search(&request(), &client()).await.unwrap();
        let second = h.service.search(&request(), &client()).await.unwrap();

        assert_eq!(first, second);
        // The region page was fetched only once; the second call hit cache.
        assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_surfaces_distinctly() {
        let h = harness(2);
        let c = client();

        assert!(h.service.search(&request(), &c).await.is_ok());
        assert!(h.service.search(&request(), &c).await.is_ok());

        let denied = h.service.search(&request(), &c).await;
        assert!(matches!(denied, Err(AppError::RateLimited)));
    }

    #[tokio::test]
    async fn test_record_emitted_on_hit_and_miss() {
        let h = harness(5);
        let c = ClientInfo {
            address: "10.1.2.3".to_string(),
            user_name: Some("준호".to_string()),
        };

        h.service.search(&request(), &c).await.unwrap();
        h.service.search(&request(), &c).await.unwrap();

        let records = h.sink.records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].user_name, "준호");
        assert_eq!(records[0].ip_address, "10.1.2.3");
        assert_eq!(records[0].region_count, 1);
    }

    #[tokio::test]
    async fn test_denied_search_emits_no_record() {
        let h = harness(1);
        let c = client();

        h.service.search(&request(), &c).await.unwrap();
        let _ = h.service.search(&request(), &c).await;

        assert_eq!(h.sink.records.lock().unwrap().len(), 1);
    }
}
