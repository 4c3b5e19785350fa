// src/services/fetcher.rs

//! Region page fetcher.
//!
//! Issues one GET per region against the upstream buy-sell page with
//! browser-identifying headers. A single attempt per region per crawl;
//! retry policy, if any, belongs to the caller.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, SearchFilters};
use crate::utils::http;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Fetches one region's server-rendered listing page.
#[async_trait]
pub trait PageFetch: Send + Sync {
    /// Fetch the raw page for a query in one region.
    async fn fetch(
        &self,
        region_id: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<String>;
}

/// HTTP-backed fetcher against the live upstream site.
pub struct HttpPageFetcher {
    client: Client,
    config: CrawlerConfig,
}

impl HttpPageFetcher {
    /// Create a new fetcher with the given crawler settings.
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        let client = http::create_async_client(&config)?;
        Ok(Self { client, config })
    }

    /// Build the upstream search URL for one region.
    ///
    /// Query text and region identifier are percent-encoded. The price
    /// expression has three forms: `min__max`, `min__`, `__max`.
    fn build_url(&self, region_id: &str, query: &str, filters: &SearchFilters) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("in", region_id);
            pairs.append_pair("search", query);

            if let Some(category) = &filters.category {
                pairs.append_pair("category_id", category);
            }

            let price = match (filters.min_price, filters.max_price) {
                (Some(min), Some(max)) => Some(format!("{min}__{max}")),
                (Some(min), None) => Some(format!("{min}__")),
                (None, Some(max)) => Some(format!("__{max}")),
                (None, None) => None,
            };
            if let Some(price) = price {
                pairs.append_pair("price", &price);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl PageFetch for HttpPageFetcher {
    async fn fetch(
        &self,
        region_id: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<String> {
        let url = self.build_url(region_id, query, filters)?;
        log::debug!("Fetching {url}");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, &self.config.accept_language)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpPageFetcher {
        HttpPageFetcher::new(CrawlerConfig::default()).unwrap()
    }

    fn filters(min: Option<u64>, max: Option<u64>) -> SearchFilters {
        SearchFilters {
            category: None,
            min_price: min,
            max_price: max,
        }
    }

    #[test]
    fn test_build_url_encodes_query_and_region() {
        let url = fetcher()
            .build_url("역삼동-6035", "자전거", &SearchFilters::default())
            .unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://www.daangn.com/kr/buy-sell/?"));
        assert!(s.contains("in=%EC%97%AD%EC%82%BC%EB%8F%99-6035"));
        assert!(s.contains("search=%EC%9E%90%EC%A0%84%EA%B1%B0"));
        assert!(!s.contains("price="));
    }

    #[test]
    fn test_build_url_price_range_forms() {
        let f = fetcher();

        let both = f
            .build_url("r-1", "q", &filters(Some(1000), Some(5000)))
            .unwrap();
        assert!(both.as_str().contains("price=1000__5000"));

        let min_only = f.build_url("r-1", "q", &filters(Some(1000), None)).unwrap();
        assert!(min_only.as_str().contains("price=1000__"));

        let max_only = f.build_url("r-1", "q", &filters(None, Some(5000))).unwrap();
        assert!(max_only.as_str().contains("price=__5000"));
    }

    #[test]
    fn test_build_url_inverted_range_passes_through() {
        // The upstream site defines what min > max means; the expression is
        // forwarded untouched.
        let url = fetcher()
            .build_url("r-1", "q", &filters(Some(9000), Some(100)))
            .unwrap();
        assert!(url.as_str().contains("price=9000__100"));
    }

    #[test]
    fn test_build_url_category() {
        let mut f = SearchFilters::default();
        f.category = Some("9".to_string());
        let url = fetcher().build_url("r-1", "q", &f).unwrap();
        assert!(url.as_str().contains("category_id=9"));
    }
}
