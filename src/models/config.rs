// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::RegionEntry;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Search result cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-client admission control settings
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Region catalog (display name to upstream identifier)
    #[serde(default = "defaults::regions")]
    pub regions: Vec<RegionEntry>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .map_err(|e| AppError::config(format!("Cannot read {:?}: {e}", path.as_ref())))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.crawl_deadline_secs == 0 {
            return Err(AppError::validation(
                "crawler.crawl_deadline_secs must be > 0",
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(AppError::validation("cache.ttl_secs must be > 0"));
        }
        if self.cache.max_entries == 0 {
            return Err(AppError::validation("cache.max_entries must be > 0"));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(AppError::validation("rate_limit.window_secs must be > 0"));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(AppError::validation("rate_limit.max_requests must be > 0"));
        }
        if self.regions.is_empty() {
            return Err(AppError::validation("No regions defined"));
        }
        Ok(())
    }

    /// Look up a region identifier by display name.
    ///
    /// Tokens that already carry a `<name>-<numericId>` identifier are used
    /// verbatim; the upstream key is opaque and never validated here.
    pub fn resolve_region(&self, token: &str) -> Option<String> {
        if let Some(entry) = self.regions.iter().find(|r| r.name == token) {
            return Some(entry.id.clone());
        }
        if token.contains('-') {
            return Some(token.to_string());
        }
        None
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            regions: defaults::regions(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Base URL of the upstream buy-sell listing page
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept-Language header for HTTP requests
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between consecutive region requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Upper bound for one whole multi-region crawl in seconds
    #[serde(default = "defaults::crawl_deadline")]
    pub crawl_deadline_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            crawl_deadline_secs: defaults::crawl_deadline(),
        }
    }
}

/// Search result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds
    #[serde(default = "defaults::cache_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of cached query signatures
    #[serde(default = "defaults::cache_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::cache_ttl(),
            max_entries: defaults::cache_max_entries(),
        }
    }
}

/// Per-client sliding-window admission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Trailing window length in seconds
    #[serde(default = "defaults::rate_window")]
    pub window_secs: u64,

    /// Maximum admissions per client within the window
    #[serde(default = "defaults::rate_max_requests")]
    pub max_requests: usize,

    /// Interval between idle-client sweeps in seconds
    #[serde(default = "defaults::rate_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: defaults::rate_window(),
            max_requests: defaults::rate_max_requests(),
            sweep_interval_secs: defaults::rate_sweep_interval(),
        }
    }
}

mod defaults {
    use crate::models::RegionEntry;

    // Crawler defaults
    pub fn base_url() -> String {
        "https://www.daangn.com/kr/buy-sell/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn accept_language() -> String {
        "ko-KR,ko;q=0.9,en;q=0.8".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn crawl_deadline() -> u64 {
        90
    }

    // Cache defaults
    pub fn cache_ttl() -> u64 {
        300
    }
    pub fn cache_max_entries() -> usize {
        256
    }

    // Rate limit defaults
    pub fn rate_window() -> u64 {
        60
    }
    pub fn rate_max_requests() -> usize {
        5
    }
    pub fn rate_sweep_interval() -> u64 {
        60
    }

    // Region defaults: Seoul neighborhoods commonly searched together.
    // The full table lives in config.toml; this seed keeps the crate
    // usable without one.
    pub fn regions() -> Vec<RegionEntry> {
        fn entry(name: &str, id: &str) -> RegionEntry {
            RegionEntry {
                name: name.to_string(),
                id: id.to_string(),
            }
        }

        vec![
            // 강남구
            entry("개포동", "개포동-5971"),
            entry("논현동", "논현동-5973"),
            entry("대치동", "대치동-5974"),
            entry("도곡동", "도곡동-5975"),
            entry("삼성동", "삼성동-5976"),
            entry("신사동", "신사동-5978"),
            entry("압구정동", "압구정동-5979"),
            entry("역삼동", "역삼동-5980"),
            entry("일원동", "일원동-5981"),
            entry("청담동", "청담동-5982"),
            // 강동구
            entry("강일동", "강일동-6055"),
            entry("고덕동", "고덕동-6056"),
            entry("길동", "길동-6057"),
            entry("둔촌동", "둔촌동-6058"),
            entry("명일동", "명일동-6061"),
            entry("상일동", "상일동-6062"),
            entry("성내동", "성내동-6063"),
            entry("암사동", "암사동-6064"),
            entry("천호동", "천호동-6065"),
            // 광진구
            entry("구의동", "구의동-6059"),
            entry("광장동", "광장동-79"),
            entry("능동", "능동-6095"),
            entry("자양동", "자양동-6060"),
            entry("중곡동", "중곡동-6096"),
            entry("화양동", "화양동-72"),
        ]
    }
}
