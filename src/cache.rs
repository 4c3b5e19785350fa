// src/cache.rs

//! Time-boxed memoization of search results.
//!
//! Entries are evicted lazily: a lookup that finds a stale entry removes it
//! and reports a miss. A max-entry bound keeps sustained unique-query
//! traffic from growing the map without limit; when the bound is exceeded
//! the oldest-stored entries are dropped first.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::models::SearchResult;

struct CacheEntry {
    result: SearchResult,
    stored_at: Instant,
}

/// Process-wide search result cache, shared across concurrent requests.
pub struct ResultCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    /// Create a cache with the given entry lifetime and size bound.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a fresh entry; a stale entry is evicted and reported as a
    /// miss.
    pub fn get(&self, key: &str) -> Option<SearchResult> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => Some(entry.result.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a result under its query signature. Last write wins.
    pub fn put(&self, key: String, result: SearchResult) {
        let mut entries = self.lock();
        entries.insert(
            key,
            CacheEntry {
                result,
                stored_at: Instant::now(),
            },
        );

        while entries.len() > self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    log::debug!("Cache bound reached; evicting {key}");
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Number of stored entries, stale included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
