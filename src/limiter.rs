// src/limiter.rs

//! Per-client sliding-window admission control.
//!
//! Guards the crawl entry point. Denial is a normal, expected outcome: the
//! caller rejects the request, nothing is retried here. A periodic sweep
//! drops clients with no in-window admissions to bound memory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

/// Process-wide sliding-window rate limiter, shared across concurrent
/// requests.
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    clients: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_requests` per client per `window`.
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Admission check for one client.
    ///
    /// Prunes out-of-window timestamps, then admits iff the remaining count
    /// is below the threshold. The new timestamp is recorded only on
    /// admission.
    pub fn admit(&self, client_id: &str) -> bool {
        let now = Instant::now();
        let mut clients = self.lock();
        let stamps = clients.entry(client_id.to_string()).or_default();
        stamps.retain(|t| now.duration_since(*t) < self.window);

        if stamps.len() < self.max_requests {
            stamps.push(now);
            true
        } else {
            false
        }
    }

    /// Drop clients with no in-window admissions.
    pub fn sweep(&self) {
        let now = Instant::now();
        let mut clients = self.lock();
        clients.retain(|_, stamps| {
            stamps.retain(|t| now.duration_since(*t) < self.window);
            !stamps.is_empty()
        });
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    /// Spawn the periodic sweep task. The task ends on its own once the
    /// limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let limiter: Weak<RateLimiter> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                match limiter.upgrade() {
                    Some(limiter) => limiter.sweep(),
                    None => break,
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Instant>>> {
        self.clients.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_threshold_then_denies() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 5);
        for _ in 0..5 {
            assert!(limiter.admit("10.0.0.1"));
        }
        assert!(!limiter.admit("10.0.0.1"));
        assert!(!limiter.admit("10.0.0.1"));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2);
        assert!(limiter.admit("a"));
        assert!(limiter.admit("a"));
        assert!(!limiter.admit("a"));
        assert!(limiter.admit("b"));
    }

    #[test]
    fn test_admission_resumes_after_window() {
        let limiter = RateLimiter::new(Duration::from_millis(50), 2);
        assert!(limiter.admit("c"));
        assert!(limiter.admit("c"));
        assert!(!limiter.admit("c"));

        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.admit("c"));
    }

    #[test]
    fn test_denial_is_not_recorded() {
        let limiter = RateLimiter::new(Duration::from_millis(50), 1);
        assert!(limiter.admit("d"));
        // Denied attempts must not extend the window.
        for _ in 0..3 {
            assert!(!limiter.admit("d"));
        }
        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.admit("d"));
    }

    #[test]
    fn test_sweep_drops_idle_clients() {
        let limiter = RateLimiter::new(Duration::from_millis(10), 5);
        limiter.admit("idle");
        assert_eq!(limiter.tracked_clients(), 1);

        std::thread::sleep(Duration::from_millis(20));
        limiter.sweep();
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[tokio::test]
    async fn test_sweeper_task_runs_periodically() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(10), 5));
        let handle = limiter.spawn_sweeper(Duration::from_millis(20));

        limiter.admit("idle");
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(limiter.tracked_clients(), 0);

        handle.abort();
    }
}
