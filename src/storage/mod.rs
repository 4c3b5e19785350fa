// src/storage/mod.rs

//! Persistence collaborator boundary.
//!
//! The pipeline's only obligation toward persistence is to emit one
//! [`SearchRecord`] after each completed search. Nothing is ever read back
//! through this boundary.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SearchRecord;

// Re-export for convenience
pub use local::LocalSearchLog;

/// Sink for search records.
#[async_trait]
pub trait SearchLogSink: Send + Sync {
    /// Persist one search record.
    async fn record(&self, record: &SearchRecord) -> Result<()>;
}
