// src/storage/local.rs

//! Local filesystem search log.
//!
//! Appends one JSON document per line to `search_logs.jsonl` under the
//! data directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::SearchRecord;
use crate::storage::SearchLogSink;

/// Append-only JSONL search log.
#[derive(Clone)]
pub struct LocalSearchLog {
    path: PathBuf,
}

impl LocalSearchLog {
    /// Create a log writing to `search_logs.jsonl` in the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join("search_logs.jsonl"),
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SearchLogSink for LocalSearchLog {
    async fn record(&self, record: &SearchRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        log::debug!("Search logged: query=\"{}\"", record.query);
        Ok(())
    }
}
