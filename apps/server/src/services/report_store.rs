// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Disk-backed report storage using cacache.

use crate::error::ApiError;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tinyhouse_core::ReportSource;

/// Report text persisted between the model run and the table views.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Create a store in the specified directory.
    pub async fn new(dir: &str) -> Self {
        let path = PathBuf::from(dir);

        if let Err(e) = tokio::fs::create_dir_all(&path).await {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Failed to create report directory"
            );
        }

        Self { dir: path }
    }

    /// Storage key for a parameter cache key (SHA256 hash).
    pub fn key_for(cache_key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(cache_key.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Load a report. A missing entry is an empty report.
    pub async fn load(&self, key: &str) -> Result<ReportSource, ApiError> {
        match cacache::read(&self.dir, key).await {
            Ok(data) if data.is_empty() => Ok(ReportSource::default()),
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(cacache::Error::EntryNotFound(_, _)) => {
                tracing::debug!(key = %key, "No stored report");
                Ok(ReportSource::default())
            }
            Err(e) => Err(ApiError::Storage(e.to_string())),
        }
    }

    /// Store a report, replacing any previous one under `key`.
    pub async fn save(&self, key: &str, source: &ReportSource) -> Result<(), ApiError> {
        let data = serde_json::to_vec(source)?;
        cacache::write(&self.dir, key, &data).await?;
        tracing::debug!(key = %key, lines = source.text_lines.len(), "Stored report");
        Ok(())
    }
}
