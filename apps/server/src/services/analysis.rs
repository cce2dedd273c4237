// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grasshopper analysis runs on a remote compute server.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use base64::Engine;
use futures::future::BoxFuture;
use thiserror::Error;
use tinyhouse_core::ParameterRecord;

use crate::types::{AnalysisOutput, GrasshopperRequest};

/// Errors from an analysis run. Never cached.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Grasshopper definition unavailable: {0}")]
    Script(String),

    #[error("Compute request failed: {0}")]
    Request(String),

    #[error("Compute server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Analysis timed out after {secs} s")]
    Timeout { secs: u64 },

    #[error("Invalid analysis output: {0}")]
    InvalidResponse(String),
}

/// An expensive, deterministic generator run.
pub trait Analysis: Send + Sync {
    fn run<'a>(
        &'a self,
        record: &'a ParameterRecord,
    ) -> BoxFuture<'a, Result<AnalysisOutput, AnalysisError>>;
}

/// Client for a Rhino.Compute style `/grasshopper` endpoint.
pub struct GrasshopperClient {
    endpoint: String,
    script_path: PathBuf,
    timeout: Duration,
    http: reqwest::Client,
}

impl GrasshopperClient {
    pub fn new(base_url: &str, script_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            endpoint: format!("{}/grasshopper", base_url.trim_end_matches('/')),
            script_path: script_path.into(),
            timeout,
            http: reqwest::Client::new(),
        }
    }

    fn map_transport(&self, err: reqwest::Error) -> AnalysisError {
        if err.is_timeout() {
            AnalysisError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            AnalysisError::Request(err.to_string())
        }
    }

    async fn execute(&self, record: &ParameterRecord) -> Result<AnalysisOutput, AnalysisError> {
        // Read on every run so an updated definition is picked up without restart
        let script = tokio::fs::read(&self.script_path).await.map_err(|e| {
            AnalysisError::Script(format!("{}: {}", self.script_path.display(), e))
        })?;
        let algo = base64::engine::general_purpose::STANDARD.encode(script);
        let request = GrasshopperRequest::new(algo, record);

        let start = Instant::now();
        tracing::info!(
            endpoint = %self.endpoint,
            inputs = request.values.len(),
            zone = ?record.climate_zone(),
            "Starting Grasshopper analysis"
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalysisError::Status { status, body });
        }

        let output: AnalysisOutput = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_transport(e)
            } else {
                AnalysisError::InvalidResponse(e.to_string())
            }
        })?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            outputs = output.values.len(),
            "Grasshopper analysis finished"
        );

        Ok(output)
    }
}

impl Analysis for GrasshopperClient {
    fn run<'a>(
        &'a self,
        record: &'a ParameterRecord,
    ) -> BoxFuture<'a, Result<AnalysisOutput, AnalysisError>> {
        Box::pin(self.execute(record))
    }
}
