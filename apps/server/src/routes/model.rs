// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model endpoint: runs the generator for a site and building geometry.

use crate::error::ApiError;
use crate::services::{AnalysisError, ReportStore};
use crate::types::{ModelRequest, ModelResponse};
use crate::AppState;
use axum::{extract::State, Json};
use std::time::Instant;
use tinyhouse_core::{ParameterRecord, ReportSource};

/// POST /api/v1/model - Generate (or reuse) the model for the given inputs.
pub async fn run_model(
    State(state): State<AppState>,
    Json(request): Json<ModelRequest>,
) -> Result<Json<ModelResponse>, ApiError> {
    let start = Instant::now();

    let climate_zone = state.zones.find(request.location).map(str::to_string);
    let record = ParameterRecord::new(request.location, request.geometry, climate_zone.clone())?;
    let cache_key = record.cache_key()?;

    let analysis = state.analysis.clone();
    let cached = state
        .results
        .get_or_compute(&cache_key, async move {
            let output = analysis.run(&record).await?;
            // Only outputs with usable geometry are worth keeping
            output
                .geometry_payload()
                .map_err(AnalysisError::InvalidResponse)?;
            Ok::<_, AnalysisError>(output)
        })
        .await
        .inspect_err(|e| tracing::error!(cache_key = %cache_key, error = %e, "Analysis failed"))?;

    let output = cached.value;
    let geometry = output
        .geometry_payload()
        .map_err(AnalysisError::InvalidResponse)?;

    let report_key = ReportStore::key_for(&cache_key);
    let source = ReportSource::new(output.report_lines());
    state.reports.save(&report_key, &source).await?;

    let total_time_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        cache_key = %cache_key,
        from_cache = cached.from_cache,
        report_lines = source.text_lines.len(),
        total_time_ms,
        "Model ready"
    );

    Ok(Json(ModelResponse {
        cache_key,
        report_key,
        climate_zone,
        geometry,
        from_cache: cached.from_cache,
        total_time_ms,
    }))
}
