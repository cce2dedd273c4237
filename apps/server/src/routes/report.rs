// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Report table endpoint.

use crate::error::ApiError;
use crate::types::ReportResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

/// GET /api/v1/report/:report_key - Parameter and weather tables.
///
/// Unknown keys and empty reports give empty tables. Malformed weather
/// readings are left out of the tables and returned as warnings.
pub async fn get_report(
    State(state): State<AppState>,
    Path(report_key): Path<String>,
) -> Result<Json<ReportResponse>, ApiError> {
    let source = state.reports.load(&report_key).await?;
    let (report, malformed) = source.parse_lenient();

    let warnings: Vec<String> = malformed
        .iter()
        .map(|e| {
            tracing::warn!(report_key = %report_key, error = %e, "Dropping malformed report line");
            e.to_string()
        })
        .collect();

    Ok(Json(ReportResponse {
        report_key,
        parameters: report.parameter_table(),
        weather: report.weather_table(),
        warnings,
    }))
}
