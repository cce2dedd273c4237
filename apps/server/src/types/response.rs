// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use serde::Serialize;
use tinyhouse_core::TableData;

/// Climate zone lookup result.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneResponse {
    /// Latitude rounded to 2 decimals.
    pub latitude: f64,
    /// Longitude rounded to 3 decimals.
    pub longitude: f64,
    /// Containing zone, if any.
    pub zone: Option<String>,
    /// Message shown next to the map.
    pub message: String,
}

/// All climate zones in the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneListResponse {
    pub zones: Vec<String>,
}

/// Result of a model run.
#[derive(Debug, Clone, Serialize)]
pub struct ModelResponse {
    /// Canonical parameter record the analysis ran with.
    pub cache_key: String,
    /// Key for `GET /api/v1/report/:report_key`.
    pub report_key: String,
    /// Climate zone passed to the generator.
    pub climate_zone: Option<String>,
    /// Encoded model geometry as returned by the generator.
    pub geometry: serde_json::Value,
    /// Whether the analysis result was reused.
    pub from_cache: bool,
    /// Total handling time (ms).
    pub total_time_ms: u64,
}

/// Report tables for the material and weather views.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub report_key: String,
    /// Design parameters with their justification.
    pub parameters: TableData<String>,
    /// Monthly snowfall and precipitation.
    pub weather: TableData<f64>,
    /// Problems that caused data to be left out.
    pub warnings: Vec<String>,
}
