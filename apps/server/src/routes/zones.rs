// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Climate zone endpoints.

use crate::types::{ZoneListResponse, ZoneResponse};
use crate::AppState;
use axum::{extract::State, Json};
use tinyhouse_core::GeoPoint;

/// GET /api/v1/zones - Sorted climate zone labels.
pub async fn list(State(state): State<AppState>) -> Json<ZoneListResponse> {
    Json(ZoneListResponse {
        zones: state.zones.labels(),
    })
}

/// POST /api/v1/zone - Climate zone containing a point.
///
/// Points outside every zone (including out-of-range coordinates) get
/// `zone: null` and the "not found" message.
pub async fn lookup(
    State(state): State<AppState>,
    Json(point): Json<GeoPoint>,
) -> Json<ZoneResponse> {
    let zone = state.zones.find(point).map(str::to_string);
    let shown = point.rounded();

    tracing::debug!(lat = shown.lat, lon = shown.lon, zone = ?zone, "Zone lookup");

    Json(ZoneResponse {
        latitude: shown.lat,
        longitude: shown.lon,
        zone,
        message: state.zones.describe(point),
    })
}
