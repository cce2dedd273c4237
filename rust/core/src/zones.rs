// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Climate zone lookup
//!
//! Zones come from a GeoJSON FeatureCollection in EPSG:4326 where every
//! feature carries a `climate` label. Lookup walks the zones in dataset order
//! and returns the first one whose boundary contains the query point, so
//! overlapping zones resolve to whichever appears first.

use std::collections::BTreeSet;
use std::path::Path;

use geo::{Contains, Coord, LineString, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Property holding the zone label on each feature
pub const LABEL_PROPERTY: &str = "climate";

/// A closed GeoJSON ring needs at least four positions (first == last)
const MIN_RING_POSITIONS: usize = 4;

/// Geographic point in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Site preselected in the map view (Darmstadt)
    pub const DEFAULT_LOCATION: GeoPoint = GeoPoint {
        lat: 49.8728,
        lon: 8.6512,
    };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Point rounded for display: longitude to 3 decimals, latitude to 2.
    pub fn rounded(&self) -> Self {
        Self {
            lat: round_to(self.lat, 2),
            lon: round_to(self.lon, 3),
        }
    }

    /// Reject non-finite or out-of-range coordinates.
    ///
    /// The lookup itself never calls this; an out-of-range point simply
    /// matches no zone.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinate(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::InvalidCoordinate(format!(
                "longitude {} outside [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }

    /// Planar point in (x = longitude, y = latitude) order
    #[inline]
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::DEFAULT_LOCATION
    }
}

#[inline]
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// A labeled climate zone boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub label: String,
    pub boundary: MultiPolygon<f64>,
}

impl Zone {
    pub fn new(label: impl Into<String>, boundary: MultiPolygon<f64>) -> Self {
        Self {
            label: label.into(),
            boundary,
        }
    }

    /// Boundary-exclusive containment test. An empty boundary contains nothing.
    #[inline]
    pub fn contains(&self, point: &Point<f64>) -> bool {
        !self.boundary.0.is_empty() && self.boundary.contains(point)
    }
}

/// Label of the first zone containing `point`, in iteration order.
pub fn find_zone(zones: &[Zone], point: GeoPoint) -> Option<&str> {
    let point = point.to_point();
    zones
        .iter()
        .find(|zone| zone.contains(&point))
        .map(|zone| zone.label.as_str())
}

/// Ordered, immutable set of climate zones
#[derive(Debug, Clone, Default)]
pub struct ZoneCollection {
    zones: Vec<Zone>,
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Value>,
}

impl ZoneCollection {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// Parse a GeoJSON FeatureCollection.
    ///
    /// Features without a label or with unusable geometry are skipped with a
    /// warning; only a document that is not a FeatureCollection is an error.
    pub fn from_geojson_str(json: &str) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_str(json)
            .map_err(|e| Error::Dataset(format!("not a GeoJSON document: {}", e)))?;

        if collection.kind != "FeatureCollection" {
            return Err(Error::Dataset(format!(
                "expected FeatureCollection, found {}",
                collection.kind
            )));
        }

        let mut zones = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.into_iter().enumerate() {
            let label = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(LABEL_PROPERTY))
                .and_then(Value::as_str);

            let Some(label) = label else {
                tracing::warn!(feature = index, "Skipping zone without climate label");
                continue;
            };

            let boundary = match feature.geometry.as_ref().map(boundary_from_geometry) {
                Some(Ok(boundary)) => boundary,
                Some(Err(reason)) => {
                    tracing::warn!(feature = index, zone = %label, reason, "Skipping malformed zone");
                    continue;
                }
                None => {
                    tracing::warn!(feature = index, zone = %label, "Skipping zone without geometry");
                    continue;
                }
            };

            zones.push(Zone::new(label, boundary));
        }

        tracing::debug!(zones = zones.len(), "Loaded climate zones");
        Ok(Self { zones })
    }

    /// Read and parse a GeoJSON dataset from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_geojson_str(&json)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// See [`find_zone`].
    pub fn find(&self, point: GeoPoint) -> Option<&str> {
        find_zone(&self.zones, point)
    }

    /// Distinct zone labels, sorted.
    pub fn labels(&self) -> Vec<String> {
        self.zones
            .iter()
            .map(|zone| zone.label.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// User-facing lookup message using the rounded coordinates.
    pub fn describe(&self, point: GeoPoint) -> String {
        let shown = point.rounded();
        match self.find(point) {
            Some(zone) => format!("Klimazone am Punkt ({}, {}): {}", shown.lat, shown.lon, zone),
            None => format!("Keine Klimazone am Punkt ({}, {}) gefunden", shown.lat, shown.lon),
        }
    }
}

fn boundary_from_geometry(geometry: &Value) -> std::result::Result<MultiPolygon<f64>, &'static str> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or("missing geometry type")?;
    let coordinates = geometry.get("coordinates").ok_or("missing coordinates")?;

    match kind {
        "Polygon" => {
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(coordinates.clone())
                .map_err(|_| "invalid polygon coordinates")?;
            polygon_from_rings(&rings)
                .map(|polygon| MultiPolygon::new(vec![polygon]))
                .ok_or("degenerate polygon ring")
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Vec<f64>>>> = serde_json::from_value(coordinates.clone())
                .map_err(|_| "invalid multipolygon coordinates")?;
            polygons
                .iter()
                .map(|rings| polygon_from_rings(rings))
                .collect::<Option<Vec<_>>>()
                .map(MultiPolygon::new)
                .ok_or("degenerate polygon ring")
        }
        _ => Err("unsupported geometry type"),
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| ring_from_positions(ring));
    let exterior = rings.next()??;
    let interiors = rings.collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(exterior, interiors))
}

fn ring_from_positions(positions: &[Vec<f64>]) -> Option<LineString<f64>> {
    if positions.len() < MIN_RING_POSITIONS {
        return None;
    }
    positions
        .iter()
        .map(|position| match position.as_slice() {
            // Altitude, if present, is ignored
            [x, y, ..] if x.is_finite() && y.is_finite() => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}
