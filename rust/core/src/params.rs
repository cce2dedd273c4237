// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter records sent to the generator
//!
//! A [`ParameterRecord`] is built once per analysis request and never
//! mutated. Its [`cache_key`](ParameterRecord::cache_key) is a canonical JSON
//! serialization with a fixed field order, so two records with the same
//! values always share a key.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::zones::GeoPoint;

/// Allowed room height in metres
pub const ROOM_HEIGHT_RANGE: RangeInclusive<f64> = 2.0..=5.0;
/// Allowed building azimuth in degrees
pub const AZIMUTH_RANGE: RangeInclusive<f64> = 0.0..=360.0;

/// Geometry inputs chosen in the building step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParameters {
    /// Clear room height (m)
    pub room_height: f64,
    /// Orientation of the main facade (deg, clockwise from north)
    pub azimuth: f64,
}

impl Default for GeometryParameters {
    fn default() -> Self {
        Self {
            room_height: 2.5,
            azimuth: 0.0,
        }
    }
}

impl GeometryParameters {
    pub fn validate(&self) -> Result<()> {
        check_range("room_height", self.room_height, &ROOM_HEIGHT_RANGE)?;
        check_range("azimuth", self.azimuth, &AZIMUTH_RANGE)
    }
}

fn check_range(name: &str, value: f64, range: &RangeInclusive<f64>) -> Result<()> {
    if value.is_finite() && range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{} = {} outside [{}, {}]",
            name,
            value,
            range.start(),
            range.end()
        )))
    }
}

/// A single value in the generator's input tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

/// Immutable set of inputs for one generator run.
///
/// Field order is the canonical key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterRecord {
    room_height: f64,
    azimuth: f64,
    climate_zone: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl ParameterRecord {
    /// Build a validated record.
    ///
    /// Coordinates are stored at display precision (see [`GeoPoint::rounded`])
    /// so nearby clicks on the map share one analysis.
    pub fn new(
        location: GeoPoint,
        geometry: GeometryParameters,
        climate_zone: Option<String>,
    ) -> Result<Self> {
        location.validate()?;
        geometry.validate()?;

        let location = location.rounded();
        Ok(Self {
            room_height: canonical(geometry.room_height),
            azimuth: canonical(geometry.azimuth),
            climate_zone,
            latitude: canonical(location.lat),
            longitude: canonical(location.lon),
        })
    }

    pub fn room_height(&self) -> f64 {
        self.room_height
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn climate_zone(&self) -> Option<&str> {
        self.climate_zone.as_deref()
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Canonical serialization, used only as the memoization key.
    pub fn cache_key(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Generator inputs by parameter name, each wrapped in a one-item list.
    pub fn to_inputs(&self) -> BTreeMap<String, Vec<InputValue>> {
        let mut inputs = BTreeMap::new();
        inputs.insert("Raumhöhe".to_string(), vec![InputValue::Number(self.room_height)]);
        inputs.insert("Azimut".to_string(), vec![InputValue::Number(self.azimuth)]);
        inputs.insert("Breitengrad".to_string(), vec![InputValue::Number(self.latitude)]);
        inputs.insert("Längengrad".to_string(), vec![InputValue::Number(self.longitude)]);
        if let Some(zone) = &self.climate_zone {
            inputs.insert("Klimazone".to_string(), vec![InputValue::Text(zone.clone())]);
        }
        inputs
    }
}

/// Fold -0.0 into 0.0 so equal values serialize identically
#[inline]
fn canonical(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
