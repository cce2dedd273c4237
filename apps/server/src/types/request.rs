// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use serde::Deserialize;
use tinyhouse_core::{GeoPoint, GeometryParameters};

/// Inputs of a model run: the site picked on the map and the building geometry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelRequest {
    /// Site location; defaults to the preselected map location.
    #[serde(default)]
    pub location: GeoPoint,

    /// Building geometry; missing fields take their form defaults.
    #[serde(default)]
    pub geometry: GeometryParameters,
}
