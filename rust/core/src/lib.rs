// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Tinyhouse Core
//!
//! Logic shared by the Tinyhouse generator service: which climate zone a site
//! lies in, what the generator reported back, and how to avoid running the
//! generator twice for the same inputs.
//!
//! ## Overview
//!
//! - **Zone lookup**: first-match point-in-polygon search over a GeoJSON
//!   climate zone dataset ([`ZoneCollection`], [`find_zone`])
//! - **Parameter records**: validated generator inputs with a canonical cache
//!   key ([`ParameterRecord`])
//! - **Report parsing**: design decisions with justifications and monthly
//!   weather readings ([`parse_report`], [`ReportSource`])
//! - **Result cache**: single-flight memoization of generator runs
//!   ([`ResultCache`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tinyhouse_core::{parse_report, GeoPoint, ZoneCollection};
//!
//! let zones = ZoneCollection::from_path("files/raw-data.json")?;
//! let zone = zones.find(GeoPoint::new(49.8728, 8.6512));
//!
//! let report = parse_report(["Dach = Gründach weil Regenrückhalt"])?;
//! assert_eq!(report.parameters.get("Dach").unwrap().value, "Gründach");
//! ```

pub mod error;
pub mod memo;
pub mod params;
pub mod report;
pub mod source;
pub mod zones;

pub use error::{Error, ReportError, Result};
pub use memo::{Cached, ResultCache};
pub use params::{GeometryParameters, InputValue, ParameterRecord};
pub use report::{parse_report, parse_report_lenient, OrderedMap, ParameterEntry, Report, TableData};
pub use source::ReportSource;
pub use zones::{find_zone, GeoPoint, Zone, ZoneCollection};
