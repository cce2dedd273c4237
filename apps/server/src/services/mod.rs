// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service modules for analysis runs and report storage.

pub mod analysis;
pub mod report_store;

pub use analysis::{Analysis, AnalysisError, GrasshopperClient};
pub use report_store::ReportStore;
