// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type definitions for API requests and responses.

mod grasshopper;
mod request;
mod response;

pub use grasshopper::{
    AnalysisOutput, DataItem, DataTree, GrasshopperRequest, REPORT_PARAM, ROOT_BRANCH,
};
pub use request::ModelRequest;
pub use response::{ModelResponse, ReportResponse, ZoneListResponse, ZoneResponse};
