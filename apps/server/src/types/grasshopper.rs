// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grasshopper data trees as exchanged with the compute server.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tinyhouse_core::{InputValue, ParameterRecord};

/// Branch path holding single-item inputs and outputs
pub const ROOT_BRANCH: &str = "{0}";

/// Output parameter carrying the report lines
pub const REPORT_PARAM: &str = "Report";

/// One item in a data tree branch; `data` is JSON-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: String,
}

/// A named parameter with its branches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTree {
    #[serde(rename = "ParamName")]
    pub param_name: String,
    #[serde(rename = "InnerTree", default)]
    pub inner_tree: BTreeMap<String, Vec<DataItem>>,
}

impl DataTree {
    /// Single-branch input tree from a list of values.
    pub fn input(name: &str, values: &[InputValue]) -> Self {
        let items = values
            .iter()
            .map(|value| {
                let kind = match value {
                    InputValue::Number(_) => "System.Double",
                    InputValue::Text(_) => "System.String",
                };
                DataItem {
                    kind: kind.to_string(),
                    data: serde_json::to_string(value).unwrap_or_default(),
                }
            })
            .collect();

        let mut inner_tree = BTreeMap::new();
        inner_tree.insert(ROOT_BRANCH.to_string(), items);
        Self {
            param_name: name.to_string(),
            inner_tree,
        }
    }

    /// Items of all branches in branch-path order.
    pub fn items(&self) -> impl Iterator<Item = &DataItem> {
        self.inner_tree.values().flatten()
    }
}

/// Body of a `POST /grasshopper` call.
#[derive(Debug, Clone, Serialize)]
pub struct GrasshopperRequest {
    /// Base64-encoded definition
    pub algo: String,
    pub pointer: Option<String>,
    pub values: Vec<DataTree>,
}

impl GrasshopperRequest {
    pub fn new(algo: String, record: &ParameterRecord) -> Self {
        let values = record
            .to_inputs()
            .iter()
            .map(|(name, values)| DataTree::input(name, values))
            .collect();
        Self {
            algo,
            pointer: None,
            values,
        }
    }
}

/// Output trees returned by the compute server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    #[serde(default)]
    pub values: Vec<DataTree>,
}

impl AnalysisOutput {
    /// Encoded model geometry: first item of the first output's root branch.
    pub fn geometry_payload(&self) -> Result<serde_json::Value, String> {
        let data = self
            .values
            .first()
            .and_then(|tree| tree.inner_tree.get(ROOT_BRANCH))
            .and_then(|items| items.first())
            .map(|item| item.data.as_str())
            .ok_or_else(|| "no geometry in analysis output".to_string())?;

        serde_json::from_str(data).map_err(|e| format!("geometry is not valid JSON: {}", e))
    }

    /// Text lines of the report output, decoded where JSON-quoted.
    pub fn report_lines(&self) -> Vec<String> {
        self.values
            .iter()
            .filter(|tree| {
                let name = tree.param_name.as_str();
                name == REPORT_PARAM || name.strip_prefix("RH_OUT:") == Some(REPORT_PARAM)
            })
            .flat_map(|tree| tree.items())
            .map(|item| {
                serde_json::from_str::<String>(&item.data).unwrap_or_else(|_| item.data.clone())
            })
            .collect()
    }
}
