// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persisted report text between the model run and the table views.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ReportError, Result};
use crate::report::{parse_report, parse_report_lenient, Report};

/// Raw report lines as written by the generator: `{"text_lines": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSource {
    #[serde(default)]
    pub text_lines: Vec<String>,
}

impl ReportSource {
    pub fn new(text_lines: Vec<String>) -> Self {
        Self { text_lines }
    }

    pub fn is_empty(&self) -> bool {
        self.text_lines.is_empty()
    }

    /// Read a report file. A missing or blank file is an empty report.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No report file, using empty report");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse the stored lines.
    pub fn parse(&self) -> std::result::Result<Report, ReportError> {
        parse_report(&self.text_lines)
    }

    /// Parse the stored lines, setting malformed weather lines aside.
    pub fn parse_lenient(&self) -> (Report, Vec<ReportError>) {
        parse_report_lenient(&self.text_lines)
    }
}
