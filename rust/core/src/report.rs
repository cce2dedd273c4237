// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Report text parsing
//!
//! The generator emits one `key = value` line per design decision, optionally
//! followed by `weil <justification>`, plus monthly weather lines whose key
//! names a German calendar month:
//!
//! ```text
//! Dämmung = Holzfaser weil diffusionsoffen
//! Schneefall Januar = 12.5
//! Niederschlag Januar = 48
//! ```
//!
//! Parameters keep their value as text; weather readings are parsed as `f64`
//! and a reading that fails to parse is reported as
//! [`ReportError::MalformedLine`] rather than silently zeroed.

use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ReportError;

/// German month names recognised in weather keys
pub const MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// Weather metric for monthly snowfall
pub const SNOWFALL: &str = "Schneefall [mm]";
/// Weather metric for monthly precipitation
pub const PRECIPITATION: &str = "Niederschlag [mm]";

const SEPARATOR: &str = " = ";
const JUSTIFICATION_MARKER: &str = "weil";

/// Insertion-ordered map keyed by string.
///
/// Re-inserting an existing key replaces its value in place.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: FxHashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or replace, returning the previous value.
    pub fn insert(&mut self, key: String, value: V) -> Option<V> {
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Value for `key`, inserting `make()` at the end if absent.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(key.to_string(), i);
                self.entries.push((key.to_string(), make()));
                i
            }
        };
        &mut self.entries[i].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A named design parameter with its reasoning
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParameterEntry {
    pub value: String,
    pub justification: String,
}

/// Parsed report: design parameters and monthly weather readings.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Report {
    pub parameters: OrderedMap<ParameterEntry>,
    /// Month name -> metric name -> reading
    pub weather: OrderedMap<OrderedMap<f64>>,
}

/// Rows and headers ready for a table view
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TableData<T> {
    pub column_headers: Vec<String>,
    pub row_headers: Vec<String>,
    pub rows: Vec<Vec<T>>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.weather.is_empty()
    }

    /// Parameter table with value and justification columns.
    pub fn parameter_table(&self) -> TableData<String> {
        TableData {
            column_headers: vec!["Wert".to_string(), "Begründung".to_string()],
            row_headers: self.parameters.keys().map(str::to_string).collect(),
            rows: self
                .parameters
                .iter()
                .map(|(_, entry)| vec![entry.value.clone(), entry.justification.clone()])
                .collect(),
        }
    }

    /// Weather table, one row per month; missing metrics render as zero.
    pub fn weather_table(&self) -> TableData<f64> {
        let metrics = [SNOWFALL, PRECIPITATION];
        TableData {
            column_headers: metrics.iter().map(|m| m.to_string()).collect(),
            row_headers: self.weather.keys().map(str::to_string).collect(),
            rows: self
                .weather
                .iter()
                .map(|(_, readings)| {
                    metrics
                        .iter()
                        .map(|metric| readings.get(metric).copied().unwrap_or(0.0))
                        .collect()
                })
                .collect(),
        }
    }

    fn record_weather(&mut self, line: &str, key: &str, value: &str) -> Result<(), ReportError> {
        let metric = if key.contains("Schneefall") {
            SNOWFALL
        } else if key.contains("Niederschlag") {
            PRECIPITATION
        } else {
            return Ok(());
        };

        let Some(month) = month_token(key) else {
            return Ok(());
        };

        let value = value.trim();
        let reading = value
            .parse::<f64>()
            .map_err(|_| ReportError::MalformedLine {
                line: line.to_string(),
                value: value.to_string(),
            })?;

        self.weather
            .get_or_insert_with(month, OrderedMap::new)
            .insert(metric.to_string(), reading);
        Ok(())
    }
}

/// Parse report lines into parameters and weather readings.
///
/// Lines without a `" = "` separator are ignored. Month keys that name
/// neither snowfall nor precipitation contribute nothing. The first
/// malformed weather reading fails the whole report; see
/// [`parse_report_lenient`] to keep the readable lines instead.
pub fn parse_report<I, S>(lines: I) -> Result<Report, ReportError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (report, mut malformed) = parse_report_lenient(lines);
    if malformed.is_empty() {
        Ok(report)
    } else {
        Err(malformed.swap_remove(0))
    }
}

/// Like [`parse_report`], but malformed weather lines are dropped and
/// returned in input order next to the report built from the other lines.
pub fn parse_report_lenient<I, S>(lines: I) -> (Report, Vec<ReportError>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = Report::default();
    let mut malformed = Vec::new();

    for raw in lines {
        let line = strip_quotes(raw.as_ref().trim());
        let Some((key, rest)) = line.split_once(SEPARATOR) else {
            continue;
        };

        let (value, justification) = match rest.split_once(JUSTIFICATION_MARKER) {
            Some((value, justification)) => (value, justification.trim()),
            None => (rest, ""),
        };

        if MONTHS.iter().any(|month| key.contains(month)) {
            if let Err(e) = report.record_weather(line, key, value) {
                malformed.push(e);
            }
        } else {
            report.parameters.insert(
                key.trim().to_string(),
                ParameterEntry {
                    value: value.trim().to_string(),
                    justification: justification.to_string(),
                },
            );
        }
    }

    (report, malformed)
}

fn strip_quotes(line: &str) -> &str {
    line.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(line)
}

/// The whitespace token naming the month, else the second token.
fn month_token(key: &str) -> Option<&str> {
    key.split_whitespace()
        .find(|token| MONTHS.contains(token))
        .or_else(|| key.split_whitespace().nth(1))
}
