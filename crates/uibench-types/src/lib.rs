//! Shared types for uibench.
//!
//! Design goal: versioned, explicit, boring.
//! These structs are the harness message contract, the comparison table handed to
//! renderers, and the launch config file.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TABLE_SCHEMA_V1: &str = "uibench.table.v1";
pub const CONFIG_SCHEMA_V1: &str = "uibench.config.v1";

/// Envelope `type` carried by harness report messages.
pub const REPORT_MESSAGE_TYPE: &str = "report";

pub const OVERALL_TIME_LABEL: &str = "Overall Time";

/// Shown next to every rendering of the overall-time row.
pub const OVERALL_TIME_CAVEAT: &str = "Don't use the Overall Time row to make any conclusions, \
like library X is N times faster than library Y. It sums unrelated test cases and is only \
meant to help library developers spot regressions.";

// ----------------------------
// Harness reports
// ----------------------------

/// Test-case name → raw timing samples (seconds), in the order the harness listed them.
///
/// Key order matters: it drives first-seen row ordering in the result set. A repeated
/// key keeps its first position and takes the last samples. Equality is
/// order-sensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct SampleSet {
    entries: IndexMap<String, Vec<f64>>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, test_case: impl Into<String>, samples: Vec<f64>) {
        self.entries.insert(test_case.into(), samples);
    }

    pub fn get(&self, test_case: &str) -> Option<&[f64]> {
        self.entries.get(test_case).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.entries
            .iter()
            .map(|(name, samples)| (name.as_str(), samples.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for SampleSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<f64>)> for SampleSet {
    fn from_iter<I: IntoIterator<Item = (K, Vec<f64>)>>(iter: I) -> Self {
        let mut set = SampleSet::new();
        for (name, samples) in iter {
            set.insert(name, samples);
        }
        set
    }
}

/// One benchmark run submitted by one contestant.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Report {
    pub name: String,
    pub version: String,

    #[schemars(with = "BTreeMap<String, Vec<f64>>")]
    pub samples: SampleSet,
}

impl Report {
    pub fn new(name: impl Into<String>, version: impl Into<String>, samples: SampleSet) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            samples,
        }
    }

    /// Column label, `name (version)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.version)
    }
}

/// Envelope posted by a harness window: `{"type": "report", "data": {...}}`.
///
/// Harnesses post other message types too; only `report` carries results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct HarnessMessage {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub data: serde_json::Value,
}

impl HarnessMessage {
    pub fn report(report: &Report) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: REPORT_MESSAGE_TYPE.to_string(),
            data: serde_json::to_value(report)?,
        })
    }

    pub fn is_report(&self) -> bool {
        self.kind == REPORT_MESSAGE_TYPE
    }

    /// Decode the payload of a `report` message. Other message types yield `Ok(None)`.
    pub fn into_report(self) -> Result<Option<Report>, serde_json::Error> {
        if !self.is_report() {
            return Ok(None);
        }
        serde_json::from_value(self.data).map(Some)
    }
}

// ----------------------------
// Statistics
// ----------------------------

/// Descriptive statistics for one contestant's samples of one test case (seconds).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SampleSummary {
    pub count: usize,
    pub median: f64,
    pub mean: f64,

    /// Population standard deviation (divisor = count).
    pub stdev: f64,

    pub min: f64,
    pub max: f64,
}

// ----------------------------
// Comparison table
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ColumnHeader {
    pub name: String,
    pub version: String,

    /// `name (version)`
    pub label: String,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    /// The report listed the test case with zero samples.
    EmptySampleSet,

    /// The report did not list the test case at all.
    MissingTestCase,
}

impl DegradedReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DegradedReason::EmptySampleSet => "empty_sample_set",
            DegradedReason::MissingTestCase => "missing_test_case",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CellValue {
    pub summary: SampleSummary,

    /// Median in whole milliseconds.
    pub display_ms: i64,

    /// `(median / row_min - 1) * 100`; `None` for the row's fastest cell(s) and when the
    /// row minimum is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,

    /// `percent` formatted for display, e.g. `(81.82%)`, or `(+inf%)` for a slower cell
    /// in a row whose minimum is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_annotation: Option<String>,

    /// Position of the median in the row, 0 = fastest, 1 = slowest.
    pub scale: f64,

    /// `#rrggbb`
    pub background: String,

    /// Newline-separated statistics in milliseconds.
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableCell {
    Value(CellValue),
    Degraded { reason: DegradedReason },
}

impl TableCell {
    pub fn value(&self) -> Option<&CellValue> {
        match self {
            TableCell::Value(v) => Some(v),
            TableCell::Degraded { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TableRow {
    pub test_case: String,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ComparisonTable {
    pub schema: String,

    /// Substring filter the rows were selected with (empty = all rows).
    pub filter: String,

    pub columns: Vec<ColumnHeader>,

    /// Per column, the sum of rounded millisecond medians over every test case,
    /// regardless of `filter`. Not a ranking; see [`OVERALL_TIME_CAVEAT`].
    pub overall_time_ms: Vec<i64>,

    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    /// No report has been received yet.
    NoData,
    Table(ComparisonTable),
}

impl ComparisonOutcome {
    pub fn table(&self) -> Option<&ComparisonTable> {
        match self {
            ComparisonOutcome::NoData => None,
            ComparisonOutcome::Table(t) => Some(t),
        }
    }
}

// ----------------------------
// Config file schema
// ----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: LaunchOptions,

    #[serde(default, rename = "contestant")]
    pub contestants: Vec<Contestant>,
}

/// Options forwarded to harness windows through the launch query string.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LaunchOptions {
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Ask the harness to disable `shouldComponentUpdate`-style short circuits.
    #[serde(default)]
    pub disable_scu: bool,

    #[serde(default)]
    pub enable_dom_recycling: bool,

    #[serde(default)]
    pub mobile_mode: bool,

    /// Only run test cases whose name contains this string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_filter: Option<String>,
}

fn default_iterations() -> u32 {
    3
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            disable_scu: false,
            enable_dom_recycling: false,
            mobile_mode: false,
            test_filter: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Contestant {
    pub name: String,

    /// Project homepage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Page that runs the harness and posts reports back.
    pub benchmark_url: String,

    #[serde(default)]
    pub bundle_url: BundleLocations,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// One bundle, or a bundle split across several files (sizes are summed).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(untagged)]
pub enum BundleLocations {
    One(String),
    Many(Vec<String>),
}

impl Default for BundleLocations {
    fn default() -> Self {
        BundleLocations::Many(Vec::new())
    }
}

impl BundleLocations {
    pub fn to_vec(&self) -> Vec<&str> {
        match self {
            BundleLocations::One(s) => vec![s.as_str()],
            BundleLocations::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}
