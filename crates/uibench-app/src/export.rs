//! Export use case for flattening a comparison into CSV or JSONL.
//!
//! One record per (test case, contestant), rows first and then columns, so the output
//! can be fed to spreadsheets or time-series ingestion.

use uibench_types::{ComparisonOutcome, ComparisonTable, TableCell};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// RFC 4180 compliant CSV with header row.
    Csv,
    /// JSON Lines format (one JSON object per line).
    Jsonl,
}

impl ExportFormat {
    /// Parse format from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "jsonl" => Some(ExportFormat::Jsonl),
            _ => None,
        }
    }
}

/// One exported cell. Statistics are in milliseconds and absent for degraded cells.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CellExportRow {
    pub test_case: String,
    pub name: String,
    pub version: String,

    /// `value`, or the degradation reason.
    pub state: String,

    pub samples: Option<usize>,
    pub median_ms: Option<f64>,
    pub mean_ms: Option<f64>,
    pub stdev_ms: Option<f64>,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,

    /// Percentage slower than the fastest contestant in the row.
    pub percent: Option<f64>,
}

const CSV_HEADER: &str =
    "test_case,name,version,state,samples,median_ms,mean_ms,stdev_ms,min_ms,max_ms,percent\n";

/// Use case for exporting comparison tables to different formats.
pub struct ExportUseCase;

impl ExportUseCase {
    /// Export a comparison to the specified format. An empty comparison exports no
    /// records (CSV still carries its header).
    pub fn export(outcome: &ComparisonOutcome, format: ExportFormat) -> anyhow::Result<String> {
        let rows = match outcome {
            ComparisonOutcome::NoData => Vec::new(),
            ComparisonOutcome::Table(table) => Self::table_to_rows(table),
        };

        match format {
            ExportFormat::Csv => Ok(Self::rows_to_csv(&rows)),
            ExportFormat::Jsonl => Self::rows_to_jsonl(&rows),
        }
    }

    fn table_to_rows(table: &ComparisonTable) -> Vec<CellExportRow> {
        let mut rows = Vec::with_capacity(table.rows.len() * table.columns.len());
        for row in &table.rows {
            for (column, cell) in table.columns.iter().zip(&row.cells) {
                let mut out = CellExportRow {
                    test_case: row.test_case.clone(),
                    name: column.name.clone(),
                    version: column.version.clone(),
                    state: "value".to_string(),
                    samples: None,
                    median_ms: None,
                    mean_ms: None,
                    stdev_ms: None,
                    min_ms: None,
                    max_ms: None,
                    percent: None,
                };
                match cell {
                    TableCell::Value(value) => {
                        let s = &value.summary;
                        out.samples = Some(s.count);
                        out.median_ms = Some(s.median * 1000.0);
                        out.mean_ms = Some(s.mean * 1000.0);
                        out.stdev_ms = Some(s.stdev * 1000.0);
                        out.min_ms = Some(s.min * 1000.0);
                        out.max_ms = Some(s.max * 1000.0);
                        out.percent = value.percent;
                    }
                    TableCell::Degraded { reason } => out.state = reason.as_str().to_string(),
                }
                rows.push(out);
            }
        }
        rows
    }

    /// Format rows as CSV (RFC 4180).
    fn rows_to_csv(rows: &[CellExportRow]) -> String {
        let mut output = String::from(CSV_HEADER);

        for row in rows {
            let fields = [
                csv_escape(&row.test_case),
                csv_escape(&row.name),
                csv_escape(&row.version),
                csv_escape(&row.state),
                row.samples.map_or(String::new(), |v| v.to_string()),
                fixed(row.median_ms),
                fixed(row.mean_ms),
                fixed(row.stdev_ms),
                fixed(row.min_ms),
                fixed(row.max_ms),
                fixed(row.percent),
            ];
            output.push_str(&fields.join(","));
            output.push('\n');
        }

        output
    }

    /// Format rows as JSONL.
    fn rows_to_jsonl(rows: &[CellExportRow]) -> anyhow::Result<String> {
        let mut output = String::new();

        for row in rows {
            output.push_str(&serde_json::to_string(row)?);
            output.push('\n');
        }

        Ok(output)
    }
}

fn fixed(v: Option<f64>) -> String {
    v.map_or(String::new(), |v| format!("{v:.3}"))
}

/// Escape a string for CSV per RFC 4180.
/// If the string contains comma, double quote, or newline, wrap in quotes and escape quotes.
fn csv_escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
