use std::collections::HashMap;
use uibench_types::{Report, SampleSet};

/// Every report received in this session, plus the first-seen registry of test cases.
///
/// # Invariants
///
/// - `reports` only grows; stored reports are never mutated or removed.
/// - `test_case_names` is the union of all sample keys of all reports, in first-seen
///   order, without duplicates.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    reports: Vec<Report>,
    test_case_names: Vec<String>,
    test_case_index: HashMap<String, usize>,
}

/// Emitted by every ingestion so views can re-derive themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Column of the report that was just appended.
    pub report_index: usize,
    pub name: String,
    pub version: String,

    /// Test cases this report introduced, in the report's order.
    pub new_test_cases: Vec<String>,

    pub report_count: usize,
    pub test_case_count: usize,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one report. Never rejects: sample validity is only checked when the
    /// table is built.
    pub fn ingest(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
        samples: SampleSet,
    ) -> ChangeEvent {
        self.ingest_report(Report::new(name, version, samples))
    }

    pub fn ingest_report(&mut self, report: Report) -> ChangeEvent {
        let mut new_test_cases = Vec::new();
        for test_case in report.samples.names() {
            if !self.test_case_index.contains_key(test_case) {
                self.test_case_index
                    .insert(test_case.to_string(), self.test_case_names.len());
                self.test_case_names.push(test_case.to_string());
                new_test_cases.push(test_case.to_string());
            }
        }

        let event = ChangeEvent {
            report_index: self.reports.len(),
            name: report.name.clone(),
            version: report.version.clone(),
            new_test_cases,
            report_count: self.reports.len() + 1,
            test_case_count: self.test_case_names.len(),
        };
        self.reports.push(report);
        event
    }

    /// Reports in arrival order (table column order).
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Test cases in first-seen order (table row order).
    pub fn test_case_names(&self) -> &[String] {
        &self.test_case_names
    }

    pub fn test_case_position(&self, test_case: &str) -> Option<usize> {
        self.test_case_index.get(test_case).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
