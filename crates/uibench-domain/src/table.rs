use crate::results::ResultSet;
use crate::{DomainError, round_ms, slowness_color, summarize};
use uibench_types::{
    CellValue, ColumnHeader, ComparisonOutcome, ComparisonTable, DegradedReason, Report,
    SampleSummary, TABLE_SCHEMA_V1, TableCell, TableRow,
};

/// Maps `[domain_min, domain_max]` onto `[0, 1]`.
///
/// A zero-width domain (every value equal) maps everything to 0.
pub fn linear_scale(domain_min: f64, domain_max: f64) -> impl Fn(f64) -> f64 {
    let width = domain_max - domain_min;
    move |x| {
        if width > 0.0 {
            (x - domain_min) / width
        } else {
            0.0
        }
    }
}

/// Lay out the comparison matrix: one column per report, one row per test case whose
/// name contains `filter` (case-sensitive; empty matches everything).
///
/// Cells whose statistics cannot be computed are returned as
/// [`TableCell::Degraded`]; they never fail the table. The overall-time row always
/// covers every test case, filtered or not.
pub fn build_table(results: &ResultSet, filter: &str) -> ComparisonOutcome {
    if results.is_empty() {
        return ComparisonOutcome::NoData;
    }

    let reports = results.reports();
    let columns = reports
        .iter()
        .map(|r| ColumnHeader {
            name: r.name.clone(),
            version: r.version.clone(),
            label: r.label(),
        })
        .collect();

    let mut overall_time_ms = vec![0i64; reports.len()];
    let mut rows = Vec::new();

    for test_case in results.test_case_names() {
        let cells = build_row(reports, test_case);

        for (total, cell) in overall_time_ms.iter_mut().zip(&cells) {
            if let Some(v) = cell.value() {
                *total = total.saturating_add(v.display_ms);
            }
        }

        if test_case.contains(filter) {
            rows.push(TableRow {
                test_case: test_case.clone(),
                cells,
            });
        }
    }

    ComparisonOutcome::Table(ComparisonTable {
        schema: TABLE_SCHEMA_V1.to_string(),
        filter: filter.to_string(),
        columns,
        overall_time_ms,
        rows,
    })
}

fn build_row(reports: &[Report], test_case: &str) -> Vec<TableCell> {
    let summaries: Vec<Result<SampleSummary, DegradedReason>> = reports
        .iter()
        .map(|report| match report.samples.get(test_case) {
            None => Err(DegradedReason::MissingTestCase),
            Some(samples) => summarize(samples).map_err(degraded_reason),
        })
        .collect();

    let medians = summaries
        .iter()
        .filter_map(|s| s.as_ref().ok())
        .map(|s| s.median);
    let Some((row_min, row_max)) = medians.fold(None, |acc: Option<(f64, f64)>, m| match acc {
        None => Some((m, m)),
        Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
    }) else {
        // Nothing in this row could be summarized.
        return summaries
            .into_iter()
            .filter_map(Result::err)
            .map(|reason| TableCell::Degraded { reason })
            .collect();
    };

    let scale = linear_scale(row_min, row_max);

    summaries
        .into_iter()
        .map(|summary| match summary {
            Err(reason) => TableCell::Degraded { reason },
            Ok(summary) => TableCell::Value(cell_value(summary, row_min, &scale)),
        })
        .collect()
}

const UNBOUNDED_PERCENT: &str = "(+inf%)";

fn cell_value(summary: SampleSummary, row_min: f64, scale: &impl Fn(f64) -> f64) -> CellValue {
    let (percent, percent_annotation) = if summary.median == row_min {
        (None, None)
    } else {
        let p = ((summary.median / row_min) - 1.0) * 100.0;
        if p.is_finite() {
            (Some(p), Some(format!("({p:.2}%)")))
        } else {
            // Zero row minimum: slower, but by no finite ratio.
            (None, Some(UNBOUNDED_PERCENT.to_string()))
        }
    };
    let t = scale(summary.median);

    CellValue {
        summary,
        display_ms: round_ms(summary.median),
        percent,
        percent_annotation,
        scale: t,
        background: slowness_color(t),
        tooltip: tooltip(&summary),
    }
}

fn tooltip(s: &SampleSummary) -> String {
    format!(
        "samples: {}\nmedian: {}\nmean: {}\nstdev: {}\nmin: {}\nmax: {}",
        s.count,
        round_ms(s.median),
        round_ms(s.mean),
        round_ms(s.stdev),
        round_ms(s.min),
        round_ms(s.max),
    )
}

fn degraded_reason(err: DomainError) -> DegradedReason {
    match err {
        DomainError::EmptySampleSet => DegradedReason::EmptySampleSet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uibench_types::SampleSet;

    fn set(entries: &[(&str, Vec<f64>)]) -> SampleSet {
        entries.iter().map(|(n, s)| (*n, s.clone())).collect()
    }

    fn table(results: &ResultSet, filter: &str) -> ComparisonTable {
        match build_table(results, filter) {
            ComparisonOutcome::Table(t) => t,
            ComparisonOutcome::NoData => panic!("expected a table"),
        }
    }

    fn two_libs() -> ResultSet {
        let mut results = ResultSet::new();
        results.ingest("Lib1", "1.0", set(&[("render", vec![0.010, 0.012, 0.011])]));
        results.ingest("Lib2", "2.0", set(&[("render", vec![0.020, 0.021, 0.019])]));
        results
    }

    #[test]
    fn empty_result_set_has_no_data() {
        assert_eq!(build_table(&ResultSet::new(), ""), ComparisonOutcome::NoData);
    }

    #[test]
    fn two_library_render_row() {
        let t = table(&two_libs(), "");
        assert_eq!(t.schema, TABLE_SCHEMA_V1);
        let labels: Vec<&str> = t.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Lib1 (1.0)", "Lib2 (2.0)"]);

        assert_eq!(t.rows.len(), 1);
        let row = &t.rows[0];
        assert_eq!(row.test_case, "render");

        let fast = row.cells[0].value().unwrap();
        assert_eq!(fast.display_ms, 11);
        assert_eq!(fast.percent, None);
        assert_eq!(fast.percent_annotation, None);
        assert_eq!(fast.scale, 0.0);
        assert_eq!(fast.background, slowness_color(0.0));

        let slow = row.cells[1].value().unwrap();
        assert_eq!(slow.display_ms, 20);
        assert_eq!(slow.percent_annotation.as_deref(), Some("(81.82%)"));
        assert_eq!(slow.scale, 1.0);
        assert_eq!(slow.background, slowness_color(1.0));

        assert_eq!(t.overall_time_ms, vec![11, 20]);
    }

    #[test]
    fn tooltip_lists_six_statistics_in_milliseconds() {
        let t = table(&two_libs(), "");
        let cell = t.rows[0].cells[0].value().unwrap();
        assert_eq!(
            cell.tooltip,
            "samples: 3\nmedian: 11\nmean: 11\nstdev: 1\nmin: 10\nmax: 12"
        );
    }

    #[test]
    fn filter_keeps_matching_rows_only() {
        let mut results = ResultSet::new();
        results.ingest(
            "Lib",
            "1",
            set(&[("render", vec![0.010]), ("filter/32", vec![0.005])]),
        );

        let t = table(&results, "filt");
        let names: Vec<&str> = t.rows.iter().map(|r| r.test_case.as_str()).collect();
        assert_eq!(names, vec!["filter/32"]);
        assert_eq!(t.filter, "filt");

        // Overall time still covers the filtered-out row.
        assert_eq!(t.overall_time_ms, vec![15]);
    }

    #[test]
    fn filter_is_case_sensitive() {
        let mut results = ResultSet::new();
        results.ingest("Lib", "1", set(&[("Render", vec![0.010])]));
        assert!(table(&results, "render").rows.is_empty());
        assert_eq!(table(&results, "Rend").rows.len(), 1);
    }

    #[test]
    fn empty_samples_degrade_only_that_cell() {
        let mut results = ResultSet::new();
        results.ingest("A", "1", set(&[("x", vec![]), ("y", vec![0.002])]));
        results.ingest("B", "1", set(&[("x", vec![0.004]), ("y", vec![0.003])]));

        let t = table(&results, "");
        let x = &t.rows[0];
        assert_eq!(
            x.cells[0],
            TableCell::Degraded {
                reason: DegradedReason::EmptySampleSet
            }
        );
        let b = x.cells[1].value().unwrap();
        assert_eq!(b.display_ms, 4);
        assert_eq!(b.percent, None, "only valid cells compete for the row minimum");

        assert_eq!(t.overall_time_ms, vec![2, 7]);
    }

    #[test]
    fn missing_test_case_is_degraded() {
        let mut results = ResultSet::new();
        results.ingest("A", "1", set(&[("only-a", vec![0.001])]));
        results.ingest("B", "1", set(&[("only-b", vec![0.001])]));

        let t = table(&results, "");
        assert_eq!(
            t.rows[0].cells[1],
            TableCell::Degraded {
                reason: DegradedReason::MissingTestCase
            }
        );
        assert_eq!(
            t.rows[1].cells[0],
            TableCell::Degraded {
                reason: DegradedReason::MissingTestCase
            }
        );
    }

    #[test]
    fn row_with_no_valid_cells_is_all_degraded() {
        let mut results = ResultSet::new();
        results.ingest("A", "1", set(&[("x", vec![])]));
        results.ingest("B", "1", set(&[("y", vec![0.001])]));
        let t = table(&results, "x");
        assert_eq!(t.rows.len(), 1);
        assert!(t.rows[0].cells.iter().all(|c| c.value().is_none()));
        assert_eq!(t.rows[0].cells.len(), 2);
    }

    #[test]
    fn equal_medians_share_the_fastest_color() {
        let mut results = ResultSet::new();
        results.ingest("A", "1", set(&[("x", vec![0.005])]));
        results.ingest("B", "1", set(&[("x", vec![0.004, 0.006])]));

        let t = table(&results, "");
        for cell in &t.rows[0].cells {
            let v = cell.value().unwrap();
            assert_eq!(v.scale, 0.0);
            assert_eq!(v.percent, None);
            assert_eq!(v.background, slowness_color(0.0));
        }
    }

    #[test]
    fn zero_row_minimum_marks_slower_cells_as_unbounded() {
        let mut results = ResultSet::new();
        results.ingest("Instant", "1", set(&[("x", vec![0.0])]));
        results.ingest("Slow", "1", set(&[("x", vec![0.005])]));

        let t = table(&results, "");
        let fast = t.rows[0].cells[0].value().unwrap();
        assert_eq!(fast.percent_annotation, None);

        let slow = t.rows[0].cells[1].value().unwrap();
        assert_eq!(slow.percent, None);
        assert_eq!(slow.percent_annotation.as_deref(), Some("(+inf%)"));
        assert_eq!(slow.scale, 1.0);
        assert_eq!(slow.display_ms, 5);
    }

    #[test]
    fn huge_medians_saturate_instead_of_overflowing() {
        let mut results = ResultSet::new();
        results.ingest("Lib", "1", set(&[("a", vec![1e300]), ("b", vec![1e300])]));
        results.ingest("Other", "1", set(&[("a", vec![0.001]), ("b", vec![0.002])]));

        let t = table(&results, "");
        assert_eq!(t.overall_time_ms, vec![i64::MAX, 3]);
        assert_eq!(t.rows[0].cells[0].value().unwrap().display_ms, i64::MAX);
    }

    #[test]
    fn linear_scale_maps_domain_to_unit_interval() {
        let s = linear_scale(2.0, 6.0);
        assert_eq!(s(2.0), 0.0);
        assert_eq!(s(4.0), 0.5);
        assert_eq!(s(6.0), 1.0);

        let flat = linear_scale(3.0, 3.0);
        assert_eq!(flat(3.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_scale_and_annotations_are_consistent(
            medians in prop::collection::vec(0.001f64..1.0, 1..8),
        ) {
            let mut results = ResultSet::new();
            for (i, m) in medians.iter().enumerate() {
                results.ingest(format!("lib{i}"), "1", set(&[("case", vec![*m])]));
            }
            let t = table(&results, "");
            let row_min = medians.iter().cloned().fold(f64::INFINITY, f64::min);

            prop_assert_eq!(t.rows[0].cells.len(), medians.len());
            for (cell, m) in t.rows[0].cells.iter().zip(&medians) {
                let v = cell.value().unwrap();
                prop_assert!((0.0..=1.0).contains(&v.scale));
                if *m == row_min {
                    prop_assert_eq!(v.scale, 0.0);
                    prop_assert!(v.percent_annotation.is_none());
                } else {
                    prop_assert!(v.percent.unwrap() >= 0.0);
                }
            }
        }
    }
}
