#![no_main]

use libfuzzer_sys::fuzz_target;
use uibench_domain::{ResultSet, build_table};
use uibench_types::Report;

fuzz_target!(|input: (Vec<Report>, String)| {
    let (reports, filter) = input;
    let mut results = ResultSet::new();
    for report in reports {
        results.ingest_report(report);
    }

    let Some(table) = build_table(&results, &filter).table().cloned() else {
        assert!(results.is_empty());
        return;
    };
    assert_eq!(table.columns.len(), results.reports().len());
    assert_eq!(table.overall_time_ms.len(), table.columns.len());
    for row in &table.rows {
        assert!(row.test_case.contains(filter.as_str()));
        assert_eq!(row.cells.len(), table.columns.len());
    }
});
