#![no_main]

use libfuzzer_sys::fuzz_target;
use uibench_adapters::JsonLinesSource;
use uibench_app::{ExportFormat, ExportUseCase, ResultsSession, render_html, render_markdown};

fuzz_target!(|data: &[u8]| {
    let mut session = ResultsSession::new();
    if session.consume(JsonLinesSource::new(data)).is_err() {
        return;
    }
    let outcome = session.table("");
    let _ = render_markdown(&outcome);
    let _ = render_html(&outcome);
    let _ = ExportUseCase::export(&outcome, ExportFormat::Csv);
});
