//! Application layer for uibench.
//!
//! The app layer coordinates adapters and domain logic.
//! It does not parse CLI flags and it does not do filesystem I/O.

mod export;
mod launch;
mod render;
mod sizes;

pub use export::{CellExportRow, ExportFormat, ExportUseCase};
pub use launch::{LaunchRequest, LaunchUseCase, launch_query, launch_url};
pub use render::{TableFormat, render, render_html, render_markdown};
pub use sizes::{BundleSize, BundleSizeUseCase};

use anyhow::Context;
use tracing::{debug, info, warn};
use uibench_adapters::AdapterError;
use uibench_domain::{ChangeEvent, ResultSet, build_table};
use uibench_types::{ComparisonOutcome, ConfigFile, HarnessMessage, Report};

/// Told about every report the session ingests.
pub trait ChangeListener {
    fn on_change(&mut self, event: &ChangeEvent, results: &ResultSet) -> anyhow::Result<()>;
}

impl<F> ChangeListener for F
where
    F: FnMut(&ChangeEvent, &ResultSet) -> anyhow::Result<()>,
{
    fn on_change(&mut self, event: &ChangeEvent, results: &ResultSet) -> anyhow::Result<()> {
        self(event, results)
    }
}

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Reports that made it into the result set.
    pub ingested: usize,

    /// Well-formed messages that were not reports.
    pub ignored: usize,

    /// Lines or payloads that could not be decoded.
    pub rejected: usize,
}

/// Owns the result set for one run of the harness and fans changes out to listeners.
#[derive(Default)]
pub struct ResultsSession {
    results: ResultSet,
    listeners: Vec<Box<dyn ChangeListener>>,
    stats: SessionStats,
}

impl ResultsSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl ChangeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Store `report` and notify listeners.
    ///
    /// The report is kept even when a listener fails; the first listener error is
    /// returned after every listener has been called.
    pub fn ingest_report(&mut self, report: Report) -> anyhow::Result<ChangeEvent> {
        let event = self.results.ingest_report(report);
        self.stats.ingested += 1;
        info!(
            report = event.report_index,
            name = %event.name,
            version = %event.version,
            new_test_cases = event.new_test_cases.len(),
            "report ingested"
        );

        let mut first_err = None;
        for listener in &mut self.listeners {
            if let Err(err) = listener.on_change(&event, &self.results) {
                warn!(error = %err, "change listener failed");
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err.context("notify change listeners")),
            None => Ok(event),
        }
    }

    /// Apply one harness message. Non-report messages are ignored; a report whose
    /// payload does not decode is counted as rejected and dropped.
    pub fn apply_message(&mut self, message: HarnessMessage) -> anyhow::Result<Option<ChangeEvent>> {
        let kind = message.kind.clone();
        match message.into_report() {
            Ok(Some(report)) => self.ingest_report(report).map(Some),
            Ok(None) => {
                debug!(kind = %kind, "ignoring non-report message");
                self.stats.ignored += 1;
                Ok(None)
            }
            Err(err) => {
                warn!(error = %err, "dropping report with malformed payload");
                self.stats.rejected += 1;
                Ok(None)
            }
        }
    }

    /// Drain a message source. Malformed lines are logged and skipped; any other
    /// source error stops the session.
    pub fn consume<I>(&mut self, source: I) -> anyhow::Result<SessionStats>
    where
        I: IntoIterator<Item = Result<HarnessMessage, AdapterError>>,
    {
        for item in source {
            match item {
                Ok(message) => {
                    self.apply_message(message)?;
                }
                Err(err) if err.is_recoverable() => {
                    warn!(error = %err, "skipping malformed harness message");
                    self.stats.rejected += 1;
                }
                Err(err) => return Err(err).context("read harness messages"),
            }
        }
        Ok(self.stats)
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn table(&self, filter: &str) -> ComparisonOutcome {
        build_table(&self.results, filter)
    }
}

impl std::fmt::Debug for ResultsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsSession")
            .field("results", &self.results)
            .field("listeners", &self.listeners.len())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Parse a contestant catalogue.
pub fn load_config(text: &str) -> anyhow::Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(text).context("parse uibench config")?;
    for (i, contestant) in config.contestants.iter().enumerate() {
        if contestant.name.trim().is_empty() {
            anyhow::bail!("contestant #{} has an empty name", i + 1);
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uibench_types::SampleSet;

    fn report(name: &str, cases: &[(&str, Vec<f64>)]) -> Report {
        let samples: SampleSet = cases.iter().map(|(n, s)| (*n, s.clone())).collect();
        Report::new(name, "1.0", samples)
    }

    fn message(json: &str) -> HarnessMessage {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn listeners_see_every_ingestion_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut session = ResultsSession::new();
        let sink = Rc::clone(&seen);
        session.subscribe(
            move |event: &ChangeEvent, results: &ResultSet| -> anyhow::Result<()> {
                sink.borrow_mut()
                    .push((event.report_index, results.reports().len()));
                Ok(())
            },
        );

        session.ingest_report(report("A", &[("x", vec![0.01])])).unwrap();
        session.ingest_report(report("B", &[("x", vec![0.02])])).unwrap();

        assert_eq!(*seen.borrow(), vec![(0, 1), (1, 2)]);
        assert_eq!(session.stats().ingested, 2);
    }

    #[test]
    fn failing_listener_does_not_lose_the_report() {
        let mut session = ResultsSession::new();
        session.subscribe(|_: &ChangeEvent, _: &ResultSet| -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        });

        let err = session
            .ingest_report(report("A", &[("x", vec![0.01])]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("disk full"));
        assert_eq!(session.results().reports().len(), 1);
    }

    #[test]
    fn apply_message_ignores_other_types_and_rejects_bad_payloads() {
        let mut session = ResultsSession::new();

        let event = session
            .apply_message(message(
                r#"{"type":"report","data":{"name":"A","version":"1","samples":{"x":[0.01]}}}"#,
            ))
            .unwrap();
        assert_eq!(event.map(|e| e.report_index), Some(0));

        assert!(session.apply_message(message(r#"{"type":"ping"}"#)).unwrap().is_none());
        assert!(
            session
                .apply_message(message(r#"{"type":"report","data":{"name":"B"}}"#))
                .unwrap()
                .is_none()
        );

        assert_eq!(
            session.stats(),
            SessionStats {
                ingested: 1,
                ignored: 1,
                rejected: 1,
            }
        );
    }

    #[test]
    fn consume_skips_malformed_lines() {
        let input = concat!(
            r#"{"type":"report","data":{"name":"A","version":"1","samples":{"x":[0.01]}}}"#,
            "\n{oops\n",
            r#"{"type":"report","data":{"name":"B","version":"1","samples":{"x":[0.02]}}}"#,
            "\n",
        );
        let source = uibench_adapters::JsonLinesSource::new(std::io::Cursor::new(input));
        let mut session = ResultsSession::new();
        let stats = session.consume(source).unwrap();

        assert_eq!(stats.ingested, 2);
        assert_eq!(stats.rejected, 1);
        let table = session.table("");
        assert_eq!(table.table().unwrap().columns.len(), 2);
    }

    #[test]
    fn consume_keeps_reports_after_a_non_utf8_line() {
        let mut input = Vec::new();
        input.extend_from_slice(
            br#"{"type":"report","data":{"name":"A","version":"1","samples":{"x":[0.01]}}}"#,
        );
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(
            br#"{"type":"report","data":{"name":"B","version":"1","samples":{"x":[0.02]}}}"#,
        );
        input.push(b'\n');

        let source = uibench_adapters::JsonLinesSource::new(std::io::Cursor::new(input));
        let mut session = ResultsSession::new();
        let stats = session.consume(source).unwrap();

        assert_eq!(stats.ingested, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(session.results().reports()[1].name, "B");
    }

    #[test]
    fn consume_stops_on_io_error() {
        let mut session = ResultsSession::new();
        let items = vec![Err(AdapterError::Io(std::io::Error::other("pipe closed")))];
        let err = session.consume(items).unwrap_err();
        assert!(format!("{err:#}").contains("pipe closed"));
    }

    #[test]
    fn empty_session_has_no_data() {
        assert_eq!(ResultsSession::new().table(""), ComparisonOutcome::NoData);
    }

    #[test]
    fn load_config_reads_contestants() {
        let config = load_config(
            r#"
            [defaults]
            iterations = 5

            [[contestant]]
            name = "React 15"
            benchmark_url = "https://localvoid.github.io/uibench-react/"
            bundle_url = "react/main.js"
            "#,
        )
        .unwrap();
        assert_eq!(config.defaults.iterations, 5);
        assert_eq!(config.contestants[0].bundle_url.to_vec(), vec!["react/main.js"]);
    }

    #[test]
    fn load_config_rejects_blank_names() {
        let err = load_config(
            r#"
            [[contestant]]
            name = " "
            benchmark_url = "x"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty name"));
    }

    #[test]
    fn load_config_reports_toml_errors() {
        let err = load_config("[[contestant]\n").unwrap_err();
        assert!(err.to_string().contains("parse uibench config"));
    }
}
