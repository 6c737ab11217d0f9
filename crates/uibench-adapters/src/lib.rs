//! Std adapters for uibench.
//!
//! In clean-arch terms: this is where we touch the world. Harness messages come in
//! through a line-oriented reader; bundle sizes come from the filesystem.

use anyhow::Context;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use uibench_types::HarnessMessage;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("malformed harness message on line {line}: {source}")]
    MalformedMessage {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported bundle location {0:?} (expected a local path or file:// URL)")]
    UnsupportedLocation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdapterError {
    /// True when the stream itself is still usable and only one message was bad.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AdapterError::MalformedMessage { .. })
    }
}

/// Reads one JSON harness envelope per line. Blank lines are skipped.
///
/// A line that does not parse (including one that is not valid UTF-8) yields
/// [`AdapterError::MalformedMessage`] and the iterator carries on with the next line;
/// an I/O error ends the stream.
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = Result<HarnessMessage, AdapterError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            // Raw bytes, so a line that is not UTF-8 is a bad message rather than a
            // read failure.
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line += 1;
                    let bytes = self.buf.trim_ascii();
                    if bytes.is_empty() {
                        continue;
                    }
                    trace!(line = self.line, "harness message received");
                    return Some(serde_json::from_slice(bytes).map_err(|source| {
                        AdapterError::MalformedMessage {
                            line: self.line,
                            source,
                        }
                    }));
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(AdapterError::Io(err)));
                }
            }
        }
        None
    }
}

/// Size in bytes of one bundle file.
pub trait BundleProbe {
    fn bundle_len(&self, location: &str) -> Result<u64, AdapterError>;
}

/// Resolves bundles on the local filesystem: plain paths (relative to an optional base
/// directory) and `file://` URLs.
#[derive(Debug, Default, Clone)]
pub struct FsBundleProbe {
    base_dir: Option<PathBuf>,
}

impl FsBundleProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, location: &str) -> Result<PathBuf, AdapterError> {
        if location.starts_with("file:") {
            let url = url::Url::parse(location)
                .map_err(|_| AdapterError::UnsupportedLocation(location.to_string()))?;
            return url
                .to_file_path()
                .map_err(|_| AdapterError::UnsupportedLocation(location.to_string()));
        }
        if location.contains("://") {
            return Err(AdapterError::UnsupportedLocation(location.to_string()));
        }

        let path = Path::new(location);
        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        })
    }
}

impl BundleProbe for FsBundleProbe {
    fn bundle_len(&self, location: &str) -> Result<u64, AdapterError> {
        let path = self.resolve(location)?;
        let meta = std::fs::metadata(&path)
            .with_context(|| format!("stat bundle {}", path.display()))?;
        debug!(location, bytes = meta.len(), "probed bundle");
        Ok(meta.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn json_lines_skips_blank_lines_and_reports_bad_ones() {
        let input = concat!(
            r#"{"type":"report","data":{"name":"A","version":"1","samples":{"x":[0.1]}}}"#,
            "\n\n   \n",
            "not json\n",
            r#"{"type":"ping"}"#,
            "\n",
        );
        let items: Vec<_> = JsonLinesSource::new(Cursor::new(input)).collect();
        assert_eq!(items.len(), 3);

        let first = items[0].as_ref().unwrap();
        assert!(first.is_report());

        let err = items[1].as_ref().unwrap_err();
        assert!(matches!(err, AdapterError::MalformedMessage { line: 4, .. }));
        assert!(err.is_recoverable());

        assert_eq!(items[2].as_ref().unwrap().kind, "ping");
    }

    #[test]
    fn json_lines_treats_invalid_utf8_as_a_bad_line() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"type":"report","data":{}}"#);
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(br#"{"type":"ping"}"#);
        input.push(b'\n');

        let items: Vec<_> = JsonLinesSource::new(Cursor::new(input)).collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        let err = items[1].as_ref().unwrap_err();
        assert!(matches!(err, AdapterError::MalformedMessage { line: 2, .. }));
        assert!(err.is_recoverable());
        assert_eq!(items[2].as_ref().unwrap().kind, "ping");
    }

    #[test]
    fn json_lines_handles_missing_trailing_newline() {
        let input = r#"{"type":"report","data":{}}"#;
        let mut source = JsonLinesSource::new(Cursor::new(input));
        assert!(source.next().unwrap().is_ok());
        assert!(source.next().is_none());
        assert_eq!(source.line(), 1);
    }

    #[test]
    fn fs_probe_reads_relative_and_file_url_locations() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("bundle.js");
        std::fs::write(&bundle, b"console.log(1);").unwrap();

        let probe = FsBundleProbe::with_base_dir(dir.path());
        assert_eq!(probe.bundle_len("bundle.js").unwrap(), 15);

        let url = url::Url::from_file_path(&bundle).unwrap();
        assert_eq!(FsBundleProbe::new().bundle_len(url.as_str()).unwrap(), 15);
    }

    #[test]
    fn fs_probe_rejects_remote_urls() {
        let err = FsBundleProbe::new()
            .bundle_len("https://example.com/bundle.js")
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedLocation(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn fs_probe_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let probe = FsBundleProbe::with_base_dir(dir.path());
        assert!(matches!(
            probe.bundle_len("nope.js"),
            Err(AdapterError::Other(_))
        ));
    }
}
