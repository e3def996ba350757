//! Batch conversion driver: per-file isolation, file mode and stream mode.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::{CollisionPolicy, DecodeConfig};
use crate::parser::eml;
use crate::report;

/// Everything the driver needs, resolved from config file + CLI flags.
///
/// The output directory is an explicit input; the driver never writes into
/// the ambient working directory unless told to.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub output_dir: PathBuf,
    pub collision: CollisionPolicy,
    pub decode: DecodeConfig,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            collision: CollisionPolicy::default(),
            decode: DecodeConfig::default(),
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record<T>(&mut self, path: &Path, result: crate::error::Result<T>) {
        match result {
            Ok(_) => self.converted += 1,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to convert message");
                self.failed += 1;
            }
        }
    }
}

/// Convert each input to a report file under `opts.output_dir`.
///
/// A failure on one file never stops the rest of the batch; failures are
/// logged with their path and counted in the summary.
pub fn convert_to_files(inputs: &[PathBuf], opts: &ConvertOptions) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for path in inputs {
        let result = eml::parse_eml(path, &opts.decode).and_then(|msg| {
            let written = report::write_report(&msg, &opts.output_dir, opts.collision)?;
            info!(input = %path.display(), output = %written.display(), "Converted");
            Ok(())
        });
        summary.record(path, result);
    }

    summary
}

/// Convert each input and print the reports to `out`, in argument order.
///
/// Nothing is written to disk. Reports are separated by the layout's own
/// trailing blank line.
pub fn convert_to_stream(
    inputs: &[PathBuf],
    opts: &ConvertOptions,
    out: &mut dyn Write,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for path in inputs {
        let result = eml::parse_eml(path, &opts.decode).and_then(|msg| {
            writeln!(out, "{}", report::format_report(&msg))
                .map_err(|e| crate::error::EmlError::io(path, e))
        });
        summary.record(path, result);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const SIMPLE: &[u8] = b"From: a@b.com\r\n\
        Subject: Hello\r\n\
        Date: Thu, 04 Jan 2024 10:00:00 +0000\r\n\
        Content-Type: text/plain; charset=\"utf-8\"\r\n\
        \r\n\
        Hi there";

    #[test]
    fn test_stream_mode_order_and_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_fixture(dir.path(), "first.eml", SIMPLE);
        let second = write_fixture(
            dir.path(),
            "second.eml",
            b"From: c@d.com\r\nSubject: Second\r\n\r\nbody two",
        );

        let out_dir = tempfile::tempdir().unwrap();
        let opts = ConvertOptions {
            output_dir: out_dir.path().to_path_buf(),
            ..Default::default()
        };

        let mut out = Vec::new();
        let summary = convert_to_stream(&[first, second], &opts, &mut out);
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failed, 0);

        let text = String::from_utf8(out).unwrap();
        let hello = text.find("SUBJECT: Hello").unwrap();
        let second_pos = text.find("SUBJECT: Second").unwrap();
        assert!(hello < second_pos, "reports must follow argument order");

        // Stream mode writes no files
        assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_file_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_fixture(dir.path(), "good.eml", SIMPLE);
        let missing = dir.path().join("missing.eml");

        let out_dir = tempfile::tempdir().unwrap();
        let opts = ConvertOptions {
            output_dir: out_dir.path().to_path_buf(),
            ..Default::default()
        };

        let summary = convert_to_files(&[missing, good], &opts);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.converted, 1);
        assert!(out_dir
            .path()
            .join("20240104_100000_Hello.txt")
            .exists());
    }
}
