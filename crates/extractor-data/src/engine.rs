//! Aggregation engine: turns an ordered list of connector CSV files into a
//! [`SummaryTable`].
//!
//! Files are processed one at a time in the order given. A file that cannot
//! be opened, has an invalid header or fails mid-read is recorded as a
//! failure and the run moves on; malformed rows are dropped and counted.

use std::path::{Path, PathBuf};

use extractor_core::classifier::{classify, list_categories};
use extractor_core::models::{
    ConnectorType, FailedFile, FileSummary, FileSummaryBuilder, SummaryTable,
};
use extractor_core::{ExtractorError, Result};
use tracing::{debug, info, warn};

use crate::progress::{CancelFlag, ProgressEvent, ProgressSink};
use crate::reader::{source_label, RowOutcome, RowReader};

/// Per-run knobs chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    pub connector: ConnectorType,
    /// Label rows with the model name parsed from `metrics_<model>_Demo*.csv`.
    pub model_names: bool,
}

impl ProcessOptions {
    pub fn new(connector: ConnectorType) -> Self {
        Self {
            connector,
            model_names: false,
        }
    }
}

/// Process `paths` in order and return a fresh [`SummaryTable`].
///
/// `cancel` is checked before each file; once set, the remaining files are
/// reported in a single [`ProgressEvent::Cancelled`] and the table built so
/// far is returned with `cancelled` set.
pub fn process_files<S>(
    paths: &[PathBuf],
    options: &ProcessOptions,
    sink: &mut S,
    cancel: &CancelFlag,
) -> SummaryTable
where
    S: ProgressSink + ?Sized,
{
    let mut table = SummaryTable::new(options.connector);
    let total = paths.len();

    info!("Processing {} {} file(s)", total, options.connector);
    sink.emit(&ProgressEvent::RunStarted {
        connector: options.connector,
        files: total,
    });

    for (i, path) in paths.iter().enumerate() {
        if cancel.is_cancelled() {
            let remaining = total - i;
            warn!("Run cancelled with {} file(s) remaining", remaining);
            table.cancelled = true;
            sink.emit(&ProgressEvent::Cancelled { remaining });
            break;
        }

        sink.emit(&ProgressEvent::FileStarted {
            index: i + 1,
            total,
            path: path.clone(),
        });

        match summarise_file(path, options, sink) {
            Ok(summary) => {
                sink.emit(&ProgressEvent::FileFinished {
                    label: summary.source_label().to_string(),
                    rows: summary.row_count(),
                    skipped: summary.skipped_rows(),
                    total_time_ms: summary.total_time_ms(),
                });
                table.summaries.push(summary);
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                let reason = e.to_string();
                sink.emit(&ProgressEvent::FileFailed {
                    path: path.clone(),
                    reason: reason.clone(),
                });
                table.failures.push(FailedFile {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }

    sink.emit(&ProgressEvent::RunFinished {
        processed: table.summaries.len(),
        failed: table.failures.len(),
    });
    table
}

/// Read, classify and accumulate a single file.
pub fn summarise_file<S>(path: &Path, options: &ProcessOptions, sink: &mut S) -> Result<FileSummary>
where
    S: ProgressSink + ?Sized,
{
    let rows = RowReader::open(path)?;
    summarise_rows(path, rows, options, sink)
}

fn summarise_rows<I, S>(path: &Path, rows: I, options: &ProcessOptions, sink: &mut S) -> Result<FileSummary>
where
    I: IntoIterator<Item = RowOutcome>,
    S: ProgressSink + ?Sized,
{
    let connector = options.connector;
    let mut builder =
        FileSummaryBuilder::new(source_label(path, options.model_names), list_categories(connector));

    for outcome in rows {
        let added = outcome.and_then(|record| builder.add(classify(connector, &record.name), &record));
        match added {
            Ok(()) => {}
            Err(ExtractorError::RowSkipped { line, reason }) => {
                debug!("{}:{} skipped: {}", path.display(), line, reason);
                builder.skip_row();
                sink.emit(&ProgressEvent::RowSkipped {
                    path: path.to_path_buf(),
                    line,
                    reason,
                });
            }
            Err(e) => return Err(e),
        }
    }

    let summary = builder.build();
    debug!(
        "File {}: {} rows, {} skipped, {} ms",
        path.display(),
        summary.row_count(),
        summary.skipped_rows(),
        summary.total_time_ms()
    );
    Ok(summary)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
