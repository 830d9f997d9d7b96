//! Progress reporting and cooperative cancellation for a processing run.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use extractor_core::formatting::format_count;
use extractor_core::models::ConnectorType;

// ── ProgressEvent ─────────────────────────────────────────────────────────────

/// One human-readable line of run progress, pushed as it happens.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    RunStarted {
        connector: ConnectorType,
        files: usize,
    },
    FileStarted {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    RowSkipped {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    FileFinished {
        label: String,
        rows: u64,
        skipped: u64,
        total_time_ms: f64,
    },
    FileFailed {
        path: PathBuf,
        reason: String,
    },
    Cancelled {
        remaining: usize,
    },
    RunFinished {
        processed: usize,
        failed: usize,
    },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::RunStarted { connector, files } => {
                write!(f, "Processing {} {} file(s)...", files, connector)
            }
            ProgressEvent::FileStarted { index, total, path } => {
                write!(f, "[{}/{}] Reading {}", index, total, path.display())
            }
            ProgressEvent::RowSkipped { path, line, reason } => {
                write!(f, "  skipped {}:{}: {}", path.display(), line, reason)
            }
            ProgressEvent::FileFinished {
                label,
                rows,
                skipped,
                total_time_ms,
            } => {
                write!(
                    f,
                    "  done {}: {} row(s), {} ms",
                    label,
                    format_count(*rows),
                    total_time_ms
                )?;
                if *skipped > 0 {
                    write!(f, ", {} skipped", format_count(*skipped))?;
                }
                Ok(())
            }
            ProgressEvent::FileFailed { path, reason } => {
                write!(f, "  ERROR {}: {}", path.display(), reason)
            }
            ProgressEvent::Cancelled { remaining } => {
                write!(f, "Cancelled; {} file(s) not processed", remaining)
            }
            ProgressEvent::RunFinished { processed, failed } => {
                write!(f, "Finished: {} summarised, {} failed", processed, failed)
            }
        }
    }
}

// ── ProgressSink ──────────────────────────────────────────────────────────────

/// Receiver of [`ProgressEvent`]s. Any `FnMut(&ProgressEvent)` qualifies.
pub trait ProgressSink {
    fn emit(&mut self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent),
{
    fn emit(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

// ── CancelFlag ────────────────────────────────────────────────────────────────

/// Shareable cancellation request, checked by the engine before each file.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
