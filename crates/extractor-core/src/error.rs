use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the data extractor.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// An input file could not be opened or read from disk.
    #[error("Failed to open file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading an input file failed after its header was accepted.
    #[error("Failed to read file {path} at line {line}: {source}")]
    FileRead {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// The header row lacks one or more of the required columns.
    #[error("Missing required column(s) in {path}: {}", columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    /// A single data row could not be turned into an operation record.
    #[error("Row {line} skipped: {reason}")]
    RowSkipped { line: u64, reason: String },

    /// The summary CSV could not be written to its destination.
    #[error("Failed to write summary to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// None of the given inputs resolved to a CSV file.
    #[error("No CSV files found in {0}")]
    NoInputFiles(String),

    /// Pass-through for CSV errors that do not carry a path.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience alias used throughout the extractor crates.
pub type Result<T> = std::result::Result<T, ExtractorError>;
