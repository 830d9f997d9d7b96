//! Domain model for the connector log data extractor.
//!
//! Holds the connector and category types, the keyword classifiers, per-file
//! summaries, the shared error type, number formatting and CLI settings.

pub mod classifier;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{ExtractorError, Result};
