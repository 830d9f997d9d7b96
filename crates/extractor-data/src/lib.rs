//! Data layer for the connector log extractor.
//!
//! Responsible for resolving input paths, parsing connector CSV exports,
//! aggregating them into per-file summaries and writing the combined report.

pub mod engine;
pub mod progress;
pub mod reader;
pub mod writer;
