use clap::Parser;
use std::path::PathBuf;

use crate::models::ConnectorType;

/// Default file name of the combined summary.
pub const DEFAULT_OUTPUT_FILE: &str = "final_model_summary.csv";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Summarise connector performance logs into a single CSV
#[derive(Parser, Debug, Clone)]
#[command(
    name = "data-extractor",
    about = "Summarise connector performance CSV logs into a single report",
    version
)]
pub struct Settings {
    /// CSV files, directories of CSV files, or `;`-separated file lists
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Connector that produced the logs
    #[arg(long, short = 'c', value_enum, default_value = "tekla")]
    pub connector: ConnectorType,

    /// Output CSV path (defaults to final_model_summary.csv next to the first input)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Label rows with the model name from `metrics_<model>_Demo*.csv` file names
    #[arg(long)]
    pub model_names: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Effective log level: `--debug` overrides `--log-level`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    /// Output path: the explicit `--output`, else [`DEFAULT_OUTPUT_FILE`]
    /// in the directory of `first_input`.
    pub fn output_path(&self, first_input: Option<&std::path::Path>) -> PathBuf {
        if let Some(p) = &self.output {
            return p.clone();
        }
        default_output_path(first_input)
    }
}

/// [`DEFAULT_OUTPUT_FILE`] in the parent directory of `first_input`, or in the
/// working directory when there is none.
pub fn default_output_path(first_input: Option<&std::path::Path>) -> PathBuf {
    let dir = first_input
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(DEFAULT_OUTPUT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(args: &[&str]) -> Settings {
        let mut full = vec!["data-extractor"];
        full.extend_from_slice(args);
        Settings::parse_from(full)
    }

    // ── CLI parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_defaults() {
        let s = parse(&["logs/"]);
        assert_eq!(s.inputs, vec!["logs/".to_string()]);
        assert_eq!(s.connector, ConnectorType::Tekla);
        assert!(s.output.is_none());
        assert!(!s.model_names);
        assert_eq!(s.effective_log_level(), "INFO");
    }

    #[test]
    fn test_connector_and_output() {
        let s = parse(&["a.csv", "b.csv", "--connector", "navisworks", "-o", "out.csv"]);
        assert_eq!(s.inputs.len(), 2);
        assert_eq!(s.connector, ConnectorType::Navisworks);
        assert_eq!(s.output, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_inputs_required() {
        let result = Settings::try_parse_from(["data-extractor"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_connector_rejected() {
        let result = Settings::try_parse_from(["data-extractor", "a.csv", "--connector", "revit"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let s = parse(&["a.csv", "--log-level", "ERROR", "--debug"]);
        assert_eq!(s.effective_log_level(), "DEBUG");
    }

    // ── output_path ──────────────────────────────────────────────────────────

    #[test]
    fn test_default_output_next_to_first_input() {
        let p = default_output_path(Some(Path::new("/data/run1/metrics_a.csv")));
        assert_eq!(p, PathBuf::from("/data/run1/final_model_summary.csv"));
    }

    #[test]
    fn test_default_output_bare_file_name() {
        let p = default_output_path(Some(Path::new("metrics_a.csv")));
        assert_eq!(p, PathBuf::from("./final_model_summary.csv"));
    }

    #[test]
    fn test_explicit_output_wins() {
        let s = parse(&["a.csv", "--output", "/tmp/x.csv"]);
        assert_eq!(
            s.output_path(Some(Path::new("/data/a.csv"))),
            PathBuf::from("/tmp/x.csv")
        );
    }
}
