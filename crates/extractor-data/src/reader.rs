//! CSV discovery and row parsing for connector performance logs.
//!
//! Resolves user input into CSV paths and turns each file into a lazy stream
//! of [`OperationRecord`]s. Columns are located by header name, so column
//! order does not matter and extra columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use extractor_core::models::OperationRecord;
use extractor_core::{ExtractorError, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

pub const COL_OPERATION_NAME: &str = "Operation Name";
pub const COL_EVENTS: &str = "#Events";
pub const COL_TIME_MS: &str = "Operation Time in Milliseconds";

/// Header columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = [COL_OPERATION_NAME, COL_EVENTS, COL_TIME_MS];

// ── Input resolution ──────────────────────────────────────────────────────────

/// Find the `.csv` files directly inside `dir`, sorted by path.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Input directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_csv(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Expand one user-supplied input into file paths.
///
/// * a directory yields every CSV file directly inside it;
/// * a `;`-separated value yields each non-empty trimmed element;
/// * anything else is taken as a single file path.
///
/// Explicit file paths are not checked for existence here; unreadable files
/// are reported per file by the engine.
pub fn resolve_input(entry: &str) -> Vec<PathBuf> {
    let trimmed = entry.trim();
    let as_path = Path::new(trimmed);

    if as_path.is_dir() {
        return find_csv_files(as_path);
    }
    if trimmed.contains(';') {
        return trimmed
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
    }
    if trimmed.is_empty() {
        return Vec::new();
    }
    vec![as_path.to_path_buf()]
}

/// Expand every input in order. Fails when nothing resolves to a file.
pub fn resolve_inputs(entries: &[String]) -> Result<Vec<PathBuf>> {
    let paths: Vec<PathBuf> = entries.iter().flat_map(|e| resolve_input(e)).collect();
    if paths.is_empty() {
        return Err(ExtractorError::NoInputFiles(entries.join(", ")));
    }
    debug!("Resolved {} input(s) into {} file(s)", entries.len(), paths.len());
    Ok(paths)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

// ── Source labels ─────────────────────────────────────────────────────────────

/// Row label for `path`: the file name without its extension.
///
/// With `model_names`, files named `metrics_<model>_Demo*.csv` are labelled
/// `<model>` instead.
pub fn source_label(path: &Path, model_names: bool) -> String {
    if model_names {
        if let Some(model) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(extract_model_name)
        {
            return model;
        }
    }

    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn extract_model_name(file_name: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^metrics_(.*?)_Demo.*\.csv$").expect("regex is valid"));
    re.captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|m| !m.is_empty())
}

// ── Row parsing ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Operation Name")]
    name: String,
    #[serde(rename = "#Events", deserialize_with = "deserialize_event_count")]
    event_count: u64,
    #[serde(rename = "Operation Time in Milliseconds")]
    time_ms: f64,
}

/// `#Events` accepts whole numbers written either as integers or as integral
/// floats such as `3.0`.
fn deserialize_event_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    if let Ok(count) = text.parse::<u64>() {
        return Ok(count);
    }
    match text.parse::<f64>() {
        Ok(value)
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 =>
        {
            Ok(value as u64)
        }
        _ => Err(serde::de::Error::custom(format!(
            "{COL_EVENTS} is not a whole number: {text:?}"
        ))),
    }
}

/// Parsed record, or [`ExtractorError::RowSkipped`] for a malformed row.
pub type RowOutcome = Result<OperationRecord>;

/// Lazy reader over the data rows of one connector CSV.
pub struct RowReader<R: Read> {
    path: PathBuf,
    reader: csv::Reader<R>,
    headers: csv::StringRecord,
    record: csv::StringRecord,
    done: bool,
}

impl RowReader<File> {
    /// Open `path` and validate its header row.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ExtractorError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(path, file)
    }
}

impl<R: Read> RowReader<R> {
    /// Wrap `input`, failing with [`ExtractorError::MissingColumns`] when any
    /// of [`REQUIRED_COLUMNS`] is absent. `source` only names the input in
    /// error messages.
    pub fn new(source: &Path, input: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !headers.iter().any(|h| h == **col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ExtractorError::MissingColumns {
                path: source.to_path_buf(),
                columns: missing,
            });
        }

        Ok(Self {
            path: source.to_path_buf(),
            reader,
            headers,
            record: csv::StringRecord::new(),
            done: false,
        })
    }

    fn convert_record(&self) -> RowOutcome {
        let line = self.record.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawRow = self
            .record
            .deserialize(Some(&self.headers))
            .map_err(|e| ExtractorError::RowSkipped {
                line,
                reason: e.to_string(),
            })?;

        if !raw.time_ms.is_finite() || raw.time_ms < 0.0 {
            return Err(ExtractorError::RowSkipped {
                line,
                reason: format!("invalid {:?}: {}", COL_TIME_MS, raw.time_ms),
            });
        }

        Ok(OperationRecord {
            name: raw.name,
            event_count: raw.event_count,
            time_ms: raw.time_ms,
            line,
        })
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = RowOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.read_record(&mut self.record) {
            Ok(false) => {
                self.done = true;
                None
            }
            Ok(true) => Some(self.convert_record()),
            Err(e) => {
                let line = e
                    .position()
                    .or_else(|| self.record.position())
                    .map(|p| p.line())
                    .unwrap_or(0);
                // An I/O failure ends the stream and fails the whole file.
                if e.is_io_error() {
                    self.done = true;
                    return Some(Err(ExtractorError::FileRead {
                        path: self.path.clone(),
                        line,
                        source: e,
                    }));
                }
                Some(Err(ExtractorError::RowSkipped {
                    line,
                    reason: e.to_string(),
                }))
            }
        }
    }
}

/// Parse in-memory CSV text.
pub fn parse_rows(contents: &str) -> Result<RowReader<&[u8]>> {
    RowReader::new(Path::new("<memory>"), contents.as_bytes())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const HEADER: &str = "Operation Name,#Events,Operation Time in Milliseconds";

    // ── find_csv_files / resolve_input ────────────────────────────────────────

    #[test]
    fn test_find_csv_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b.csv", HEADER);
        write_file(dir.path(), "a.CSV", HEADER);
        write_file(dir.path(), "notes.txt", "x");

        let files = find_csv_files(dir.path());
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }

    #[test]
    fn test_find_csv_files_not_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("nested");
        std::fs::create_dir_all(&sub).unwrap();
        write_file(&sub, "inner.csv", HEADER);
        write_file(dir.path(), "outer.csv", HEADER);

        assert_eq!(find_csv_files(dir.path()).len(), 1);
    }

    #[test]
    fn test_find_csv_files_nonexistent_dir() {
        assert!(find_csv_files(Path::new("/tmp/does-not-exist-extractor-xyz")).is_empty());
    }

    #[test]
    fn test_resolve_input_semicolon_list() {
        let paths = resolve_input(" a.csv ; ;b.csv;");
        assert_eq!(paths, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
    }

    #[test]
    fn test_resolve_input_single_and_empty() {
        assert_eq!(resolve_input("missing.csv"), vec![PathBuf::from("missing.csv")]);
        assert!(resolve_input("  ").is_empty());
    }

    #[test]
    fn test_resolve_inputs_keeps_order() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "x.csv", HEADER);
        let entries = vec![
            "first.csv".to_string(),
            dir.path().to_str().unwrap().to_string(),
            "last.csv".to_string(),
        ];
        let paths = resolve_inputs(&entries).unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0], PathBuf::from("first.csv"));
        assert!(paths[1].ends_with("x.csv"));
        assert_eq!(paths[2], PathBuf::from("last.csv"));
    }

    #[test]
    fn test_resolve_inputs_empty_dir_errors() {
        let dir = TempDir::new().unwrap();
        let err = resolve_inputs(&[dir.path().to_str().unwrap().to_string()]).unwrap_err();
        assert!(matches!(err, ExtractorError::NoInputFiles(_)));
    }

    // ── source_label ──────────────────────────────────────────────────────────

    #[test]
    fn test_source_label_strips_extension() {
        assert_eq!(source_label(Path::new("/d/metrics_Bridge_Demo1.csv"), false), "metrics_Bridge_Demo1");
        assert_eq!(source_label(Path::new("run.v2.csv"), false), "run.v2");
    }

    #[test]
    fn test_source_label_model_names() {
        assert_eq!(source_label(Path::new("/d/metrics_Bridge_Demo1.csv"), true), "Bridge");
        assert_eq!(source_label(Path::new("/d/other.csv"), true), "other");
    }

    // ── RowReader ─────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_rows_basic() {
        let text = format!("{HEADER}\nMesh Creation,3,150\nIFC Export Geometry,2,300.5\n");
        let rows: Vec<OperationRecord> = parse_rows(&text).unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Mesh Creation");
        assert_eq!(rows[0].event_count, 3);
        assert_eq!(rows[1].time_ms, 300.5);
    }

    #[test]
    fn test_parse_rows_reordered_and_extra_columns() {
        let text = "Operation Time in Milliseconds,Thread,#Events,Operation Name\n\
                    150,main,3,CreateMeshGeometry\n";
        let rows: Vec<RowOutcome> = parse_rows(text).unwrap().collect();
        let rec = rows[0].as_ref().unwrap();
        assert_eq!(rec.name, "CreateMeshGeometry");
        assert_eq!(rec.event_count, 3);
        assert_eq!(rec.time_ms, 150.0);
    }

    #[test]
    fn test_parse_rows_trims_whitespace() {
        let text = " Operation Name , #Events , Operation Time in Milliseconds \n  Mesh  , 4 , 10 \n";
        let rec = parse_rows(text).unwrap().next().unwrap().unwrap();
        assert_eq!(rec.name, "Mesh");
        assert_eq!(rec.event_count, 4);
    }

    #[test]
    fn test_missing_column_is_error() {
        let text = "Operation Name,Operation Time in Milliseconds\nMesh,10\n";
        match parse_rows(text) {
            Err(ExtractorError::MissingColumns { columns, .. }) => {
                assert_eq!(columns, vec!["#Events".to_string()]);
            }
            _ => panic!("expected MissingColumns"),
        }
    }

    #[test]
    fn test_empty_input_is_missing_columns() {
        assert!(matches!(
            parse_rows(""),
            Err(ExtractorError::MissingColumns { .. })
        ));
    }

    #[test]
    fn test_malformed_rows_skipped_not_fatal() {
        let text = format!(
            "{HEADER}\nGood,1,10\nBadCount,abc,10\nMissingTime,2,\nShort,3\nNegative,1,-5\nAlsoGood,2,20\n"
        );
        let outcomes: Vec<RowOutcome> = parse_rows(&text).unwrap().collect();
        assert_eq!(outcomes.len(), 6);

        let good: Vec<&OperationRecord> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
        assert_eq!(good.len(), 2);
        assert_eq!(good[1].name, "AlsoGood");

        for skipped in outcomes.iter().filter(|o| o.is_err()) {
            assert!(matches!(skipped, Err(ExtractorError::RowSkipped { .. })));
        }
    }

    #[test]
    fn test_skipped_row_reports_line() {
        let text = format!("{HEADER}\nGood,1,10\nBad,x,10\n");
        let outcomes: Vec<RowOutcome> = parse_rows(&text).unwrap().collect();
        match &outcomes[1] {
            Err(ExtractorError::RowSkipped { line, .. }) => assert_eq!(*line, 3),
            other => panic!("expected RowSkipped, got {other:?}"),
        }
    }

    #[test]
    fn test_integral_float_event_count_accepted() {
        let text = format!("{HEADER}\nMesh,3.0,10\nMesh,2.5,10\nMesh,-1,10\nMesh,1e2,10\n");
        let outcomes: Vec<RowOutcome> = parse_rows(&text).unwrap().collect();
        assert_eq!(outcomes[0].as_ref().unwrap().event_count, 3);
        assert!(matches!(outcomes[1], Err(ExtractorError::RowSkipped { line: 3, .. })));
        assert!(matches!(outcomes[2], Err(ExtractorError::RowSkipped { line: 4, .. })));
        assert_eq!(outcomes[3].as_ref().unwrap().event_count, 100);
    }

    #[test]
    fn test_record_carries_line() {
        let text = format!("{HEADER}\nA,1,1\nB,2,2\n");
        let lines: Vec<u64> = parse_rows(&text).unwrap().map(|r| r.unwrap().line).collect();
        assert_eq!(lines, vec![2, 3]);
    }

    /// Hands out its bytes once, then fails every later read.
    struct FailingReader {
        data: Option<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.data.take() {
                Some(data) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    Ok(n)
                }
                None => Err(std::io::Error::other("device unplugged")),
            }
        }
    }

    #[test]
    fn test_read_failure_mid_file_is_file_error() {
        let input = FailingReader {
            data: Some(format!("{HEADER}\nMesh,1,10\n").into_bytes()),
        };
        let mut rows = RowReader::new(Path::new("logs/m.csv"), input).unwrap();

        assert!(rows.next().unwrap().is_ok());
        match rows.next() {
            Some(Err(ExtractorError::FileRead { path, .. })) => {
                assert_eq!(path, PathBuf::from("logs/m.csv"));
            }
            other => panic!("expected FileRead, got {other:?}"),
        }
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let err = RowReader::open(Path::new("/tmp/does-not-exist-extractor.csv"))
            .err()
            .unwrap();
        assert!(matches!(err, ExtractorError::FileOpen { .. }));
    }

    #[test]
    fn test_open_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "m.csv", &format!("{HEADER}\nMesh,1,2\n"));
        let rows: Vec<RowOutcome> = RowReader::open(&path).unwrap().collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_ok());
    }
}
