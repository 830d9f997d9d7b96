use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

use crate::{ExtractorError, Result};

/// Milliseconds in one minute, used for every minutes derivation.
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// The authoring tool whose CSV export is being interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ConnectorType {
    Tekla,
    Rhino,
    Navisworks,
}

impl ConnectorType {
    /// Display name of the connector.
    pub fn name(self) -> &'static str {
        match self {
            ConnectorType::Tekla => "Tekla",
            ConnectorType::Rhino => "Rhino",
            ConnectorType::Navisworks => "Navisworks",
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operation classification. Each connector uses a subset, see
/// [`crate::classifier::list_categories`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Mesh,
    IfcExport,
    Primitive,
    Elements,
    Other,
}

impl Category {
    /// Column label used in the summary CSV and console table.
    pub fn label(self) -> &'static str {
        match self {
            Category::Mesh => "Mesh",
            Category::IfcExport => "IFC",
            Category::Primitive => "Primitives",
            Category::Elements => "Elements",
            Category::Other => "Other",
        }
    }

    /// `true` for categories that represent exported model elements.
    pub fn is_element(self) -> bool {
        !matches!(self, Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a connector CSV export.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub name: String,
    pub event_count: u64,
    pub time_ms: f64,
    /// 1-based line of the row in its source file.
    pub line: u64,
}

// ── FileSummary ───────────────────────────────────────────────────────────────

/// Aggregated per-category counts and timings for one input file.
///
/// Built through [`FileSummaryBuilder`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    source_label: String,
    event_counts: BTreeMap<Category, u64>,
    times_ms: BTreeMap<Category, f64>,
    total_time_ms: f64,
    row_count: u64,
    skipped_rows: u64,
}

impl FileSummary {
    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    /// Summed `#Events` for `category`; 0 when the category saw no rows.
    pub fn event_count(&self, category: Category) -> u64 {
        self.event_counts.get(&category).copied().unwrap_or(0)
    }

    /// Summed milliseconds for `category`; 0 when the category saw no rows.
    pub fn time_ms(&self, category: Category) -> f64 {
        self.times_ms.get(&category).copied().unwrap_or(0.0)
    }

    pub fn event_counts(&self) -> &BTreeMap<Category, u64> {
        &self.event_counts
    }

    pub fn total_time_ms(&self) -> f64 {
        self.total_time_ms
    }

    /// Always derived from [`total_time_ms`](Self::total_time_ms).
    pub fn total_time_minutes(&self) -> f64 {
        self.total_time_ms / MS_PER_MINUTE
    }

    /// Rows that were parsed and classified.
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Rows dropped because a numeric field was missing or malformed.
    pub fn skipped_rows(&self) -> u64 {
        self.skipped_rows
    }

    /// Events in element categories (everything except `Other`).
    pub fn total_elements(&self) -> u64 {
        self.event_counts
            .iter()
            .filter(|(c, _)| c.is_element())
            .map(|(_, n)| *n)
            .sum()
    }

    /// Element throughput; 0 when no time was recorded.
    pub fn elements_per_minute(&self) -> f64 {
        let minutes = self.total_time_minutes();
        if minutes > 0.0 {
            self.total_elements() as f64 / minutes
        } else {
            0.0
        }
    }
}

/// Mutable accumulator scoped to the processing of one file.
#[derive(Debug)]
pub struct FileSummaryBuilder {
    source_label: String,
    event_counts: BTreeMap<Category, u64>,
    times_ms: BTreeMap<Category, f64>,
    total_time_ms: f64,
    row_count: u64,
    skipped_rows: u64,
}

impl FileSummaryBuilder {
    /// Start a summary with every category in `categories` present at zero.
    pub fn new(source_label: impl Into<String>, categories: &[Category]) -> Self {
        Self {
            source_label: source_label.into(),
            event_counts: categories.iter().map(|c| (*c, 0)).collect(),
            times_ms: categories.iter().map(|c| (*c, 0.0)).collect(),
            total_time_ms: 0.0,
            row_count: 0,
            skipped_rows: 0,
        }
    }

    /// Accumulate one classified record.
    ///
    /// A record whose `#Events` would overflow the category total is rejected
    /// as [`ExtractorError::RowSkipped`] and leaves the builder unchanged.
    pub fn add(&mut self, category: Category, record: &OperationRecord) -> Result<()> {
        let current = self.event_counts.get(&category).copied().unwrap_or(0);
        let (Some(events), Some(rows)) = (
            current.checked_add(record.event_count),
            self.row_count.checked_add(1),
        ) else {
            return Err(ExtractorError::RowSkipped {
                line: record.line,
                reason: format!("{} event total overflows", category.label()),
            });
        };

        self.event_counts.insert(category, events);
        *self.times_ms.entry(category).or_insert(0.0) += record.time_ms;
        self.total_time_ms += record.time_ms;
        self.row_count = rows;
        Ok(())
    }

    pub fn skip_row(&mut self) {
        self.skipped_rows = self.skipped_rows.saturating_add(1);
    }

    pub fn build(self) -> FileSummary {
        FileSummary {
            source_label: self.source_label,
            event_counts: self.event_counts,
            times_ms: self.times_ms,
            total_time_ms: self.total_time_ms,
            row_count: self.row_count,
            skipped_rows: self.skipped_rows,
        }
    }
}

// ── SummaryTable ──────────────────────────────────────────────────────────────

/// An input file that produced no summary row.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Ordered File Summaries of one run, in the order the files were supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub connector: ConnectorType,
    pub summaries: Vec<FileSummary>,
    pub failures: Vec<FailedFile>,
    /// `true` when the run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl SummaryTable {
    pub fn new(connector: ConnectorType) -> Self {
        Self {
            connector,
            summaries: Vec::new(),
            failures: Vec::new(),
            cancelled: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }
}
