//! Summary CSV output and the console rendition of a [`SummaryTable`].

use std::io::Write;
use std::path::Path;

use extractor_core::classifier::list_categories;
use extractor_core::formatting::{format_count, format_number};
use extractor_core::models::{ConnectorType, FileSummary, SummaryTable};
use extractor_core::{ExtractorError, Result};
use tracing::info;

pub const LABEL_COLUMN: &str = "Data/Model";
pub const TOTAL_MS_COLUMN: &str = "milliseconds";
pub const TOTAL_MINUTES_COLUMN: &str = "minutes";

/// Output columns for `connector`: label, one count column per category,
/// one `<category>_ms` column per category, total ms, total minutes.
pub fn header_row(connector: ConnectorType) -> Vec<String> {
    let categories = list_categories(connector);
    let mut header = Vec::with_capacity(categories.len() * 2 + 3);
    header.push(LABEL_COLUMN.to_string());
    header.extend(categories.iter().map(|c| c.label().to_string()));
    header.extend(categories.iter().map(|c| format!("{}_ms", c.label())));
    header.push(TOTAL_MS_COLUMN.to_string());
    header.push(TOTAL_MINUTES_COLUMN.to_string());
    header
}

fn data_row(connector: ConnectorType, summary: &FileSummary) -> Vec<String> {
    let categories = list_categories(connector);
    let mut row = Vec::with_capacity(categories.len() * 2 + 3);
    row.push(summary.source_label().to_string());
    row.extend(categories.iter().map(|c| summary.event_count(*c).to_string()));
    row.extend(categories.iter().map(|c| summary.time_ms(*c).to_string()));
    row.push(summary.total_time_ms().to_string());
    row.push(summary.total_time_minutes().to_string());
    row
}

/// Write `table` as CSV into `writer`.
pub fn write_summary_to<W: Write>(table: &SummaryTable, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header_row(table.connector))?;
    for summary in &table.summaries {
        wtr.write_record(data_row(table.connector, summary))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `table` to `path`, creating or truncating the file. A single attempt;
/// failure is returned as [`ExtractorError::OutputWrite`].
pub fn write_summary(table: &SummaryTable, path: &Path) -> Result<()> {
    let to_output_error = |source: csv::Error| ExtractorError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(|e| to_output_error(e.into()))?;
    write_summary_to(table, file).map_err(to_output_error)?;

    info!("Wrote {} summary row(s) to {}", table.len(), path.display());
    Ok(())
}

// ── Console table ─────────────────────────────────────────────────────────────

/// Render `table` as aligned text lines with thousands-separated numbers.
pub fn render_table(table: &SummaryTable) -> Vec<String> {
    let categories = list_categories(table.connector);

    let mut header: Vec<String> = vec![LABEL_COLUMN.to_string()];
    header.extend(categories.iter().map(|c| c.label().to_string()));
    header.extend(["Total ms", "Minutes", "Elements/min"].map(String::from));

    let rows: Vec<Vec<String>> = table
        .summaries
        .iter()
        .map(|s| {
            let mut row = vec![s.source_label().to_string()];
            row.extend(categories.iter().map(|c| format_count(s.event_count(*c))));
            row.push(format_number(s.total_time_ms(), 0));
            row.push(format_number(s.total_time_minutes(), 2));
            row.push(format_number(s.elements_per_minute(), 2));
            row
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i == 0 {
                    format!("{:<w$}", cell, w = *w)
                } else {
                    format!("{:>w$}", cell, w = *w)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header_line = format_line(&header);
    lines.push("-".repeat(header_line.chars().count()));
    lines.insert(0, header_line);
    lines.extend(rows.iter().map(|r| format_line(r)));
    lines
}

// ── Tests ─────────────────────────────────────────────────────────────────────
