//! Report rendering for stored datasets.
//!
//! [`ReportComposer::compose`] turns a [`Dataset`] into a UTF-8 text document:
//!
//! 1. title and dataset information (filename, upload time, record count)
//! 2. summary statistics (min/avg/max per numeric field)
//! 3. advanced statistics (median, standard deviation, variance) and a per-type breakdown
//! 4. a bar chart of the type distribution, in first-seen order, then min/avg/max bars per
//!    numeric field on a shared scale
//! 5. the full records table, paginated at [`ReportComposer::rows_per_page`]; every records page
//!    starts with a form feed and a "Page i of n" heading
//!
//! Rendering is a pure function of the dataset and the composer settings.

pub mod chart;
pub mod table;

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};

use crate::config::{DEFAULT_ROWS_PER_PAGE, PipelineOptions};
use crate::error::{PipelineError, PipelineResult};
use crate::processing::{extended_stats, type_breakdown};
use crate::types::{Dataset, DatasetId, EquipmentRecord, NumericField, Statistics};

use table::{Align, TextTable, truncate_chars};

/// Report title printed in the banner.
pub const REPORT_TITLE: &str = "ChemFlow Analytics Report";
/// MIME type of rendered reports.
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";
/// Page separator between records pages.
pub const PAGE_BREAK: char = '\u{c}';

const BANNER_WIDTH: usize = 72;
const NAME_MAX: usize = 25;

/// A rendered report plus the metadata a transport layer needs to serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Suggested attachment file name.
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl RenderedReport {
    pub fn new(dataset_id: DatasetId, bytes: Vec<u8>) -> Self {
        Self {
            filename: format!("chemflow_report_{dataset_id}.txt"),
            content_type: CONTENT_TYPE,
            bytes,
        }
    }
}

/// Renders datasets into text reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportComposer {
    rows_per_page: usize,
}

impl Default for ReportComposer {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

impl ReportComposer {
    /// Composer paginating the records table every `rows_per_page` records (minimum 1).
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            rows_per_page: rows_per_page.max(1),
        }
    }

    pub fn from_options(options: &PipelineOptions) -> Self {
        Self::new(options.rows_per_page)
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Number of records pages for `total_records` records.
    pub fn page_count(&self, total_records: usize) -> usize {
        total_records.div_ceil(self.rows_per_page)
    }

    /// Render `dataset`. Fails with [`PipelineError::Render`] for a dataset without records.
    pub fn compose(&self, dataset: &Dataset) -> PipelineResult<Vec<u8>> {
        self.render(
            dataset.filename(),
            dataset.uploaded_at(),
            dataset.records(),
            dataset.summary(),
        )
    }

    /// Render `dataset` and wrap it with its attachment metadata.
    pub fn compose_report(&self, dataset: &Dataset) -> PipelineResult<RenderedReport> {
        Ok(RenderedReport::new(dataset.id(), self.compose(dataset)?))
    }

    fn render(
        &self,
        filename: &str,
        uploaded_at: DateTime<Utc>,
        records: &[EquipmentRecord],
        summary: &Statistics,
    ) -> PipelineResult<Vec<u8>> {
        if records.is_empty() {
            return Err(PipelineError::render("dataset has no records"));
        }
        if summary.count != records.len() {
            return Err(PipelineError::render(format!(
                "summary covers {} records but dataset holds {}",
                summary.count,
                records.len()
            )));
        }

        let mut out = String::new();
        self.write_document(&mut out, filename, uploaded_at, records, summary)
            .map_err(|e| PipelineError::render(e.to_string()))?;
        Ok(out.into_bytes())
    }

    fn write_document(
        &self,
        out: &mut String,
        filename: &str,
        uploaded_at: DateTime<Utc>,
        records: &[EquipmentRecord],
        summary: &Statistics,
    ) -> fmt::Result {
        write_banner(out)?;
        write_info(out, filename, uploaded_at, records.len())?;
        write_summary(out, summary)?;
        write_advanced(out, records)?;
        write_breakdown(out, records)?;

        heading(out, "Equipment Type Distribution")?;
        chart::render_distribution(&summary.type_distribution, out)?;

        heading(out, "Parameter Comparison Analysis (Min/Avg/Max)")?;
        chart::render_comparison(summary, out)?;

        let pages = self.page_count(records.len());
        for (page_idx, chunk) in records.chunks(self.rows_per_page).enumerate() {
            out.push(PAGE_BREAK);
            out.push('\n');
            heading(
                out,
                &format!("Equipment Records Details (Page {} of {pages})", page_idx + 1),
            )?;
            let first_position = page_idx * self.rows_per_page + 1;
            write_records(out, first_position, chunk)?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "Generated by ChemFlow Analytics Platform | {}",
            uploaded_at.format("%B %d, %Y")
        )
    }
}

fn write_banner(out: &mut String) -> fmt::Result {
    let width = BANNER_WIDTH;
    let rule = "=".repeat(width);
    writeln!(out, "{rule}")?;
    writeln!(out, "{:^width$}", REPORT_TITLE)?;
    writeln!(out, "{rule}")
}

fn heading(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

fn write_info(out: &mut String, filename: &str, uploaded_at: DateTime<Utc>, total: usize) -> fmt::Result {
    heading(out, "Dataset Information")?;
    let mut table = TextTable::new(["Field", "Value"]);
    table.push_row(vec!["Filename".to_string(), filename.to_string()]);
    table.push_row(vec![
        "Upload Date".to_string(),
        uploaded_at.format("%B %d, %Y at %H:%M:%S UTC").to_string(),
    ]);
    table.push_row(vec!["Total Records".to_string(), total.to_string()]);
    table.render(out)
}

fn write_summary(out: &mut String, summary: &Statistics) -> fmt::Result {
    heading(out, "Summary Statistics")?;
    let mut table = TextTable::new(["Parameter", "Minimum", "Average", "Maximum"]).align_from(1, Align::Right);
    for field in NumericField::ALL {
        let s = summary.field(field);
        table.push_row(vec![
            field.label().to_string(),
            format!("{:.2}", s.min),
            format!("{:.2}", s.avg),
            format!("{:.2}", s.max),
        ]);
    }
    table.render(out)
}

fn write_advanced(out: &mut String, records: &[EquipmentRecord]) -> fmt::Result {
    heading(out, "Advanced Statistics")?;
    let mut table = TextTable::new(["Parameter", "Median", "Std Deviation", "Variance"]).align_from(1, Align::Right);
    for field in NumericField::ALL {
        if let Some(s) = extended_stats(records, field) {
            table.push_row(vec![
                field.label().to_string(),
                format!("{:.2}", s.median),
                format!("{:.2}", s.std_dev),
                format!("{:.2}", s.variance),
            ]);
        }
    }
    table.render(out)
}

fn write_breakdown(out: &mut String, records: &[EquipmentRecord]) -> fmt::Result {
    heading(out, "Equipment Type Breakdown")?;
    let mut table = TextTable::new(["Equipment Type", "Count", "Avg Flowrate", "Avg Pressure", "Avg Temperature"])
        .align_from(1, Align::Right);
    for group in type_breakdown(records) {
        table.push_row(vec![
            group.equipment_type,
            group.count.to_string(),
            format!("{:.2}", group.avg_flowrate),
            format!("{:.2}", group.avg_pressure),
            format!("{:.2}", group.avg_temperature),
        ]);
    }
    table.render(out)
}

fn write_records(out: &mut String, first_position: usize, records: &[EquipmentRecord]) -> fmt::Result {
    let mut table =
        TextTable::new(["#", "Name", "Type", "Flowrate", "Pressure", "Temperature"]).align_from(3, Align::Right);
    for (offset, r) in records.iter().enumerate() {
        table.push_row(vec![
            (first_position + offset).to_string(),
            truncate_chars(&r.name, NAME_MAX).to_string(),
            r.equipment_type.clone(),
            format!("{:.2}", r.flowrate),
            format!("{:.2}", r.pressure),
            format!("{:.2}", r.temperature),
        ]);
    }
    table.render(out)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{PAGE_BREAK, ReportComposer};
    use crate::error::PipelineError;
    use crate::processing::summarize;
    use crate::types::EquipmentRecord;

    fn records(n: usize) -> Vec<EquipmentRecord> {
        (0..n)
            .map(|i| {
                let ty = if i % 3 == 0 { "Pump" } else { "Valve" };
                EquipmentRecord::new(format!("Unit-{i}"), ty, 10.0 + i as f64, 2.5, 80.0)
            })
            .collect()
    }

    #[test]
    fn paginates_records_and_numbers_rows_positionally() {
        let composer = ReportComposer::new(4);
        let recs = records(10);
        let summary = summarize(&recs).unwrap();
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        let bytes = composer.render("plant.csv", when, &recs, &summary).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(composer.page_count(10), 3);
        assert_eq!(text.matches(PAGE_BREAK).count(), 3);
        assert!(text.contains("Equipment Records Details (Page 1 of 3)"));
        assert!(text.contains("Equipment Records Details (Page 3 of 3)"));
        assert!(text.contains("| 10 | Unit-9"));
        assert!(text.contains("March 01, 2024 at 09:30:00 UTC"));
        assert!(text.contains("| Total Records | 10"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let composer = ReportComposer::default();
        let recs = records(5);
        let summary = summarize(&recs).unwrap();
        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let a = composer.render("a.csv", when, &recs, &summary).unwrap();
        let b = composer.render("a.csv", when, &recs, &summary).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn refuses_empty_or_inconsistent_input() {
        let composer = ReportComposer::default();
        let recs = records(2);
        let summary = summarize(&recs).unwrap();
        let when = Utc::now();

        let err = composer.render("empty.csv", when, &[], &summary).unwrap_err();
        assert!(matches!(err, PipelineError::Render { .. }));

        let err = composer.render("short.csv", when, &recs[..1], &summary).unwrap_err();
        assert!(err.to_string().contains("summary covers 2 records"));
    }
}
