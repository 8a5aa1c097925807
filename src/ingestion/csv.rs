//! Typed row parsing for validated CSV content.

use csv::ByteRecord;

use crate::error::{PipelineError, PipelineResult};
use crate::types::EquipmentRecord;

use super::schema::{FLOWRATE_COL, NAME_COL, PRESSURE_COL, REQUIRED_COLUMNS, TEMPERATURE_COL, TYPE_COL, ValidatedTable};

/// Why a single cell was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The row has fewer cells than the header.
    Missing,
    /// The cell is empty (after trimming).
    Empty,
    /// The cell bytes are not valid UTF-8.
    NotUtf8,
    /// The cell is not a number.
    NotNumeric(String),
    /// The cell parsed as NaN or infinity.
    NotFinite(String),
}

/// Result of parsing one cell into its typed value.
pub type FieldOutcome<T> = Result<T, FieldError>;

/// A rejected data row and the first field that caused the rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    /// 1-based line number; the header is line 1.
    pub row: u64,
    /// Required column name.
    pub column: &'static str,
    pub reason: FieldError,
}

/// Parsed records plus the rows that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecords {
    /// Accepted records, in file order.
    pub records: Vec<EquipmentRecord>,
    /// Rejected rows, in file order.
    pub rejections: Vec<RowRejection>,
}

impl ParsedRecords {
    /// Number of rejected rows.
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }
}

/// Parse every data row of `table` into an [`EquipmentRecord`].
///
/// Rows with an empty name/type, or a numeric cell that is not a finite number, are dropped
/// and counted. Fails with [`PipelineError::NoValidData`] when no row survives.
pub fn parse_records(table: &ValidatedTable) -> PipelineResult<ParsedRecords> {
    let mut records = Vec::with_capacity(table.row_count());
    let mut rejections = Vec::new();

    for (idx0, row) in table.rows.iter().enumerate() {
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(idx0 as u64 + 2);

        match parse_row(table, row) {
            Ok(record) => records.push(record),
            Err((required_idx, reason)) => {
                let rejection = RowRejection {
                    row: line,
                    column: REQUIRED_COLUMNS[required_idx],
                    reason,
                };
                tracing::debug!(row = rejection.row, column = rejection.column, reason = ?rejection.reason, "row rejected");
                rejections.push(rejection);
            }
        }
    }

    if records.is_empty() {
        return Err(PipelineError::NoValidData {
            rejected: rejections.len(),
        });
    }
    if !rejections.is_empty() {
        tracing::warn!(
            accepted = records.len(),
            rejected = rejections.len(),
            "dropped invalid rows"
        );
    }

    Ok(ParsedRecords { records, rejections })
}

fn parse_row(table: &ValidatedTable, row: &ByteRecord) -> Result<EquipmentRecord, (usize, FieldError)> {
    let text = |idx: usize| parse_text(table.cell(row, idx)).map_err(|e| (idx, e));
    let number = |idx: usize| parse_finite(table.cell(row, idx)).map_err(|e| (idx, e));

    Ok(EquipmentRecord {
        name: text(NAME_COL)?,
        equipment_type: text(TYPE_COL)?,
        flowrate: number(FLOWRATE_COL)?,
        pressure: number(PRESSURE_COL)?,
        temperature: number(TEMPERATURE_COL)?,
    })
}

fn cell_str(raw: Option<&[u8]>) -> FieldOutcome<&str> {
    let raw = raw.ok_or(FieldError::Missing)?;
    let s = std::str::from_utf8(raw).map_err(|_| FieldError::NotUtf8)?.trim();
    if s.is_empty() {
        return Err(FieldError::Empty);
    }
    Ok(s)
}

fn parse_text(raw: Option<&[u8]>) -> FieldOutcome<String> {
    cell_str(raw).map(str::to_owned)
}

fn parse_finite(raw: Option<&[u8]>) -> FieldOutcome<f64> {
    let s = cell_str(raw)?;
    let v = s
        .parse::<f64>()
        .map_err(|_| FieldError::NotNumeric(s.to_owned()))?;
    if !v.is_finite() {
        return Err(FieldError::NotFinite(s.to_owned()));
    }
    Ok(v)
}
