//! Header validation for uploaded CSV content.
//!
//! Only the header line is interpreted here. Data rows are collected as raw byte records and
//! handed to [`super::csv`] for typed parsing.

use csv::{ByteRecord, ReaderBuilder};

use crate::error::{PipelineError, PipelineResult};

/// Required equipment columns, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Equipment Name", "Type", "Flowrate", "Pressure", "Temperature"];

/// Position of each required column inside [`REQUIRED_COLUMNS`].
pub(crate) const NAME_COL: usize = 0;
pub(crate) const TYPE_COL: usize = 1;
pub(crate) const FLOWRATE_COL: usize = 2;
pub(crate) const PRESSURE_COL: usize = 3;
pub(crate) const TEMPERATURE_COL: usize = 4;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Content whose header declares every required column.
#[derive(Debug, Clone)]
pub struct ValidatedTable {
    /// Header cells as they appeared in the upload.
    pub headers: Vec<String>,
    /// For each required column (same order as the required set), its index in `headers`.
    pub column_indexes: Vec<usize>,
    /// Data rows, header stripped, in file order.
    pub rows: Vec<ByteRecord>,
}

impl ValidatedTable {
    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Raw bytes of a required column in `row`, or `None` if the row is too short.
    pub fn cell<'a>(&self, row: &'a ByteRecord, required_idx: usize) -> Option<&'a [u8]> {
        self.column_indexes
            .get(required_idx)
            .and_then(|&csv_idx| row.get(csv_idx))
    }
}

/// Validate the header of `content` against `required`.
///
/// Rules:
///
/// - Column names match case-insensitively after trimming whitespace; order is irrelevant and
///   extra columns are ignored.
/// - Missing columns are reported together, in the order of `required`.
/// - A header with no data rows after it is an [`PipelineError::EmptyFile`]. Whitespace-only
///   lines are not data rows.
pub fn validate_header(content: &[u8], required: &[&str]) -> PipelineResult<ValidatedTable> {
    let body = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(PipelineError::format("csv content is empty"));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers = rdr
        .byte_headers()?
        .iter()
        .map(|cell| {
            std::str::from_utf8(cell)
                .map(str::to_owned)
                .map_err(|e| PipelineError::format(format!("header is not valid utf-8: {e}")))
        })
        .collect::<PipelineResult<Vec<_>>>()?;

    let normalized: Vec<String> = headers.iter().map(|h| normalize_column(h)).collect();
    let mut column_indexes = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    for &column in required {
        let wanted = normalize_column(column);
        match normalized.iter().position(|h| *h == wanted) {
            Some(idx) => column_indexes.push(idx),
            None => missing.push(column.to_owned()),
        }
    }
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns { columns: missing });
    }

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let row = result?;
        if !is_blank(&row) {
            rows.push(row);
        }
    }
    if rows.is_empty() {
        return Err(PipelineError::EmptyFile);
    }

    Ok(ValidatedTable {
        headers,
        column_indexes,
        rows,
    })
}

/// A line made only of spaces/tabs. The reader already skips truly empty lines.
fn is_blank(row: &ByteRecord) -> bool {
    row.len() == 1 && row.iter().all(|cell| cell.iter().all(u8::is_ascii_whitespace))
}

fn normalize_column(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{REQUIRED_COLUMNS, validate_header};
    use crate::error::PipelineError;

    #[test]
    fn accepts_reordered_case_insensitive_headers() {
        let input = " temperature ,TYPE,Flowrate,equipment name,Pressure,Notes\n80,Pump,10,P-1,2,x\n";
        let table = validate_header(input.as_bytes(), &REQUIRED_COLUMNS).unwrap();
        assert_eq!(table.column_indexes, vec![3, 1, 2, 4, 0]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(&table.rows[0], 0), Some(&b"P-1"[..]));
    }

    #[test]
    fn reports_every_missing_column_in_canonical_order() {
        let input = "Temperature,Equipment Name\n80,P-1\n";
        let err = validate_header(input.as_bytes(), &REQUIRED_COLUMNS).unwrap_err();
        match err {
            PipelineError::MissingColumns { columns } => {
                assert_eq!(columns, vec!["Type", "Flowrate", "Pressure"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_is_empty_file() {
        let input = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\n\n";
        let err = validate_header(input.as_bytes(), &REQUIRED_COLUMNS).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyFile));
    }

    #[test]
    fn blank_content_is_format_error() {
        let err = validate_header(b"  \n ", &REQUIRED_COLUMNS).unwrap_err();
        assert!(matches!(err, PipelineError::Format { .. }));
    }

    #[test]
    fn whitespace_only_lines_after_header_are_empty_file() {
        let input = "Equipment Name,Type,Flowrate,Pressure,Temperature\n   \n \t \n";
        let err = validate_header(input.as_bytes(), &REQUIRED_COLUMNS).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyFile));
    }

    #[test]
    fn whitespace_lines_between_rows_are_skipped() {
        let input = "Equipment Name,Type,Flowrate,Pressure,Temperature\nP-1,Pump,1,2,3\n  \nV-1,Valve,4,5,6\n";
        let table = validate_header(input.as_bytes(), &REQUIRED_COLUMNS).unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn byte_order_mark_alone_is_format_error() {
        for input in ["\u{feff}", "\u{feff}  \n\t"] {
            let err = validate_header(input.as_bytes(), &REQUIRED_COLUMNS).unwrap_err();
            assert!(matches!(err, PipelineError::Format { .. }), "{input:?}: {err:?}");
        }
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let input = "\u{feff}Equipment Name,Type,Flowrate,Pressure,Temperature\nP-1,Pump,1,2,3\n";
        let table = validate_header(input.as_bytes(), &REQUIRED_COLUMNS).unwrap();
        assert_eq!(table.column_indexes[0], 0);
    }

    #[test]
    fn non_utf8_header_is_format_error() {
        let mut input = b"Equipment Name,Type,Flow".to_vec();
        input.push(0xff);
        input.extend_from_slice(b"rate,Pressure,Temperature\nP-1,Pump,1,2,3\n");
        let err = validate_header(&input, &REQUIRED_COLUMNS).unwrap_err();
        assert!(matches!(err, PipelineError::Format { .. }));
    }
}
