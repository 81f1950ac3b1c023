//! CSV row source
//!
//! Banks export statements with wildly different headers, so this stage does
//! not interpret columns at all: it turns the raw text into header-keyed
//! rows and leaves meaning to the field extractor.

use std::collections::HashMap;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

/// One data line of the statement, keyed by trimmed header name.
pub type RawRow = HashMap<String, String>;

/// Parse raw statement text into an ordered sequence of rows.
///
/// Tolerates a trailing newline, ragged rows (missing trailing cells become
/// empty strings), and individual malformed lines, which are skipped rather
/// than failing the file. Fully blank lines are dropped. Empty or
/// header-only input yields an empty sequence; deciding whether that is an
/// error belongs to the caller.
pub fn read_rows(csv_text: &str) -> Vec<RawRow> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv_text.as_bytes());

    let headers = match rdr.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            debug!(error = %e, "unreadable CSV header line");
            return Vec::new();
        }
    };

    let mut rows = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(line = index, error = %e, "skipping malformed CSV line");
                continue;
            }
        };

        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let mut row = RawRow::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("");
            row.insert(header.to_string(), value.to_string());
        }
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rows_basic() {
        let csv = "Date,Description,Amount\n15/01/2025,Netflix,-9.99\n31/01/2025,Salary,2000.00\n";
        let rows = read_rows(csv);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Description"], "Netflix");
        assert_eq!(rows[1]["Amount"], "2000.00");
    }

    #[test]
    fn test_read_rows_trims_headers_and_cells() {
        let csv = " Date , Description , Amount \n15/01/2025, Netflix ,-9.99\n";
        let rows = read_rows(csv);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Description"], "Netflix");
    }

    #[test]
    fn test_read_rows_ragged_row_pads_with_empty() {
        let csv = "Date,Description,Amount\n15/01/2025,Netflix\n";
        let rows = read_rows(csv);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Amount"], "");
    }

    #[test]
    fn test_read_rows_skips_blank_lines() {
        let csv = "Date,Description,Amount\n\n15/01/2025,Netflix,-9.99\n\n";
        let rows = read_rows(csv);

        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_read_rows_header_only_is_empty() {
        assert!(read_rows("Date,Description,Amount\n").is_empty());
        assert!(read_rows("").is_empty());
    }
}
