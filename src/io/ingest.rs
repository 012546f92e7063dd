//! CSV ingest.
//!
//! Turns a measurement CSV (header row, numeric columns) into a [`Dataset`]
//! of one coordinate column and one data column.
//!
//! - **Strict schema**: the requested columns must exist (exit code 2)
//! - **Row-level validation**: unparsable rows are skipped and reported
//! - no analysis logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Dataset;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the dataset plus bookkeeping about skipped rows.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: Dataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load `x_column` / `y_column` from a CSV file.
pub fn load_dataset(path: &Path, x_column: &str, y_column: &str) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    read_dataset(file, x_column, y_column)
}

/// Like [`load_dataset`], from any reader.
pub fn read_dataset<R: std::io::Read>(
    reader: R,
    x_column: &str,
    y_column: &str,
) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let x_idx = column_index(&header_map, x_column)?;
    let y_idx = column_index(&header_map, y_column)?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match (parse_field(&record, x_idx, x_column), parse_field(&record, y_idx, y_column)) {
            (Ok(xv), Ok(yv)) => {
                x.push(xv);
                y.push(yv);
            }
            (Err(message), _) | (_, Err(message)) => row_errors.push(RowError { line, message }),
        }
    }

    for err in &row_errors {
        log::warn!("skipping line {}: {}", err.line, err.message);
    }

    let rows_used = x.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after parsing."));
    }

    let dataset = Dataset::new(x, y)?;
    Ok(IngestedData {
        dataset,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn column_index(header_map: &HashMap<String, usize>, column: &str) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(column))
        .copied()
        .ok_or_else(|| {
            let mut known: Vec<&str> = header_map.keys().map(String::as_str).collect();
            known.sort_unstable();
            AppError::new(
                2,
                format!("Missing column `{column}` (found: {}).", known.join(", ")),
            )
        })
}

fn parse_field(record: &StringRecord, idx: usize, column: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .ok_or_else(|| format!("missing value for `{column}`"))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("invalid number for `{column}`: '{raw}'"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("non-finite value for `{column}`: '{raw}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_columns_case_insensitively() {
        let csv = "\u{feff}Time,Signal,extra\n0.0,1.5,a\n0.5,2.5,b\n";
        let ingest = read_dataset(csv.as_bytes(), "time", "SIGNAL").unwrap();
        assert_eq!(ingest.rows_used, 2);
        assert_eq!(ingest.dataset.data(), &[1.5, 2.5]);
        assert_eq!(ingest.dataset.coordinates().as_1d().unwrap(), &[0.0, 0.5]);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let csv = "x,y\n0,1\n1,oops\n2\n3,nan\n4,5\n";
        let ingest = read_dataset(csv.as_bytes(), "x", "y").unwrap();
        assert_eq!(ingest.rows_read, 5);
        assert_eq!(ingest.rows_used, 2);
        let lines: Vec<usize> = ingest.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
    }

    #[test]
    fn missing_column_is_a_usage_error() {
        let err = read_dataset("a,b\n1,2\n".as_bytes(), "x", "y").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("a, b"));
    }

    #[test]
    fn no_usable_rows_is_exit_code_3() {
        let err = read_dataset("x,y\n1,z\n".as_bytes(), "x", "y").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
