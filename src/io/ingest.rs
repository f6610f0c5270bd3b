//! CSV ingest for observed `(x, y)` points.
//!
//! We expect a header row with (at least) `x` and `y` columns. Header matching
//! is case-insensitive after trimming and BOM stripping; any other columns are
//! ignored. The whole file is validated up front so a bad row never reaches
//! the optimizer.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::ObservedPoint;
use crate::error::DataError;

/// Minimum number of data rows required to attempt a fit.
pub const MIN_ROWS: usize = 10;

/// Cell spellings treated as a missing value (compared case-insensitively).
const MISSING_MARKERS: [&str; 8] = ["", "na", "n/a", "nan", "-nan", "null", "none", "#n/a"];

const REQUIRED_COLUMNS: [&str; 2] = ["x", "y"];

/// Load observed points from a CSV file.
///
/// Checks run in this order: file exists, file readable, required columns,
/// row count, then per-cell values.
pub fn load_points(path: &Path) -> Result<Vec<ObservedPoint>, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let read_err = |source: csv::Error| DataError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| read_err(e.into()))?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().map_err(read_err)?.clone();
    let header_map = build_header_map(&headers);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !header_map.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns { missing });
    }
    let x_idx = header_map["x"];
    let y_idx = header_map["y"];

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(read_err)?;
        // Header is line 1; fall back to a dense count when position is unknown.
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        rows.push((line, record));
    }

    if rows.len() < MIN_ROWS {
        return Err(DataError::InsufficientRows {
            rows: rows.len(),
            min: MIN_ROWS,
        });
    }

    rows.iter()
        .map(|(line, record)| {
            let x = parse_cell(record, x_idx, *line, "x")?;
            let y = parse_cell(record, y_idx, *line, "y")?;
            Ok(ObservedPoint::new(x, y))
        })
        .collect()
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

fn parse_cell(record: &StringRecord, idx: usize, line: usize, column: &'static str) -> Result<f64, DataError> {
    let raw = record.get(idx).map(str::trim).unwrap_or("");
    if is_missing(raw) {
        return Err(DataError::MissingValue { line, column });
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DataError::InvalidValue {
            line,
            column,
            value: raw.to_string(),
        }),
    }
}

fn is_missing(raw: &str) -> bool {
    MISSING_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m))
}
