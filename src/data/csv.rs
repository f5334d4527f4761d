//! CSV loading for dense datasets
//!
//! Supports files where:
//! - The last column is the label ({0, 1} or {-1, +1})
//! - All other columns are features
//! - First row can be headers (automatically detected)

use crate::core::{KMethodError, Result};
use crate::data::Dataset;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

impl Dataset {
    /// Load a dataset from a CSV file, naming it after the file stem
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_csv_reader(BufReader::new(file), true)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Dataset")
            .to_string();
        Ok(dataset.with_name(name))
    }

    /// Load a dataset from a reader; `auto_detect_header` skips a leading
    /// non-numeric row
    pub fn from_csv_reader<R: BufRead>(reader: R, auto_detect_header: bool) -> Result<Self> {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut first_data_line = true;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first_data_line {
                first_data_line = false;
                if auto_detect_header && is_header_line(line) {
                    continue;
                }
            }

            let (row, label) = parse_data_line(line, line_no + 1)?;
            if let Some(first) = features.first().map(Vec::len) {
                if row.len() != first {
                    return Err(KMethodError::ParseError(format!(
                        "line {}: expected {} features, found {}",
                        line_no + 1,
                        first,
                        row.len()
                    )));
                }
            }
            features.push(row);
            labels.push(label);
        }

        if features.is_empty() {
            return Err(KMethodError::EmptyDataset);
        }

        Dataset::new(features, labels)
    }
}

/// Check if a line appears to be a header
fn is_header_line(line: &str) -> bool {
    let fields: Vec<&str> = line.split(',').collect();

    if fields.len() < 2 {
        return false;
    }

    // Most feature columns fail to parse as numbers
    let non_numeric_count = fields
        .iter()
        .take(fields.len() - 1)
        .filter(|field| field.trim().parse::<f64>().is_err())
        .count();

    non_numeric_count > (fields.len() - 1) / 2
}

/// Parse a CSV data line into a feature row and its raw label
fn parse_data_line(line: &str, line_no: usize) -> Result<(Vec<f64>, f64)> {
    let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();

    if fields.len() < 2 {
        return Err(KMethodError::ParseError(format!(
            "line {line_no}: too few fields: {line}"
        )));
    }

    let label_str = fields[fields.len() - 1];
    let label = label_str.parse::<f64>().map_err(|_| {
        KMethodError::ParseError(format!("line {line_no}: invalid label: {label_str}"))
    })?;

    let row = fields[..fields.len() - 1]
        .iter()
        .enumerate()
        .map(|(col, field)| {
            match field.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(KMethodError::ParseError(format!(
                    "line {line_no}: invalid feature value at column {}: {field}",
                    col + 1
                ))),
            }
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok((row, label))
}
