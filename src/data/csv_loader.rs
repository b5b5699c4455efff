use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::data::row::Row;

/// Load a headed CSV file into `(key, text)` rows.
///
/// `key_column` and `text_column` name the header fields to use; any other
/// columns are appended after them in file order.
pub fn load_rows_from_csv<P: AsRef<Path>>(
    path: P,
    key_column: &str,
    text_column: &str,
) -> Result<Vec<Row>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;
    load_rows_from_reader(file, key_column, text_column)
        .with_context(|| format!("Failed to load rows from {:?}", path.as_ref()))
}

pub fn load_rows_from_reader<R: Read>(
    reader: R,
    key_column: &str,
    text_column: &str,
) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow::anyhow!("Column '{}' not found in CSV headers", name))
    };
    let key_idx = find(key_column)?;
    let text_idx = find(text_column)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut cells = vec![
            record.get(key_idx).unwrap_or_default().to_string(),
            record.get(text_idx).unwrap_or_default().to_string(),
        ];
        cells.extend(
            record
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != key_idx && *idx != text_idx)
                .map(|(_, value)| value.to_string()),
        );
        rows.push(Row::new(cells));
    }

    Ok(rows)
}
