//! CSV decoding for bulk uploads.

use std::collections::HashMap;

/// Decodes CSV bytes into one field map per data row, keyed by header name.
///
/// Header names and values are trimmed. A header-only file yields no rows.
pub fn decode_csv(bytes: &[u8]) -> Result<Vec<HashMap<String, String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Looks up a column and treats blank cells as absent.
pub fn field<'a>(row: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    row.get(name).map(String::as_str).filter(|v| !v.is_empty())
}
