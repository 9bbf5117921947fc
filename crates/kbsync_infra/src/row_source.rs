use std::fs::File;
use std::path::Path;

use kbsync_domain::{ConfigurationError, RecordParseError, Row, RowSource, Rows, LIST_DELIMITER};
use serde_json::Value;
use tracing::debug;

/// Reads rows from delimited text or, for `.json` files, from an array of
/// objects.
#[derive(Debug, Default, Clone)]
pub struct FileRowSource;

impl FileRowSource {
    pub fn new() -> Self {
        Self
    }
}

impl RowSource for FileRowSource {
    fn open(&self, path: &Path, required: &[&str]) -> Result<Rows, ConfigurationError> {
        if !path.is_file() {
            return Err(ConfigurationError::MissingFile(path.to_path_buf()));
        }

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            open_json(path, required)
        } else {
            open_csv(path, required)
        }
    }
}

fn unreadable(path: &Path, reason: impl ToString) -> ConfigurationError {
    ConfigurationError::Unreadable { path: path.to_path_buf(), reason: reason.to_string() }
}

fn check_columns(path: &Path, headers: &[String], required: &[&str]) -> Result<(), ConfigurationError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigurationError::MissingColumns { path: path.to_path_buf(), columns: missing })
    }
}

fn open_csv(path: &Path, required: &[&str]) -> Result<Rows, ConfigurationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| unreadable(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| unreadable(path, e))?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    check_columns(path, &headers, required)?;
    debug!(path = %path.display(), columns = ?headers, "Opened CSV input");

    let rows = reader
        .into_records()
        .enumerate()
        .map(move |(index, record)| {
            let position = index + 1;
            let record = record.map_err(|e| RecordParseError::new(position, e.to_string()))?;
            let mut row = Row::new(position);
            for (header, value) in headers.iter().zip(record.iter()) {
                row.insert(header.clone(), value);
            }
            Ok(row)
        });

    Ok(Box::new(rows))
}

fn open_json(path: &Path, required: &[&str]) -> Result<Rows, ConfigurationError> {
    let file = File::open(path).map_err(|e| unreadable(path, e))?;
    let items: Vec<Value> = serde_json::from_reader(file).map_err(|e| unreadable(path, e))?;

    // The first object plays the role of the header row.
    if let Some(first) = items.first() {
        let headers: Vec<String> = first
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default();
        check_columns(path, &headers, required)?;
    }
    debug!(path = %path.display(), items = items.len(), "Opened JSON input");

    let rows = items.into_iter().enumerate().map(|(index, item)| {
        let position = index + 1;
        let Value::Object(object) = item else {
            return Err(RecordParseError::new(position, "expected a JSON object"));
        };
        let mut row = Row::new(position);
        for (key, value) in object {
            row.insert(key, json_text(&value));
        }
        Ok(row)
    });

    Ok(Box::new(rows))
}

/// Flattens a JSON value into the text a CSV cell would hold.
fn json_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => {
            let separator = LIST_DELIMITER.to_string();
            items
                .iter()
                .map(json_text)
                .collect::<Vec<_>>()
                .join(separator.as_str())
        }
        other => other.to_string(),
    }
}
