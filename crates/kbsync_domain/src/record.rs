use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::RecordParseError;

/// Separator used by multi-value columns such as `questions`.
pub const LIST_DELIMITER: char = ';';

/// One input row keyed by header name, with its 1-based data position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    position: usize,
    values: BTreeMap<String, String>,
}

impl Row {
    pub fn new(position: usize) -> Self {
        Self { position, values: BTreeMap::new() }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Raw value of a column, untrimmed.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Trimmed value that must be present and non-empty.
    pub fn required(&self, column: &str) -> Result<String, RecordParseError> {
        let value = self.get(column).map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return Err(RecordParseError::new(
                self.position,
                format!("{column} cannot be empty"),
            ));
        }
        Ok(value.to_string())
    }

    pub fn list(&self, column: &str) -> Vec<String> {
        split_list(self.get(column).unwrap_or_default())
    }

    pub fn flag(&self, column: &str) -> bool {
        parse_flag(self.get(column).unwrap_or_default())
    }
}

/// Splits a `;`-joined value into trimmed, non-empty items, keeping order.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// `true`, `1` and `yes` in any case are truthy; everything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// A record type that can be read from a row source.
pub trait Record: Sized + Debug + Clone + Send + Sync + 'static {
    /// Columns that must appear in the header.
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Human-readable name used in logs and summaries.
    const NAME: &'static str;

    fn from_row(row: &Row) -> Result<Self, RecordParseError>;

    /// Identifying field shown next to per-row diagnostics.
    fn label(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlPairRecord {
    pub question: String,
    pub sql: String,
}

impl Record for SqlPairRecord {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["question", "sql"];
    const NAME: &'static str = "SQL pair";

    fn from_row(row: &Row) -> Result<Self, RecordParseError> {
        Ok(Self { question: row.required("question")?, sql: row.required("sql")? })
    }

    fn label(&self) -> String {
        truncate(&self.question, 50)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionRecord {
    pub instruction_id: String,
    pub instruction: String,
    pub questions: Vec<String>,
    pub is_default: bool,
}

impl InstructionRecord {
    /// Default instructions apply to every question of the project.
    pub fn is_global(&self) -> bool {
        self.is_default
    }
}

impl Record for InstructionRecord {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["instruction_id", "instruction", "is_default"];
    const NAME: &'static str = "instruction";

    fn from_row(row: &Row) -> Result<Self, RecordParseError> {
        Ok(Self {
            instruction_id: row.required("instruction_id")?,
            instruction: row.required("instruction")?,
            questions: row.list("questions"),
            is_default: row.flag("is_default"),
        })
    }

    fn label(&self) -> String {
        self.instruction_id.clone()
    }
}

/// Shortens `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{head}...")
}
