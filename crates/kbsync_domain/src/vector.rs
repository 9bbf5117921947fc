use serde_json::{Map, Value};

/// Collection holding indexed instructions.
pub const INSTRUCTIONS_COLLECTION: &str = "instructions";
/// Collection holding indexed question/SQL pairs.
pub const SQL_PAIRS_COLLECTION: &str = "sql_pairs";

/// A point read back from the vector store, payload converted to JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredPoint {
    pub id: String,
    pub payload: Map<String, Value>,
}

impl StoredPoint {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), payload: Map::new() }
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// String payload field. Numbers are rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.payload.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.payload.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStats {
    pub name: String,
    pub points: u64,
}
