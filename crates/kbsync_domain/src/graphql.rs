use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named GraphQL operation with its variables, posted as one request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlOperation {
    pub operation_name: String,
    pub query: String,
    pub variables: Value,
}

impl GraphqlOperation {
    pub fn new(operation_name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            query: query.into(),
            variables: Value::Object(Default::default()),
        }
    }

    pub fn variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphqlErrorEntry {
    pub message: String,
    #[serde(default)]
    pub path: Option<Value>,
}

/// The response envelope. Either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorEntry>>,
}

impl GraphqlResponse {
    /// Error messages, empty when the server reported none.
    pub fn error_messages(&self) -> Vec<&str> {
        self.errors
            .iter()
            .flatten()
            .map(|error| error.message.as_str())
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }

    /// The payload of a top-level field under `data`, if non-null.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data
            .as_ref()
            .and_then(|data| data.get(name))
            .filter(|value| !value.is_null())
    }
}

/// Renders a JSON identifier (number or string) as text.
pub fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_operation_serializes_operation_name() {
        let operation = GraphqlOperation::new("SqlPairs", "query SqlPairs { sqlPairs { id } }");
        let actual = serde_json::to_value(&operation).unwrap();
        assert_eq!(
            actual,
            json!({
                "operationName": "SqlPairs",
                "query": "query SqlPairs { sqlPairs { id } }",
                "variables": {}
            })
        );
    }

    #[test]
    fn test_response_with_errors() {
        let response: GraphqlResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "No project found" }]
        }))
        .unwrap();
        assert!(response.has_errors());
        assert_eq!(response.error_messages(), vec!["No project found"]);
        assert_eq!(response.field("createSqlPair"), None);
    }

    #[test]
    fn test_empty_error_list_is_not_an_error() {
        let response: GraphqlResponse =
            serde_json::from_value(json!({ "data": { "createSqlPair": { "id": 7 } }, "errors": [] }))
                .unwrap();
        assert!(!response.has_errors());
        assert_eq!(response.field("createSqlPair"), Some(&json!({ "id": 7 })));
    }

    #[test]
    fn test_id_to_string() {
        assert_eq!(id_to_string(&json!(42)), Some("42".to_string()));
        assert_eq!(id_to_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(id_to_string(&json!("")), None);
        assert_eq!(id_to_string(&json!(null)), None);
    }
}
