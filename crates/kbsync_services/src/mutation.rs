use kbsync_domain::{
    id_to_string, GraphqlOperation, GraphqlResponse, InstructionRecord, Record, SqlPairRecord,
    TransferResult, TransportError,
};
use serde_json::json;

/// Maps one record to exactly one outbound mutation.
pub trait Mutation: Send + Sync {
    type Record: Record;

    /// Top-level response field holding the created object.
    const FIELD: &'static str;

    fn operation(&self, record: &Self::Record) -> GraphqlOperation;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateSqlPair;

impl Mutation for CreateSqlPair {
    type Record = SqlPairRecord;
    const FIELD: &'static str = "createSqlPair";

    fn operation(&self, record: &SqlPairRecord) -> GraphqlOperation {
        GraphqlOperation::new(
            "CreateSqlPair",
            r#"mutation CreateSqlPair($data: CreateSqlPairInput!) {
  createSqlPair(data: $data) {
    id
    projectId
    sql
    question
    createdAt
    updatedAt
  }
}"#,
        )
        .variables(json!({
            "data": { "question": record.question, "sql": record.sql }
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateInstruction;

impl Mutation for CreateInstruction {
    type Record = InstructionRecord;
    const FIELD: &'static str = "createInstruction";

    fn operation(&self, record: &InstructionRecord) -> GraphqlOperation {
        GraphqlOperation::new(
            "CreateInstruction",
            r#"mutation CreateInstruction($data: CreateInstructionInput!) {
  createInstruction(data: $data) {
    id
    projectId
    instruction
    questions
    isDefault
    createdAt
    updatedAt
  }
}"#,
        )
        .variables(json!({
            "data": {
                "instruction": record.instruction,
                "questions": record.questions,
                "isDefault": record.is_default,
            }
        }))
    }
}

/// Turns the outcome of one call into a [`TransferResult`]. The `errors`
/// list takes precedence over `data`.
pub fn classify(field: &str, response: Result<GraphqlResponse, TransportError>) -> TransferResult {
    let response = match response {
        Ok(response) => response,
        Err(TransportError::Status { status, body }) => {
            return TransferResult::http_error(status, body)
        }
        Err(error) => return TransferResult::exception(format!("Exception: {error}")),
    };

    if response.has_errors() {
        return TransferResult::application_error(format!(
            "GraphQL Error: {}",
            response.error_messages().join("; ")
        ));
    }

    match response.field(field).and_then(|created| created.get("id")).and_then(id_to_string) {
        Some(id) => TransferResult::success(id),
        None => TransferResult::exception(format!("Exception: response has no {field}.id")),
    }
}

/// Project the created object landed in, if the response carries one.
pub fn created_project(field: &str, response: &GraphqlResponse) -> Option<String> {
    response
        .field(field)
        .and_then(|created| created.get("projectId"))
        .and_then(id_to_string)
}

#[cfg(test)]
mod test {
    use kbsync_domain::Outcome;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::*;

    fn response(value: Value) -> GraphqlResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sql_pair_variables() {
        let record = SqlPairRecord { question: "How many?".to_string(), sql: "SELECT 1".to_string() };
        let operation = CreateSqlPair.operation(&record);
        assert_eq!(operation.operation_name, "CreateSqlPair");
        assert_eq!(
            operation.variables,
            json!({ "data": { "question": "How many?", "sql": "SELECT 1" } })
        );
    }

    #[test]
    fn test_default_instruction_keeps_questions() {
        let record = InstructionRecord {
            instruction_id: "cte_comment_global".to_string(),
            instruction: "Comment every CTE".to_string(),
            questions: vec!["q1".to_string()],
            is_default: true,
        };
        let operation = CreateInstruction.operation(&record);
        assert_eq!(
            operation.variables,
            json!({ "data": { "instruction": "Comment every CTE", "questions": ["q1"], "isDefault": true } })
        );
    }

    #[test]
    fn test_classify_success() {
        let actual = classify(
            "createSqlPair",
            Ok(response(json!({ "data": { "createSqlPair": { "id": 12, "projectId": 20 } } }))),
        );
        assert_eq!(actual, TransferResult::success("12"));
    }

    #[test]
    fn test_classify_errors_win_over_data() {
        let actual = classify(
            "createSqlPair",
            Ok(response(json!({
                "data": { "createSqlPair": { "id": 12 } },
                "errors": [{ "message": "duplicate" }, { "message": "again" }]
            }))),
        );
        assert_eq!(actual.outcome(), Outcome::ApplicationError);
        assert_eq!(actual.detail(), "GraphQL Error: duplicate; again");
    }

    #[test]
    fn test_classify_missing_object_is_exception() {
        let actual = classify("createSqlPair", Ok(response(json!({ "data": null }))));
        assert_eq!(actual.outcome(), Outcome::Exception);
    }

    #[test]
    fn test_classify_transport_failures() {
        let http = classify(
            "createSqlPair",
            Err(TransportError::Status { status: 404, body: "Not Found".to_string() }),
        );
        assert_eq!(http.outcome(), Outcome::HttpError);

        let timeout = classify(
            "createSqlPair",
            Err(TransportError::Request("operation timed out".to_string())),
        );
        assert_eq!(timeout.outcome(), Outcome::Exception);
        assert_eq!(timeout.detail(), "Exception: Request Error: operation timed out");
    }

    #[test]
    fn test_created_project() {
        let body = response(json!({ "data": { "createInstruction": { "id": 1, "projectId": 20 } } }));
        assert_eq!(created_project("createInstruction", &body), Some("20".to_string()));
        assert_eq!(created_project("createSqlPair", &body), None);
    }
}
