use std::path::{Path, PathBuf};
use std::sync::Arc;

use kbsync_domain::{
    FileService, GraphqlOperation, GraphqlService, Infrastructure, Instruction, ProjectScoped,
    SqlPair, Table, TransportError, LIST_DELIMITER,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("GraphQL Error: {0}")]
    Graphql(String),

    #[error("Response has no `{0}` field")]
    MissingField(String),

    #[error("Failed to decode `{field}`: {reason}")]
    Decode { field: String, reason: String },

    #[error(transparent)]
    Write(#[from] anyhow::Error),
}

/// Sends `operation` and returns the non-null payload of `field`.
pub(crate) async fn query_field<G: GraphqlService + ?Sized>(
    graphql: &G,
    operation: &GraphqlOperation,
    field: &str,
) -> Result<Value, ExportError> {
    let response = graphql.execute(operation).await?;
    if response.has_errors() {
        return Err(ExportError::Graphql(response.error_messages().join("; ")));
    }
    response
        .field(field)
        .cloned()
        .ok_or_else(|| ExportError::MissingField(field.to_string()))
}

pub(crate) async fn query_list<G: GraphqlService + ?Sized, T: DeserializeOwned>(
    graphql: &G,
    operation: &GraphqlOperation,
    field: &str,
) -> Result<Vec<T>, ExportError> {
    let value = query_field(graphql, operation, field).await?;
    serde_json::from_value(value)
        .map_err(|e| ExportError::Decode { field: field.to_string(), reason: e.to_string() })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Dataset {
    SqlPairs,
    Instructions,
}

impl Dataset {
    pub fn file_name(&self) -> String {
        format!("{self}.csv")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetExport {
    pub path: PathBuf,
    pub count: usize,
}

/// Outcome of one export. Each dataset succeeds or fails on its own.
#[derive(Debug)]
pub struct ExportReport {
    pub sql_pairs: Result<DatasetExport, ExportError>,
    pub instructions: Result<DatasetExport, ExportError>,
}

impl ExportReport {
    pub fn is_clean(&self) -> bool {
        self.sql_pairs.is_ok() && self.instructions.is_ok()
    }
}

pub const SQL_PAIR_COLUMNS: [&str; 5] = ["question", "sql", "project_id", "created_at", "updated_at"];

pub const INSTRUCTION_COLUMNS: [&str; 7] = [
    "instruction_id",
    "instruction",
    "questions",
    "is_default",
    "project_id",
    "created_at",
    "updated_at",
];

pub fn sql_pairs_table(pairs: &[SqlPair]) -> Table {
    let mut table = Table::new(&SQL_PAIR_COLUMNS);
    for pair in pairs {
        table.push(vec![
            pair.question.clone(),
            pair.sql.clone(),
            pair.project_id.to_string(),
            pair.created_at.clone().unwrap_or_default(),
            pair.updated_at.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub fn instructions_table(instructions: &[Instruction]) -> Table {
    let separator = LIST_DELIMITER.to_string();
    let mut table = Table::new(&INSTRUCTION_COLUMNS);
    for instruction in instructions {
        table.push(vec![
            format!("exported_instruction_{}", instruction.id),
            instruction.instruction.clone(),
            instruction.questions.join(separator.as_str()),
            instruction.is_default.to_string(),
            instruction.project_id.to_string(),
            instruction.created_at.clone().unwrap_or_default(),
            instruction.updated_at.clone().unwrap_or_default(),
        ]);
    }
    table
}

/// Dumps instructions and SQL pairs into import-compatible CSV files.
pub struct KbExporter<F> {
    infra: Arc<F>,
}

impl<F: Infrastructure> KbExporter<F> {
    pub fn new(infra: Arc<F>) -> Self {
        Self { infra }
    }

    pub async fn sql_pairs(&self) -> Result<Vec<SqlPair>, ExportError> {
        let operation = GraphqlOperation::new(
            "SqlPairs",
            "query SqlPairs { sqlPairs { id projectId sql question createdAt updatedAt } }",
        );
        query_list(self.infra.graphql_service(), &operation, "sqlPairs").await
    }

    pub async fn instructions(&self) -> Result<Vec<Instruction>, ExportError> {
        let operation = GraphqlOperation::new(
            "Instructions",
            "query Instructions { instructions { id projectId instruction questions isDefault createdAt updatedAt } }",
        );
        query_list(self.infra.graphql_service(), &operation, "instructions").await
    }

    /// Writes `sql_pairs.csv` and `instructions.csv` into `output_dir`. A
    /// dataset with no objects still gets its header row.
    pub async fn export(&self, output_dir: &Path, project_id: Option<&str>) -> ExportReport {
        let sql_pairs = match self.sql_pairs().await {
            Ok(pairs) => {
                let pairs = in_project(pairs, project_id);
                self.write(output_dir, Dataset::SqlPairs, sql_pairs_table(&pairs)).await
            }
            Err(error) => Err(error),
        };

        let instructions = match self.instructions().await {
            Ok(instructions) => {
                let instructions = in_project(instructions, project_id);
                self.write(output_dir, Dataset::Instructions, instructions_table(&instructions))
                    .await
            }
            Err(error) => Err(error),
        };

        ExportReport { sql_pairs, instructions }
    }

    async fn write(
        &self,
        output_dir: &Path,
        dataset: Dataset,
        table: Table,
    ) -> Result<DatasetExport, ExportError> {
        let path = output_dir.join(dataset.file_name());
        self.infra.file_service().write_table(&path, &table).await?;
        info!(%dataset, path = %path.display(), count = table.len(), "Exported dataset");
        Ok(DatasetExport { path, count: table.len() })
    }
}

fn in_project<T: ProjectScoped>(items: Vec<T>, project_id: Option<&str>) -> Vec<T> {
    let before = items.len();
    let kept: Vec<T> = items.into_iter().filter(|item| item.in_project(project_id)).collect();
    if kept.len() != before {
        debug!(before, after = kept.len(), project_id, "Filtered by project");
    }
    kept
}
