use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use chrono::{Local, NaiveDateTime};
use kbsync_domain::{FileService, GraphqlOperation, Infrastructure};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::export::{query_field, ExportError};

#[derive(Debug, Clone, Deserialize)]
struct MdlPayload {
    hash: String,
    mdl: Option<String>,
}

/// Headline numbers of a semantic model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdlSummary {
    pub models: usize,
    pub relationships: usize,
    pub views: usize,
    pub data_source: Option<String>,
    pub catalog: Option<String>,
    pub schema: Option<String>,
}

impl MdlSummary {
    pub fn of(mdl: &Value) -> Self {
        let count = |key: &str| mdl.get(key).and_then(Value::as_array).map_or(0, Vec::len);
        let text = |key: &str| mdl.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            models: count("models"),
            relationships: count("relationships"),
            views: count("views"),
            data_source: text("dataSource"),
            catalog: text("catalog"),
            schema: text("schema"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MdlExport {
    pub hash: String,
    pub path: PathBuf,
    pub summary: MdlSummary,
}

/// Decodes the base64 text the API uses to ship a model.
pub fn decode_mdl(encoded: &str) -> Result<Value, ExportError> {
    let decode_error =
        |reason: String| ExportError::Decode { field: "getMDL.mdl".to_string(), reason };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| decode_error(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| decode_error(e.to_string()))
}

pub fn mdl_file_name(at: NaiveDateTime) -> String {
    format!("modelling_export_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Saves the deployed semantic model of one deployment as pretty JSON.
pub struct MdlExporter<F> {
    infra: Arc<F>,
}

impl<F: Infrastructure> MdlExporter<F> {
    pub fn new(infra: Arc<F>) -> Self {
        Self { infra }
    }

    pub async fn fetch(&self, hash: &str) -> Result<(String, Value), ExportError> {
        let operation = GraphqlOperation::new(
            "GetMDL",
            "query GetMDL($hash: String!) { getMDL(hash: $hash) { hash mdl } }",
        )
        .variables(json!({ "hash": hash }));

        let value = query_field(self.infra.graphql_service(), &operation, "getMDL").await?;
        let payload: MdlPayload = serde_json::from_value(value).map_err(|e| ExportError::Decode {
            field: "getMDL".to_string(),
            reason: e.to_string(),
        })?;
        let encoded = payload
            .mdl
            .ok_or_else(|| ExportError::MissingField("getMDL.mdl".to_string()))?;
        Ok((payload.hash, decode_mdl(&encoded)?))
    }

    pub async fn export(&self, hash: &str, output_dir: &Path) -> Result<MdlExport, ExportError> {
        self.export_at(hash, output_dir, Local::now().naive_local()).await
    }

    pub async fn export_at(
        &self,
        hash: &str,
        output_dir: &Path,
        at: NaiveDateTime,
    ) -> Result<MdlExport, ExportError> {
        let (hash, mdl) = self.fetch(hash).await?;
        let path = output_dir.join(mdl_file_name(at));
        let contents = serde_json::to_vec_pretty(&mdl).map_err(|e| ExportError::Decode {
            field: "getMDL.mdl".to_string(),
            reason: e.to_string(),
        })?;
        self.infra.file_service().write(&path, &contents).await?;

        let summary = MdlSummary::of(&mdl);
        info!(hash = %hash, path = %path.display(), models = summary.models, "Exported MDL");
        Ok(MdlExport { hash, path, summary })
    }
}
