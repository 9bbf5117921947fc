use serde::{Deserialize, Serialize};

/// A question/SQL pair as stored by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlPair {
    pub id: i64,
    pub project_id: i64,
    pub question: String,
    pub sql: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// An instruction as stored by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub id: i64,
    pub project_id: i64,
    pub instruction: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Objects that belong to a project.
pub trait ProjectScoped {
    fn project_id(&self) -> i64;

    fn in_project(&self, project_id: Option<&str>) -> bool {
        project_id.map_or(true, |expected| expected.trim() == self.project_id().to_string())
    }
}

impl ProjectScoped for SqlPair {
    fn project_id(&self) -> i64 {
        self.project_id
    }
}

impl ProjectScoped for Instruction {
    fn project_id(&self) -> i64 {
        self.project_id
    }
}
