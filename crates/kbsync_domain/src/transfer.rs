use serde::Serialize;
use strum_macros::{Display, EnumString};

/// How a single dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Success,
    HttpError,
    ApplicationError,
    Exception,
}

/// Result of dispatching one record. The detail is the created object's id on
/// success and the raw error text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferResult {
    outcome: Outcome,
    detail: String,
}

impl TransferResult {
    pub fn success(id: impl Into<String>) -> Self {
        Self { outcome: Outcome::Success, detail: id.into() }
    }

    pub fn http_error(status: u16, body: impl AsRef<str>) -> Self {
        Self {
            outcome: Outcome::HttpError,
            detail: format!("HTTP Error: {} - {}", status, body.as_ref()),
        }
    }

    pub fn application_error(detail: impl Into<String>) -> Self {
        Self { outcome: Outcome::ApplicationError, detail: detail.into() }
    }

    pub fn exception(detail: impl Into<String>) -> Self {
        Self { outcome: Outcome::Exception, detail: detail.into() }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
