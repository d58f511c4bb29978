use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored purchase requisition, as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DocumentRecord {
    pub document_id: i64,
    pub document_number: Option<String>,
    pub document_title: Option<String>,
    pub request_user: Option<String>,
    pub request_group: Option<String>,
    pub request_factory: Option<String>,
    pub amount: i64,
    pub flow_status: Option<String>,
    pub end_date: Option<String>,
    pub downloaded: i32,
    pub json_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Flattened row ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub document_id: i64,
    pub document_number: String,
    pub document_title: String,
    pub request_user: String,
    pub request_group: String,
    pub request_factory: String,
    pub amount: i64,
    pub flow_status: String,
    pub end_date: String,
    pub json_data: serde_json::Value,
}

/// Value of the `downloaded` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadedFlag {
    Pending,
    Downloaded,
}

impl DownloadedFlag {
    pub fn as_i32(self) -> i32 {
        match self {
            DownloadedFlag::Pending => 0,
            DownloadedFlag::Downloaded => 1,
        }
    }
}

impl TryFrom<i64> for DownloadedFlag {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DownloadedFlag::Pending),
            1 => Ok(DownloadedFlag::Downloaded),
            other => Err(format!("downloaded must be 0 or 1, got {other}")),
        }
    }
}

/// Where the opaque nested fields of a submission live.
///
/// The submitting system names its form fields positionally (`fid16`, `fid3`),
/// so the mapping from payload path to column is configuration rather than
/// something derivable from the payload. Values are JSON pointers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(default = "FieldMap::default_request_factory")]
    pub request_factory: String,
    #[serde(default = "FieldMap::default_amount")]
    pub amount: String,
}

impl FieldMap {
    fn default_request_factory() -> String {
        "/contents/fid16/label".to_string()
    }

    fn default_amount() -> String {
        "/contents/fid3/value".to_string()
    }

    /// Pointers must be absolute JSON pointers.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        for (column, pointer) in [("request_factory", &self.request_factory), ("amount", &self.amount)] {
            if !pointer.starts_with('/') {
                errors.push(format!("FIELD_MAP.{column} must be a JSON pointer starting with '/'"));
            }
        }
        errors
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        FieldMap {
            request_factory: Self::default_request_factory(),
            amount: Self::default_amount(),
        }
    }
}
