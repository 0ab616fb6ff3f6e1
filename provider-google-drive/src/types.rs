//! Drive API v3 wire types and the file summary handed to callers.

use serde::{Deserialize, Serialize};

/// One entry of the recent-files list.
///
/// Only `name` is required; Drive may omit the rest depending on the file and
/// the `fields` mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub mime_type: Option<String>,

    /// RFC 3339 timestamp, passed through as received.
    #[serde(default)]
    pub modified_time: Option<String>,
}

/// `files.list` response body.
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
pub(crate) struct FilesListResponse {
    pub files: Vec<FileSummary>,
}

/// Google API error envelope: `{"error": {"code": 401, "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}
