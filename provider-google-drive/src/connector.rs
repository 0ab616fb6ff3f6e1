//! Drive `files.list` client for the ten most recently modified files.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_auth::Credential;
use core_runtime::config::{DemoConfig, DEFAULT_DRIVE_API_BASE, DEFAULT_REQUEST_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{ResourceListError, Result};
use crate::types::{ApiErrorResponse, FileSummary, FilesListResponse};

/// Number of files requested per listing
pub const PAGE_SIZE: u32 = 10;

/// Newest first
const ORDER_BY: &str = "modifiedTime desc";

/// Fields mask; keeps the response to what [`FileSummary`] holds
const FILE_FIELDS: &str = "files(id,name,mimeType,modifiedTime)";

/// Lists recently modified Drive files with a bearer credential.
///
/// One attempt per call: a rejected credential is reported as
/// [`ResourceListError::Unauthorized`] and never retried here.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::DriveFilesClient;
///
/// let client = DriveFilesClient::new(http_client);
/// let files = client.list_recent_files(&credential).await?;
/// ```
pub struct DriveFilesClient {
    http_client: Arc<dyn HttpClient>,
    api_base: String,
    timeout: Duration,
}

impl DriveFilesClient {
    /// Client for the public Drive v3 endpoint.
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            api_base: DEFAULT_DRIVE_API_BASE.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config(config: &DemoConfig) -> Self {
        Self::new(Arc::clone(&config.http_client))
            .with_api_base(config.drive_api_base.clone())
            .with_timeout(config.request_timeout)
    }

    /// Point at another base URL, e.g. a local stub server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn list_url(&self) -> String {
        format!(
            "{}/files?pageSize={}&orderBy={}&fields={}",
            self.api_base,
            PAGE_SIZE,
            urlencoding::encode(ORDER_BY),
            urlencoding::encode(FILE_FIELDS)
        )
    }

    /// Fetch the ten most recently modified files, in the order Drive returns them.
    ///
    /// # Errors
    ///
    /// - `NetworkError` - no response was received
    /// - `Unauthorized` - status 401 or 403
    /// - `ServerError` - any other status >= 400, or a body without a file list
    #[instrument(skip(self, credential))]
    pub async fn list_recent_files(&self, credential: &Credential) -> Result<Vec<FileSummary>> {
        let request = HttpRequest::new(HttpMethod::Get, self.list_url())
            .bearer_token(credential.token.as_str())
            .header("Accept", "application/json")
            .timeout(self.timeout);

        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(error = %e, "Drive request produced no response");
            ResourceListError::NetworkError(e.to_string())
        })?;

        let files = Self::classify(response)?;
        info!(count = files.len(), "Listed recent files");
        Ok(files)
    }

    fn classify(response: HttpResponse) -> Result<Vec<FileSummary>> {
        let status = response.status;

        if status == 401 || status == 403 {
            warn!(status, "Drive rejected the credential");
            return Err(ResourceListError::Unauthorized { status });
        }

        if response.is_error() {
            let message = Self::error_message(&response);
            warn!(status, %message, "Drive returned an error");
            return Err(ResourceListError::ServerError { status, message });
        }

        debug!(status, bytes = response.body.len(), "Parsing file list");
        serde_json::from_slice::<FilesListResponse>(&response.body)
            .map(|list| list.files)
            .map_err(|e| {
                warn!(status, error = %e, "Response did not contain a file list");
                ResourceListError::ServerError {
                    status,
                    message: format!("malformed file list: {}", e),
                }
            })
    }

    fn error_message(response: &HttpResponse) -> String {
        serde_json::from_slice::<ApiErrorResponse>(&response.body)
            .ok()
            .and_then(|envelope| envelope.error.message)
            .unwrap_or_else(|| format!("HTTP {}", response.status))
    }
}
