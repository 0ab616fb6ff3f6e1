//! Immutable per-trigger page state.
//!
//! The page keeps one [`ViewState`] and replaces it with the value returned by
//! each transition; nothing here is shared or mutated in place.

use provider_google_drive::FileSummary;
use serde::{Deserialize, Serialize};

/// What the page renders: a loading flag, the last list and the last error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewState {
    pub loading: bool,
    pub files: Vec<FileSummary>,
    pub error: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trigger started. The previous list stays visible until replaced.
    #[must_use]
    pub fn begin_loading(&self) -> Self {
        Self {
            loading: true,
            files: self.files.clone(),
            error: None,
        }
    }

    /// A listing succeeded.
    #[must_use]
    pub fn with_files(&self, files: Vec<FileSummary>) -> Self {
        Self {
            loading: false,
            files,
            error: None,
        }
    }

    /// A trigger failed. Replaces any prior message and keeps the list.
    #[must_use]
    pub fn with_error(&self, message: impl Into<String>) -> Self {
        Self {
            loading: false,
            files: self.files.clone(),
            error: Some(message.into()),
        }
    }

    /// Nothing to show: no list, no error.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self::default()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|file| file.name.as_str())
    }
}
