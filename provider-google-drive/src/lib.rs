//! # Google Drive Provider
//!
//! Lists the ten most recently modified files of the signed-in user through
//! Drive API v3 `files.list`, classifying every failure as unauthorized,
//! server-side or network.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::DriveFilesClient;
pub use error::{ResourceListError, Result};
pub use types::FileSummary;
