use std::path::Path;

use tracing::debug;

use crate::errors::DataError;
use crate::models::resume::ResumeDocument;

/// Reads and parses one resume data file.
///
/// A missing file or malformed JSON is fatal for the job; the error carries
/// the path and the underlying cause.
pub async fn load_resume(path: &Path) -> Result<ResumeDocument, DataError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Read {} bytes from {}", text.len(), path.display());

    parse_resume(&text, path)
}

/// Parses resume JSON. `path` is only used for error reporting.
pub fn parse_resume(text: &str, path: &Path) -> Result<ResumeDocument, DataError> {
    serde_json::from_str(text).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
