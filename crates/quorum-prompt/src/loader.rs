use std::path::Path;

use quorum_core::error::{QuorumError, Result};

/// Read a UTF-8 text resource.
///
/// # Errors
///
/// [`QuorumError::ResourceNotFound`] naming `path` when the file is missing
/// or unreadable.
pub fn read_text_resource(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path)
        .inspect_err(|e| tracing::error!(path = %path.display(), error = %e, "file reading failed"))
        .map_err(|source| QuorumError::ResourceNotFound {
            path: path.to_path_buf(),
            source,
        })
}
