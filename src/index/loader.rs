//! Manifest loading from the mirror.

use std::fs;
use std::io;
use std::path::Path;

use super::{Index, LoadError};

/// Manifest location, relative to the mirror root.
pub const MANIFEST_FILE: &str = "index.json";

/// Load the index from `<mirror_root>/index.json`.
pub fn load(mirror_root: &Path) -> Result<Index, LoadError> {
    let path = mirror_root.join(MANIFEST_FILE);

    let raw = fs::read(&path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound { path: path.clone() },
        _ => LoadError::Unreadable {
            path: path.clone(),
            source,
        },
    })?;

    let index: Index =
        serde_json::from_slice(&raw).map_err(|source| LoadError::Malformed { path: path.clone(), source })?;

    tracing::debug!(path = %path.display(), entries = index.len(), "Manifest loaded");
    Ok(index)
}
