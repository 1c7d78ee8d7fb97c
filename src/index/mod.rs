//! Repository index: which configuration file belongs to which repository.
//!
//! # Data Flow
//! ```text
//! <mirror root>/index.json
//!     → loader.rs (read, parse as {url: filename})
//!     → Index (immutable)
//!     → published by the store as the active snapshot
//! ```
//!
//! # Design Decisions
//! - Target files are not checked at load time; lookups validate lazily
//! - An Index is never mutated after construction; refresh builds a new one

pub mod loader;

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub use loader::{load, MANIFEST_FILE};

/// Immutable mapping from repository URL to configuration filename
/// (relative to the mirror root).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Index {
    entries: HashMap<String, String>,
}

impl Index {
    /// Filename registered for `url`, if any.
    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Index {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Error raised when the manifest cannot be turned into an Index.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("manifest {} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("manifest {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest {} could not be read: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
