//! Repository mirror subsystem.
//!
//! # Data Flow
//! ```text
//! refresh request
//!     → Mirror::sync (blocking; run on the blocking pool by the store)
//!         missing/empty dir  → git clone <url> <root>
//!         working copy       → git pull --ff-only
//!     → mirror root now holds the latest upstream snapshot
//! ```
//!
//! # Design Decisions
//! - `Mirror` is a trait so the store can run against a fixture in tests
//! - Sync is a single blocking external call; no rollback on failure
//! - Never clones over a non-empty directory that is not a working copy

pub mod git;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

pub use git::GitMirror;

/// A local copy of the upstream configuration repository.
pub trait Mirror: Send + Sync {
    /// Directory holding the synced snapshot.
    fn root(&self) -> &Path;

    /// Bring the mirror up to date with upstream. Blocks until done.
    fn sync(&self) -> Result<(), SyncError>;
}

/// Error raised when the mirror could not be brought up to date.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to run git {operation}: {source}")]
    Spawn {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("git {operation} failed ({status}): {stderr}")]
    Failed {
        operation: &'static str,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{} exists but is not a git working copy", path.display())]
    NotARepository { path: PathBuf },

    #[error("failed to prepare mirror directory {}: {source}", path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
