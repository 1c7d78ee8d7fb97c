//! Configuration store.
//!
//! # Data Flow
//! ```text
//! refresh():
//!     acquire refresh lock (FIFO; one sync at a time)
//!     → blocking pool: Mirror::sync → index::load
//!     → ArcSwap::store(new Snapshot)        (single pointer swap)
//!
//! resolve(url):
//!     ArcSwap::load_full → Snapshot         (never blocks on refresh)
//!     → index lookup → read <mirror root>/<filename>
//! ```
//!
//! # Design Decisions
//! - The active index is an immutable snapshot behind `ArcSwap`; readers see
//!   either the old or the new index, never a mix
//! - A store only exists after a successful initial sync + load
//! - A failed refresh leaves the active snapshot untouched, no retry
//! - The refresh lock guard travels into the blocking job, so an abandoned
//!   refresh still keeps later syncs from overlapping it
//! - Served files must resolve inside the mirror root after following
//!   symlinks; anything else is treated as unavailable

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use arc_swap::ArcSwap;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinError;

use crate::index::{self, Index, LoadError};
use crate::mirror::{Mirror, SyncError};
use crate::observability::metrics;

/// Result of looking up a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The registered file's content.
    Found(String),
    /// URL is not in the index; the caller should use its own default.
    NotRegistered,
    /// URL is registered but the file could not be read. Same fallback as
    /// `NotRegistered`.
    FileUnavailable,
}

impl LookupOutcome {
    fn metric_label(&self) -> &'static str {
        match self {
            LookupOutcome::Found(_) => "found",
            LookupOutcome::NotRegistered => "not_registered",
            LookupOutcome::FileUnavailable => "file_unavailable",
        }
    }
}

/// Error type for refresh (and the initial bootstrap).
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("sync failed: {0}")]
    Sync(#[from] SyncError),

    #[error("index load failed: {0}")]
    Load(#[from] LoadError),

    #[error("refresh task did not complete: {0}")]
    Interrupted(#[from] JoinError),
}

impl RefreshError {
    fn metric_label(&self) -> &'static str {
        match self {
            RefreshError::Sync(_) => "sync_error",
            RefreshError::Load(_) => "load_error",
            RefreshError::Interrupted(_) => "interrupted",
        }
    }
}

/// Outcome of a successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub entries: usize,
    pub generation: u64,
}

/// The active index together with when it was published.
#[derive(Debug)]
pub struct Snapshot {
    pub index: Index,
    /// 1 for the bootstrap index, incremented on every successful refresh.
    pub generation: u64,
    pub loaded_at: SystemTime,
}

/// Holds the active index and serves lookups against it.
pub struct ConfigStore {
    mirror: Arc<dyn Mirror>,
    active: ArcSwap<Snapshot>,
    refresh_lock: Arc<Mutex<()>>,
}

impl ConfigStore {
    /// Perform the initial sync + load and build the store.
    ///
    /// Failure here is meant to be fatal: there is no index to serve.
    pub async fn bootstrap(mirror: Arc<dyn Mirror>) -> Result<Self, RefreshError> {
        let started = Instant::now();
        let job_mirror = Arc::clone(&mirror);
        let index = tokio::task::spawn_blocking(move || sync_and_load(job_mirror.as_ref())).await??;

        metrics::record_refresh("ok", started);
        metrics::record_index_size(index.len());
        tracing::info!(
            entries = index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Initial index loaded"
        );

        Ok(Self {
            mirror,
            active: ArcSwap::from_pointee(Snapshot {
                index,
                generation: 1,
                loaded_at: SystemTime::now(),
            }),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Re-sync the mirror and atomically replace the active index.
    ///
    /// Concurrent calls queue up and run one after another.
    pub async fn refresh(&self) -> Result<RefreshReport, RefreshError> {
        let guard = Arc::clone(&self.refresh_lock).lock_owned().await;
        let started = Instant::now();
        let mirror = Arc::clone(&self.mirror);

        let (guard, loaded) = tokio::task::spawn_blocking(move || {
            let loaded = sync_and_load(mirror.as_ref());
            (guard, loaded)
        })
        .await
        .map_err(|e| {
            metrics::record_refresh("interrupted", started);
            RefreshError::Interrupted(e)
        })?;

        let index = match loaded {
            Ok(index) => index,
            Err(e) => {
                metrics::record_refresh(e.metric_label(), started);
                tracing::warn!(error = %e, "Refresh failed, keeping current index");
                return Err(e);
            }
        };

        let report = RefreshReport {
            entries: index.len(),
            generation: self.active.load().generation + 1,
        };
        self.active.store(Arc::new(Snapshot {
            index,
            generation: report.generation,
            loaded_at: SystemTime::now(),
        }));
        drop(guard);

        metrics::record_refresh("ok", started);
        metrics::record_index_size(report.entries);
        tracing::info!(
            entries = report.entries,
            generation = report.generation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Index refreshed"
        );
        Ok(report)
    }

    /// Look up `url` and read its configuration file.
    pub async fn resolve(&self, url: &str) -> LookupOutcome {
        let snapshot = self.active.load_full();
        let outcome = self.resolve_in(&snapshot.index, url).await;
        metrics::record_lookup(outcome.metric_label());
        outcome
    }

    async fn resolve_in(&self, index: &Index, url: &str) -> LookupOutcome {
        let Some(filename) = index.get(url) else {
            tracing::debug!(url = %url, "Repository not registered, default applies");
            return LookupOutcome::NotRegistered;
        };

        let Some(path) = contained_path(self.mirror.root(), filename) else {
            tracing::warn!(url = %url, file = %filename, "Registered file escapes the mirror root");
            return LookupOutcome::FileUnavailable;
        };

        let target = match canonical_within(self.mirror.root(), &path).await {
            Ok(Some(target)) => target,
            Ok(None) => {
                tracing::warn!(url = %url, file = %filename, "Registered file links outside the mirror root");
                return LookupOutcome::FileUnavailable;
            }
            Err(e) => {
                tracing::warn!(url = %url, file = %filename, error = %e, "Registered file unreadable, default applies");
                return LookupOutcome::FileUnavailable;
            }
        };

        match tokio::fs::read_to_string(&target).await {
            Ok(content) => {
                tracing::debug!(url = %url, file = %filename, "Serving registered configuration");
                LookupOutcome::Found(content)
            }
            Err(e) => {
                tracing::warn!(url = %url, file = %filename, error = %e, "Registered file unreadable, default applies");
                LookupOutcome::FileUnavailable
            }
        }
    }

    /// The currently active snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.active.load_full()
    }

    pub fn mirror_root(&self) -> &Path {
        self.mirror.root()
    }
}

fn sync_and_load(mirror: &dyn Mirror) -> Result<Index, RefreshError> {
    mirror.sync()?;
    Ok(index::load(mirror.root())?)
}

/// Join `filename` onto `root`, refusing components that leave it lexically.
/// Symlinks are checked separately by `canonical_within`.
fn contained_path(root: &Path, filename: &str) -> Option<PathBuf> {
    let relative = Path::new(filename);
    let mut has_file = false;
    for component in relative.components() {
        match component {
            Component::Normal(_) => has_file = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    has_file.then(|| root.join(relative))
}

/// Resolve symlinks in `path`; `None` if the result is outside `root`.
async fn canonical_within(root: &Path, path: &Path) -> io::Result<Option<PathBuf>> {
    let root = tokio::fs::canonicalize(root).await?;
    let target = tokio::fs::canonicalize(path).await?;
    Ok(target.starts_with(&root).then_some(target))
}
