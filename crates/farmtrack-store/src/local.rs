//! # Local File Store
//!
//! Offline-mode persistence: the whole ledger as one JSON document in the
//! local data directory.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Atomic Snapshot Write                                │
//! │                                                                         │
//! │  1. serialize snapshot → JSON                                           │
//! │  2. write  <data_dir>/farmtrack_local_data.json.tmp                     │
//! │  3. rename <…>.json.tmp → <…>.json   (atomic on the same filesystem)   │
//! │                                                                         │
//! │  A crash between 2 and 3 leaves the previous snapshot intact; the      │
//! │  orphaned temp file is overwritten on the next save.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The file name matches the storage key the app has always used, so an
//! existing device keeps its data across upgrades.

use std::io;
use std::path::{Path, PathBuf};

use farmtrack_core::{Snapshot, SnapshotPatch};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::SnapshotStore;

/// Fixed snapshot file name inside the data directory.
pub const LOCAL_SNAPSHOT_FILE: &str = "farmtrack_local_data.json";

/// File-backed snapshot store for offline mode.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Creates a store writing `farmtrack_local_data.json` under `data_dir`.
    ///
    /// The directory is created on first save, not here; a read-only
    /// misconfiguration surfaces as a save error rather than a construction
    /// failure.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let mut path = data_dir.into();
        path.push(LOCAL_SNAPSHOT_FILE);
        LocalStore { path }
    }

    /// Full path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for LocalStore {
    async fn load(&self) -> StoreResult<Option<SnapshotPatch>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let patch: SnapshotPatch = serde_json::from_str(&contents)?;
                debug!(path = %self.path.display(), "Local snapshot loaded");
                Ok(Some(patch))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> StoreResult<i64> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json.as_bytes()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            path = %self.path.display(),
            bytes = json.len(),
            last_updated = snapshot.last_updated,
            "Local snapshot written"
        );
        Ok(snapshot.last_updated)
    }

    /// The local file has no external writers to watch.
    fn watch(&self, _tx: mpsc::Sender<SnapshotPatch>) -> Option<JoinHandle<()>> {
        None
    }

    fn describe(&self) -> String {
        format!("local file {}", self.path.display())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
