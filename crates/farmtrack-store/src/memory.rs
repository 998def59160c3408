//! # In-Memory Store
//!
//! A snapshot cell with injectable failures. Backs agent and bootstrap tests
//! and the seed binary's dry-run mode; never used in a real session.
//!
//! Clones share the same cell, so a test can keep one handle for assertions
//! while the backend under test owns another.

use std::sync::{Arc, Mutex, MutexGuard};

use farmtrack_core::{Snapshot, SnapshotPatch};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{StoreError, StoreResult};
use crate::store::SnapshotStore;

#[derive(Debug, Default)]
struct Inner {
    document: Option<Snapshot>,
    fail_loads: bool,
    fail_saves: bool,
    load_count: usize,
    save_count: usize,
}

/// Shared in-memory snapshot store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Creates a store pre-seeded with a document.
    pub fn with_document(snapshot: Snapshot) -> Self {
        let store = MemoryStore::new();
        store.lock().document = Some(snapshot);
        store
    }

    /// Makes every subsequent load fail until cleared.
    pub fn set_fail_loads(&self, fail: bool) {
        self.lock().fail_loads = fail;
    }

    /// Makes every subsequent save fail until cleared.
    pub fn set_fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    /// The currently stored document, if any.
    pub fn document(&self) -> Option<Snapshot> {
        self.lock().document.clone()
    }

    /// Number of save attempts, including failed ones.
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    /// Number of load attempts, including failed ones.
    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("Memory store mutex poisoned")
    }
}

impl SnapshotStore for MemoryStore {
    async fn load(&self) -> StoreResult<Option<SnapshotPatch>> {
        let mut inner = self.lock();
        inner.load_count += 1;
        if inner.fail_loads {
            return Err(StoreError::unavailable("injected load failure"));
        }
        Ok(inner.document.clone().map(SnapshotPatch::from))
    }

    async fn save(&self, snapshot: &Snapshot) -> StoreResult<i64> {
        let mut inner = self.lock();
        inner.save_count += 1;
        if inner.fail_saves {
            return Err(StoreError::unavailable("injected save failure"));
        }
        inner.document = Some(snapshot.clone());
        Ok(snapshot.last_updated)
    }

    fn watch(&self, _tx: mpsc::Sender<SnapshotPatch>) -> Option<JoinHandle<()>> {
        None
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
