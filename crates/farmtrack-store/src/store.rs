//! # Snapshot Store Trait
//!
//! The contract every persistence backend implements, plus the [`Backend`]
//! enum the sync layer dispatches through.
//!
//! ## Backend Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Backend Selection (once, at session start)           │
//! │                                                                         │
//! │  AppConfig.offline?                                                     │
//! │       │                                                                 │
//! │       ├── true  ──► Backend::Local   (JSON file in the data dir)       │
//! │       │                                                                 │
//! │       ├── false ──► Backend::Remote  (per-user document API)           │
//! │       │                                                                 │
//! │       └── tests ──► Backend::Memory  (failure injection)               │
//! │                                                                         │
//! │  The sync agent never asks which backend it holds; load/save/watch     │
//! │  behave identically apart from the watch being absent locally.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use farmtrack_core::{Snapshot, SnapshotPatch};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::StoreResult;
use crate::local::LocalStore;
use crate::memory::MemoryStore;
use crate::remote::RemoteStore;

// =============================================================================
// Snapshot Store Trait
// =============================================================================

/// Persistence contract for a single per-user snapshot document.
///
/// ## Semantics
/// - `load` returns `Ok(None)` when no document exists yet (fresh device or
///   fresh user); callers treat that as "start with an empty ledger".
/// - `save` writes the full snapshot and returns the authoritative
///   `lastUpdated` stamp: the snapshot's own for backends that store verbatim,
///   the server-assigned one for the remote API. The sync layer uses the
///   returned stamp to tell its own echoes apart from foreign writes.
/// - `watch` spawns a listener that forwards externally-changed documents.
///   Backends without live subscriptions return `None`.
#[allow(async_fn_in_trait)]
pub trait SnapshotStore {
    /// One-shot read of the stored document, if any.
    async fn load(&self) -> StoreResult<Option<SnapshotPatch>>;

    /// Full-snapshot write. Returns the authoritative `lastUpdated` stamp.
    async fn save(&self, snapshot: &Snapshot) -> StoreResult<i64>;

    /// Starts a change listener feeding `tx`, if the backend supports one.
    ///
    /// The task runs until the receiver is dropped or the handle is aborted.
    fn watch(&self, tx: mpsc::Sender<SnapshotPatch>) -> Option<JoinHandle<()>>;

    /// Short label for log lines.
    fn describe(&self) -> String;
}

// =============================================================================
// Backend Dispatch
// =============================================================================

/// The configured persistence backend.
///
/// Selection happens once at session start; everything downstream is
/// backend-agnostic. An enum rather than `Box<dyn ...>` keeps the async
/// trait object-safe-free and the dispatch visible.
#[derive(Clone)]
pub enum Backend {
    /// JSON file in the local data directory (offline mode).
    Local(LocalStore),
    /// Per-user remote document API (online mode).
    Remote(RemoteStore),
    /// In-memory cell (tests and dry runs).
    Memory(MemoryStore),
}

impl Backend {
    /// True when this backend persists across restarts without a network.
    pub fn is_local(&self) -> bool {
        matches!(self, Backend::Local(_))
    }
}

impl SnapshotStore for Backend {
    async fn load(&self) -> StoreResult<Option<SnapshotPatch>> {
        match self {
            Backend::Local(store) => store.load().await,
            Backend::Remote(store) => store.load().await,
            Backend::Memory(store) => store.load().await,
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> StoreResult<i64> {
        match self {
            Backend::Local(store) => store.save(snapshot).await,
            Backend::Remote(store) => store.save(snapshot).await,
            Backend::Memory(store) => store.save(snapshot).await,
        }
    }

    fn watch(&self, tx: mpsc::Sender<SnapshotPatch>) -> Option<JoinHandle<()>> {
        match self {
            Backend::Local(store) => store.watch(tx),
            Backend::Remote(store) => store.watch(tx),
            Backend::Memory(store) => store.watch(tx),
        }
    }

    fn describe(&self) -> String {
        match self {
            Backend::Local(store) => store.describe(),
            Backend::Remote(store) => store.describe(),
            Backend::Memory(store) => store.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_is_local() {
        let memory = Backend::Memory(MemoryStore::new());
        assert!(!memory.is_local());
    }

    #[tokio::test]
    async fn test_backend_dispatch_through_trait() {
        let backend = Backend::Memory(MemoryStore::new());
        assert_eq!(backend.describe(), "memory");
        assert!(backend.load().await.unwrap().is_none());
    }
}
