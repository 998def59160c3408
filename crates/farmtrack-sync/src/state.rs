//! # Shared Ledger Handle
//!
//! The single in-memory ledger shared between the UI-facing session API,
//! the sync agent, and the remote change listener.
//!
//! ## Change Propagation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SharedLedger Internals                           │
//! │                                                                         │
//! │   with_ledger_mut(f)                                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────────────┐   bump after the    ┌──────────────────────────┐ │
//! │   │ RwLock<Ledger>   │   lock is released  │ watch channel (revision) │ │
//! │   │                  │────────────────────►│                          │ │
//! │   │ readers see all  │                     │ sync agent debounces on  │ │
//! │   │ or nothing of f  │                     │ every bump               │ │
//! │   └──────────────────┘                     └──────────────────────────┘ │
//! │                                                                         │
//! │   last_synced (AtomicI64): highest lastUpdated stamp known to be        │
//! │   persisted; the remote listener drops documents at or below it         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutation closures are synchronous and never await, so a std `RwLock` is
//! the right tool; nothing holds the guard across a suspension point.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use farmtrack_core::{Ledger, Snapshot};

/// Cloneable handle to the session's ledger.
///
/// Every clone refers to the same ledger, revision channel, and sync
/// cursor; cloning is how the agent, listener, and session API share state.
#[derive(Clone)]
pub struct SharedLedger {
    ledger: Arc<RwLock<Ledger>>,
    revision: watch::Sender<u64>,
    last_synced: Arc<AtomicI64>,
}

impl SharedLedger {
    /// Wraps a ledger. The revision counter starts at 0 with no change
    /// recorded; subscribers only wake on later bumps.
    pub fn new(ledger: Ledger) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            revision,
            last_synced: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Runs a closure against the ledger under the read lock.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        let guard = self.ledger.read().expect("Ledger lock poisoned");
        f(&guard)
    }

    /// Runs a closure against the ledger under the write lock, then bumps
    /// the revision counter.
    ///
    /// The bump happens after the guard is dropped, so by the time the sync
    /// agent wakes and takes its read lock the mutation is fully visible.
    pub fn with_ledger_mut<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        let result = {
            let mut guard = self.ledger.write().expect("Ledger lock poisoned");
            f(&mut guard)
        };
        self.bump_revision();
        result
    }

    /// Signals a revision without touching the ledger.
    ///
    /// Hydration uses this as its mount signal when storage was empty, so
    /// the agent's first-change guard fires exactly once either way.
    pub fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Subscribes to revision bumps. The current revision counts as seen.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision counter value.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Captures a full snapshot of the current ledger state.
    pub fn snapshot(&self, last_updated: i64) -> Snapshot {
        self.with_ledger(|ledger| Snapshot::capture(ledger, last_updated))
    }

    /// Highest `lastUpdated` stamp known to be persisted.
    pub fn last_synced(&self) -> i64 {
        self.last_synced.load(Ordering::SeqCst)
    }

    /// Records a persisted stamp. Monotonic; an older stamp never lowers
    /// the cursor, regardless of which task reports last.
    pub fn record_synced(&self, stamp: i64) {
        self.last_synced.fetch_max(stamp, Ordering::SeqCst);
    }
}
