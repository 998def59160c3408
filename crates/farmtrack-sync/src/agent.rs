//! # Sync Agent
//!
//! Debounced write-behind persistence with a UI-facing status machine.
//!
//! ## Status Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sync Agent Status Machine                          │
//! │                                                                         │
//! │  Remote backend:                                                        │
//! │                                                                         │
//! │   ┌──────┐  revision bump   ┌─────────┐  debounce   ┌────────┐         │
//! │   │ Idle │─────────────────►│ (quiet  │────────────►│ Saving │         │
//! │   └──────┘                  │ window) │             └───┬────┘         │
//! │      ▲                      └─────────┘                 │              │
//! │      │                                          ok      │   error      │
//! │      │        hold elapses   ┌────────┐◄────────────────┤              │
//! │      ├──────────────────────│ Saved  │                  │              │
//! │      │                       └────────┘                 ▼              │
//! │      │        hold elapses   ┌─────────┐         ┌─────────┐           │
//! │      └──────────────────────│ Offline │◄────────│ (logged, │           │
//! │                              └─────────┘         │ dropped) │           │
//! │                                                  └─────────┘           │
//! │                                                                         │
//! │  Local backend: Idle → Offline → Idle (the file write itself is the    │
//! │  "save"; the Offline chip tells the user nothing reached the server)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Debounce
//!
//! Every revision bump restarts the quiet window, so a burst of edits
//! produces exactly one write carrying the final state. Failed writes are
//! logged and dropped; the ledger stays authoritative in memory and the
//! next edit retries naturally.
//!
//! ## Hydration Guard
//!
//! Session startup applies the stored document to the ledger, which bumps
//! the revision like any other mutation. The agent treats the first bump
//! after spawn as that mount signal and does not write it back; flushing
//! it would stamp the document without any user change.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use ts_rs::TS;

use farmtrack_store::{Backend, SnapshotStore};

use crate::config::AppConfig;
use crate::state::SharedLedger;

// =============================================================================
// Status
// =============================================================================

/// Persistence status shown by the save indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SyncStatus {
    /// Nothing to write.
    #[default]
    Idle,
    /// A remote write is in flight.
    Saving,
    /// The last write reached the server; held briefly for the UI.
    Saved,
    /// Changes live locally only: offline mode, or the last write failed.
    Offline,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Saving => "saving",
            SyncStatus::Saved => "saved",
            SyncStatus::Offline => "offline",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Event Sink
// =============================================================================

/// Receiver for status transitions, typically bridged to frontend events.
pub trait SyncEventSink: Send + Sync {
    /// Called on every status transition, outside any lock.
    fn status_changed(&self, status: SyncStatus);
}

/// Sink that ignores everything. The default when no frontend is attached.
#[derive(Debug, Default)]
pub struct NoOpSink;

impl SyncEventSink for NoOpSink {
    fn status_changed(&self, _status: SyncStatus) {}
}

// =============================================================================
// Sync Agent
// =============================================================================

/// Background task that keeps the storage backend converged with the
/// shared ledger.
///
/// Construct with [`SyncAgent::new`], optionally attach a sink, then call
/// [`SyncAgent::spawn`]. The returned handle outlives the agent value.
pub struct SyncAgent {
    backend: Backend,
    shared: SharedLedger,
    debounce: Duration,
    saved_hold: Duration,
    offline_hold: Duration,
    status: Arc<RwLock<SyncStatus>>,
    sink: Arc<dyn SyncEventSink>,
}

impl SyncAgent {
    /// Creates an agent over the given backend with the config's timings.
    pub fn new(backend: Backend, shared: SharedLedger, config: &AppConfig) -> Self {
        Self {
            backend,
            shared,
            debounce: config.debounce(),
            saved_hold: config.saved_hold(),
            offline_hold: config.offline_hold(),
            status: Arc::new(RwLock::new(SyncStatus::Idle)),
            sink: Arc::new(NoOpSink),
        }
    }

    /// Replaces the default no-op sink.
    pub fn with_sink(mut self, sink: Arc<dyn SyncEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Starts the agent task.
    ///
    /// The revision subscription is taken here, synchronously, so a
    /// hydration bump issued right after this call is always observed.
    pub fn spawn(self) -> SyncAgentHandle {
        let revision_rx = self.shared.subscribe();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let status = Arc::clone(&self.status);

        info!(backend = %self.backend.describe(), "Starting sync agent");
        let task = tokio::spawn(self.run(revision_rx, shutdown_rx));

        SyncAgentHandle {
            status,
            shutdown_tx,
            task,
        }
    }

    // =========================================================================
    // Main Loop
    // =========================================================================

    async fn run(
        self,
        mut revision_rx: watch::Receiver<u64>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        // Revision at spawn time. The first bump past this is the hydration
        // mount signal; anything beyond it carries real edits.
        let baseline = *revision_rx.borrow();
        let mut hydration_seen = false;
        let mut pending = false;
        let mut stopping = false;

        while !stopping {
            // Phase 1: wait for a change.
            if !pending {
                tokio::select! {
                    changed = revision_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let revision = *revision_rx.borrow();
                        if !hydration_seen {
                            hydration_seen = true;
                            if revision <= baseline + 1 {
                                debug!(revision, "Absorbed hydration revision");
                                continue;
                            }
                        }
                        pending = true;
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }

            // Phase 2: debounce. Every further bump restarts the window.
            loop {
                tokio::select! {
                    _ = sleep(self.debounce) => break,
                    changed = revision_rx.changed() => {
                        if changed.is_err() {
                            stopping = true;
                            break;
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        stopping = true;
                        break;
                    }
                }
            }
            if stopping {
                break;
            }

            // Phase 3: flush, then hold the resulting status for the UI.
            let outcome = self.flush().await;
            pending = false;

            let hold = match outcome {
                SyncStatus::Saved => self.saved_hold,
                _ => self.offline_hold,
            };
            tokio::select! {
                _ = sleep(hold) => {}
                changed = revision_rx.changed() => {
                    if changed.is_ok() {
                        pending = true;
                    }
                }
                _ = shutdown_rx.recv() => stopping = true,
            }
            self.set_status(SyncStatus::Idle).await;
        }

        if pending {
            debug!("Flushing unsaved changes before shutdown");
            self.flush().await;
            self.set_status(SyncStatus::Idle).await;
        }
        info!("Sync agent stopped");
    }

    /// Captures the full ledger state and writes it through the backend.
    ///
    /// Returns the status the write ended in so the caller can pick the
    /// hold duration. Failures are logged and dropped; the ledger stays
    /// authoritative in memory and the next edit retries naturally.
    async fn flush(&self) -> SyncStatus {
        let stamp = Utc::now().timestamp_millis();
        let snapshot = self.shared.snapshot(stamp);

        if !self.backend.is_local() {
            self.set_status(SyncStatus::Saving).await;
        }

        match self.backend.save(&snapshot).await {
            Ok(acked) => {
                self.shared.record_synced(acked);
                let status = if self.backend.is_local() {
                    SyncStatus::Offline
                } else {
                    SyncStatus::Saved
                };
                debug!(stamp = acked, backend = %self.backend.describe(), "Snapshot persisted");
                self.set_status(status).await;
                status
            }
            Err(err) => {
                error!(
                    error = %err,
                    backend = %self.backend.describe(),
                    "Failed to persist snapshot, changes stay in memory"
                );
                self.set_status(SyncStatus::Offline).await;
                SyncStatus::Offline
            }
        }
    }

    async fn set_status(&self, status: SyncStatus) {
        let mut guard = self.status.write().await;
        if *guard != status {
            *guard = status;
            drop(guard);
            debug!(status = %status, "Sync status changed");
            self.sink.status_changed(status);
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Control handle for a running sync agent.
pub struct SyncAgentHandle {
    status: Arc<RwLock<SyncStatus>>,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SyncAgentHandle {
    /// Current persistence status.
    pub async fn status(&self) -> SyncStatus {
        *self.status.read().await
    }

    /// Stops the agent, flushing unsaved changes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(err) = self.task.await {
            warn!(error = %err, "Sync agent task ended abnormally");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use farmtrack_core::{Customer, Ledger, Money, Product, ProductCategory};
    use farmtrack_store::MemoryStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<SyncStatus>>,
    }

    impl SyncEventSink for RecordingSink {
        fn status_changed(&self, status: SyncStatus) {
            self.events.lock().expect("events lock").push(status);
        }
    }

    fn spawn_agent(store: &MemoryStore, shared: &SharedLedger) -> SyncAgentHandle {
        SyncAgent::new(
            Backend::Memory(store.clone()),
            shared.clone(),
            &AppConfig::default(),
        )
        .spawn()
    }

    async fn absorb_hydration(shared: &SharedLedger) {
        shared.bump_revision();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    fn product(name: &str) -> Product {
        Product::new(
            name,
            Money::from_minor(4_500),
            ProductCategory::Vegetables,
            "kg",
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_flushes_once() {
        let store = MemoryStore::new();
        let shared = SharedLedger::new(Ledger::new());
        let handle = spawn_agent(&store, &shared);
        absorb_hydration(&shared).await;

        for i in 0..10 {
            shared.with_ledger_mut(|ledger| {
                ledger.add_product(product(&format!("Product {i}")));
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        // Quiet window elapses once, after the last edit
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(store.save_count(), 1);
        let doc = store.document().unwrap();
        assert_eq!(doc.products.len(), 10);

        handle.shutdown().await;
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hydration_revision_not_written_back() {
        let store = MemoryStore::new();
        let shared = SharedLedger::new(Ledger::new());
        let handle = spawn_agent(&store, &shared);

        shared.bump_revision();
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(store.save_count(), 0);

        shared.with_ledger_mut(|ledger| {
            ledger.add_customer(Customer::new("Asha Gurung", "9800000001"));
        });
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(store.save_count(), 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_coalesced_with_hydration_still_flushes() {
        let store = MemoryStore::new();
        let shared = SharedLedger::new(Ledger::new());
        let handle = spawn_agent(&store, &shared);

        // Bump and edit land before the agent's first poll; the single
        // wake carries both, and the edit must not be swallowed.
        shared.bump_revision();
        shared.with_ledger_mut(|ledger| {
            ledger.add_product(product("Kale"));
        });

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.document().unwrap().products.len(), 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_cycle_for_acknowledged_save() {
        let store = MemoryStore::new();
        let shared = SharedLedger::new(Ledger::new());
        let sink = Arc::new(RecordingSink::default());
        let handle = SyncAgent::new(
            Backend::Memory(store.clone()),
            shared.clone(),
            &AppConfig::default(),
        )
        .with_sink(sink.clone())
        .spawn();

        assert_eq!(handle.status().await, SyncStatus::Idle);
        absorb_hydration(&shared).await;

        shared.with_ledger_mut(|ledger| {
            ledger.add_customer(Customer::new("Asha Gurung", "9800000001"));
        });

        // Just past the debounce: the write is done, Saved is being held
        tokio::time::sleep(Duration::from_millis(1_050)).await;
        assert_eq!(handle.status().await, SyncStatus::Saved);

        // Hold expires, back to Idle
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(handle.status().await, SyncStatus::Idle);

        let events = sink.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![SyncStatus::Saving, SyncStatus::Saved, SyncStatus::Idle]
        );

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_goes_offline_and_recovers() {
        let store = MemoryStore::new();
        store.set_fail_saves(true);
        let shared = SharedLedger::new(Ledger::new());
        let handle = spawn_agent(&store, &shared);
        absorb_hydration(&shared).await;

        shared.with_ledger_mut(|ledger| {
            ledger.add_customer(Customer::new("Asha Gurung", "9800000001"));
        });
        tokio::time::sleep(Duration::from_millis(1_050)).await;
        assert_eq!(handle.status().await, SyncStatus::Offline);
        assert_eq!(store.save_count(), 1);
        assert!(store.document().is_none());

        // Next edit retries and succeeds
        store.set_fail_saves(false);
        shared.with_ledger_mut(|ledger| {
            ledger.add_customer(Customer::new("Bina Thapa", "9800000002"));
        });
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.document().unwrap().customers.len(), 2);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_changes() {
        let store = MemoryStore::new();
        let shared = SharedLedger::new(Ledger::new());
        let handle = spawn_agent(&store, &shared);
        absorb_hydration(&shared).await;

        shared.with_ledger_mut(|ledger| {
            ledger.add_customer(Customer::new("Asha Gurung", "9800000001"));
        });
        // Shut down well inside the quiet window
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.shutdown().await;

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.document().unwrap().customers.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_records_synced_stamp() {
        let store = MemoryStore::new();
        let shared = SharedLedger::new(Ledger::new());
        let handle = spawn_agent(&store, &shared);
        absorb_hydration(&shared).await;
        assert_eq!(shared.last_synced(), 0);

        shared.with_ledger_mut(|ledger| {
            ledger.add_product(product("Kale"));
        });
        tokio::time::sleep(Duration::from_millis(1_100)).await;

        let doc = store.document().unwrap();
        assert_eq!(shared.last_synced(), doc.last_updated);
        assert!(shared.last_synced() > 0);

        handle.shutdown().await;
    }
}
