//! # Session Bootstrap
//!
//! One-shot hydration from storage, plus the listener that folds remote
//! document changes into the shared ledger.
//!
//! ## Startup Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session Startup                                 │
//! │                                                                         │
//! │   Backend::load()                                                       │
//! │        │                                                                │
//! │        ├── Some(patch) ──► record stamp ──► apply to ledger ──► bump   │
//! │        │                                                                │
//! │        ├── None ───────────────────────────────────────────────► bump   │
//! │        │                                                                │
//! │        └── Err ────────── logged by caller ────────────────────► bump   │
//! │                                                                         │
//! │   The bump is the mount signal; the agent absorbs exactly one.         │
//! │                                                                         │
//! │   Afterwards (remote backend only):                                     │
//! │     Backend::watch() ──► mpsc ──► listener ──► stamp guard ──► apply   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Echo Guard
//!
//! The agent's own writes come back through the poll loop with the stamp
//! the server acked. The listener drops any document whose stamp is at or
//! below the recorded sync cursor, so only foreign writes reach the ledger.
//! A foreign write that does get applied bumps the revision and is flushed
//! back out once, which re-stamps the merged state under this device.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use farmtrack_core::SnapshotPatch;
use farmtrack_store::{Backend, SnapshotStore};

use crate::error::SyncResult;
use crate::state::SharedLedger;

/// Loads the stored document and applies it to the ledger.
///
/// Bumps the revision exactly once in every outcome, including failure,
/// so the agent's hydration guard always has a signal to absorb. Returns
/// whether a document was found.
pub async fn hydrate(shared: &SharedLedger, backend: &Backend) -> SyncResult<bool> {
    match backend.load().await {
        Ok(Some(patch)) => {
            if let Some(stamp) = patch.last_updated {
                shared.record_synced(stamp);
            }
            shared.with_ledger_mut(|ledger| patch.apply_to(ledger));
            info!(backend = %backend.describe(), "Hydrated ledger from storage");
            Ok(true)
        }
        Ok(None) => {
            shared.bump_revision();
            info!(backend = %backend.describe(), "No stored document, starting fresh");
            Ok(false)
        }
        Err(err) => {
            shared.bump_revision();
            Err(err.into())
        }
    }
}

/// Spawns the task that applies watched document changes to the ledger.
///
/// Runs until the sending side (the backend's watch loop) goes away.
pub fn spawn_remote_listener(
    shared: SharedLedger,
    mut rx: mpsc::Receiver<SnapshotPatch>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(patch) = rx.recv().await {
            let stamp = patch.last_updated.unwrap_or(0);
            if stamp <= shared.last_synced() {
                debug!(stamp, "Ignoring document echo");
                continue;
            }
            shared.record_synced(stamp);
            shared.with_ledger_mut(|ledger| patch.apply_to(ledger));
            info!(stamp, "Applied remote document change");
        }
        debug!("Remote listener stopped");
    })
}
