//! # farmtrack-store: Persistence Backends for FarmTrack
//!
//! This crate moves whole-ledger snapshots between memory and durable
//! storage. It knows nothing about debouncing, status badges, or when a
//! save should happen; that lives in `farmtrack-sync`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        FarmTrack Data Flow                              │
//! │                                                                         │
//! │  Sync agent (farmtrack-sync)                                           │
//! │       │  load / save / watch                                            │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   farmtrack-store (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐   │   │
//! │  │   │  LocalStore  │   │ RemoteStore  │   │   MemoryStore    │   │   │
//! │  │   │  (local.rs)  │   │ (remote.rs)  │   │   (memory.rs)    │   │   │
//! │  │   │              │   │              │   │                  │   │   │
//! │  │   │ JSON file,   │   │ reqwest,     │   │ Failure          │   │   │
//! │  │   │ atomic write │   │ poll watch   │   │ injection        │   │   │
//! │  │   └──────────────┘   └──────────────┘   └──────────────────┘   │   │
//! │  │           dispatched through the Backend enum (store.rs)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                          │                                      │
//! │       ▼                          ▼                                      │
//! │  <data_dir>/                {base}/v1/ledgers/{user}                    │
//! │  farmtrack_local_data.json  (per-user document API)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `SnapshotStore` trait and `Backend` dispatch
//! - [`local`] - Atomic JSON file store (offline mode)
//! - [`remote`] - Remote document client with polling watch
//! - [`memory`] - In-memory store for tests and dry runs
//! - [`error`] - Store error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod local;
pub mod memory;
pub mod remote;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use local::{LocalStore, LOCAL_SNAPSHOT_FILE};
pub use memory::MemoryStore;
pub use remote::{RemoteConfig, RemoteStore};
pub use store::{Backend, SnapshotStore};
