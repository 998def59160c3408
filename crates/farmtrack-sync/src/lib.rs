//! # farmtrack-sync: Session & Sync Layer for FarmTrack
//!
//! This crate wires the pure ledger to a storage backend and keeps the two
//! converged in the background, so the UI works against memory and never
//! waits on persistence.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     Session (Main Orchestrator)                  │  │
//! │  │                                                                  │  │
//! │  │  Builds the backend from config, hydrates, starts every          │  │
//! │  │  background task, exposes the ledger handle and status           │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │  SharedLedger  │  │   SyncAgent    │  │  Remote listener       │    │
//! │  │                │  │                │  │                        │    │
//! │  │ RwLock ledger  │  │ Debounced      │  │ Applies watched        │    │
//! │  │ + revision     │  │ write-behind,  │  │ document changes,      │    │
//! │  │ watch channel  │  │ status machine │  │ drops own echoes       │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │   AppConfig    │  │  Image tasks   │                                │
//! │  │                │  │                │                                │
//! │  │ TOML file +    │  │ Fire-and-forget│                                │
//! │  │ FARMTRACK_*    │  │ generation,    │                                │
//! │  │ env overrides  │  │ id-keyed apply │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`agent`] - Debounced sync agent and the status machine
//! - [`bootstrap`] - Hydration and the remote change listener
//! - [`config`] - TOML configuration with env overrides
//! - [`error`] - Sync error types
//! - [`images`] - Product image generation pipeline
//! - [`session`] - The session façade
//! - [`state`] - The shared ledger handle
//!
//! ## Usage
//!
//! ```rust,ignore
//! use farmtrack_sync::{AppConfig, Session};
//!
//! let config = AppConfig::load_or_default(None);
//! let session = Session::start(config).await?;
//!
//! session.ledger().with_ledger_mut(|ledger| {
//!     ledger.add_customer(customer);
//! });
//!
//! // The agent flushes in the background; shut down cleanly when done.
//! session.shutdown().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod images;
pub mod session;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::{NoOpSink, SyncAgent, SyncAgentHandle, SyncEventSink, SyncStatus};
pub use config::{AppConfig, RemoteSettings, SyncSettings};
pub use error::{SyncError, SyncResult};
pub use images::{ImageGenerator, ImagePatch};
pub use session::{Session, SessionBuilder};
pub use state::SharedLedger;
