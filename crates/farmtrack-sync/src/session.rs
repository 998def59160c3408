//! # Session Façade
//!
//! One object that owns a running FarmTrack session: the shared ledger,
//! the sync agent, the remote listener, and the image pipeline.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Session Wiring                                 │
//! │                                                                         │
//! │   AppConfig ──► Backend (Local when offline, Remote otherwise)          │
//! │                                                                         │
//! │   Startup order:                                                        │
//! │     1. create SharedLedger (empty)                                      │
//! │     2. spawn SyncAgent        (subscribes before anything bumps)        │
//! │     3. hydrate from storage   (the bump the agent absorbs)              │
//! │     4. start watch + listener (remote backend only)                     │
//! │     5. start image applier                                              │
//! │                                                                         │
//! │   Shutdown order: stop inbound flows (watch, listener, applier),        │
//! │   then the agent, which flushes unsaved changes on its way out.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use farmtrack_core::{Ledger, Product};
use farmtrack_store::{Backend, LocalStore, RemoteStore, SnapshotStore};

use crate::agent::{SyncAgent, SyncAgentHandle, SyncEventSink, SyncStatus};
use crate::bootstrap;
use crate::config::AppConfig;
use crate::error::SyncResult;
use crate::images::{self, ImageGenerator, ImagePatch};
use crate::state::SharedLedger;

/// Builds the backend the config names.
fn build_backend(config: &AppConfig) -> SyncResult<Backend> {
    if config.offline {
        Ok(Backend::Local(LocalStore::new(config.resolve_data_dir())))
    } else {
        let store = RemoteStore::new(config.remote_config())?;
        Ok(Backend::Remote(store))
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Assembles a [`Session`] with optional substitutions for tests and
/// embedding: an explicit backend, an image generator, a status sink.
pub struct SessionBuilder {
    config: AppConfig,
    backend: Option<Backend>,
    generator: Option<Arc<dyn ImageGenerator>>,
    sink: Option<Arc<dyn SyncEventSink>>,
}

impl SessionBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            backend: None,
            generator: None,
            sink: None,
        }
    }

    /// Uses this backend instead of the one the config would build.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Enables product image generation through this generator.
    pub fn image_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Forwards sync status transitions to this sink.
    pub fn event_sink(mut self, sink: Arc<dyn SyncEventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validates the config, hydrates, and starts every background task.
    pub async fn start(self) -> SyncResult<Session> {
        let SessionBuilder {
            config,
            backend,
            generator,
            sink,
        } = self;

        config.validate()?;
        let backend = match backend {
            Some(backend) => backend,
            None => build_backend(&config)?,
        };
        info!(
            backend = %backend.describe(),
            offline = config.offline,
            "Starting session"
        );

        let shared = SharedLedger::new(Ledger::new());

        let mut agent = SyncAgent::new(backend.clone(), shared.clone(), &config);
        if let Some(sink) = sink {
            agent = agent.with_sink(sink);
        }
        let agent = agent.spawn();

        if let Err(err) = bootstrap::hydrate(&shared, &backend).await {
            warn!(error = %err, "Hydration failed, starting with an empty ledger");
        }

        let (watch_task, listener_task) = {
            let (tx, rx) = mpsc::channel(8);
            match backend.watch(tx) {
                Some(handle) => (
                    Some(handle),
                    Some(bootstrap::spawn_remote_listener(shared.clone(), rx)),
                ),
                None => (None, None),
            }
        };

        let (image_tx, image_rx) = mpsc::channel(16);
        let applier_task = images::spawn_patch_applier(shared.clone(), image_rx);

        Ok(Session {
            config,
            shared,
            agent,
            watch_task,
            listener_task,
            applier_task,
            image_tx,
            generator,
        })
    }
}

// =============================================================================
// Session
// =============================================================================

/// A running FarmTrack session.
///
/// Reads and mutations go through [`Session::ledger`]; persistence,
/// remote changes, and image generation happen in the background.
pub struct Session {
    config: AppConfig,
    shared: SharedLedger,
    agent: SyncAgentHandle,
    watch_task: Option<JoinHandle<()>>,
    listener_task: Option<JoinHandle<()>>,
    applier_task: JoinHandle<()>,
    image_tx: mpsc::Sender<ImagePatch>,
    generator: Option<Arc<dyn ImageGenerator>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Starts a session with the backend the config names and no extras.
    pub async fn start(config: AppConfig) -> SyncResult<Self> {
        SessionBuilder::new(config).start().await
    }

    /// The shared ledger handle.
    pub fn ledger(&self) -> &SharedLedger {
        &self.shared
    }

    /// The configuration this session was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current persistence status for the save indicator.
    pub async fn status(&self) -> SyncStatus {
        self.agent.status().await
    }

    /// Adds a product, kicking off image generation when a generator is
    /// configured and the product has no image yet.
    ///
    /// ## Returns
    /// `false` when the catalog already has the name (case-insensitive);
    /// nothing is inserted and no generation is started.
    pub fn add_product(&self, mut product: Product) -> bool {
        let wants_image = self.generator.is_some() && product.image_url.is_none();
        if wants_image {
            product.image_pending = true;
        }
        let id = product.id.clone();
        let name = product.name.clone();

        let inserted = self
            .shared
            .with_ledger_mut(|ledger| ledger.add_product(product));

        if inserted && wants_image {
            if let Some(generator) = &self.generator {
                images::spawn_generation(
                    Arc::clone(generator),
                    id,
                    name,
                    self.image_tx.clone(),
                );
            }
        }
        inserted
    }

    /// Re-runs image generation for an existing product.
    ///
    /// Returns `false` when no generator is configured or the product
    /// does not exist.
    pub fn regenerate_product_image(&self, product_id: &str) -> bool {
        let generator = match &self.generator {
            Some(generator) => Arc::clone(generator),
            None => return false,
        };

        let name = self
            .shared
            .with_ledger_mut(|ledger| ledger.request_product_image(product_id));

        match name {
            Some(name) => {
                images::spawn_generation(
                    generator,
                    product_id.to_string(),
                    name,
                    self.image_tx.clone(),
                );
                true
            }
            None => false,
        }
    }

    /// Full-ledger backup as pretty JSON.
    pub fn export_backup(&self) -> SyncResult<String> {
        let json = self
            .shared
            .with_ledger(|ledger| farmtrack_core::export_backup(ledger))?;
        Ok(json)
    }

    /// Restores a backup produced by [`Session::export_backup`].
    ///
    /// Parses fully before applying; malformed input changes nothing.
    pub fn import_backup(&self, json: &str) -> SyncResult<()> {
        self.shared
            .with_ledger_mut(|ledger| farmtrack_core::import_backup(ledger, json))?;
        Ok(())
    }

    /// Stops every background task, flushing unsaved changes first.
    pub async fn shutdown(self) {
        info!("Shutting down session");
        if let Some(task) = self.watch_task {
            task.abort();
        }
        if let Some(task) = self.listener_task {
            task.abort();
        }
        self.applier_task.abort();
        self.agent.shutdown().await;
        info!("Session closed");
    }
}

// =============================================================================
// Tests
// =============================================================================
