//! # Product Image Generation
//!
//! Fire-and-forget image generation for newly added products.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Image Generation Pipeline                           │
//! │                                                                         │
//! │  Session::add_product                                                   │
//! │       │  insert with image_pending = true                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  spawn_generation ──► ImageGenerator::generate(name)   (seconds)        │
//! │                              │                                          │
//! │                              ▼  ImagePatch { product_id, url }          │
//! │                        mpsc channel                                     │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  patch applier ──► Ledger::apply_product_image                          │
//! │       sets the URL (when Some), always clears image_pending,            │
//! │       no-op when the product was deleted mid-flight                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Results are keyed by product id, not by position, so deletions and
//! concurrent regenerations resolve safely: last write wins, a missing id
//! drops the result on the floor.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::SharedLedger;

/// Boxed future returned by [`ImageGenerator::generate`].
pub type ImageFuture<'a> = Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;

/// The external image service boundary.
///
/// Implementations typically wrap an HTTP call to an image model. The
/// future is boxed so generators can live behind a trait object inside
/// the session.
pub trait ImageGenerator: Send + Sync {
    /// Produces an image URL for the given product name.
    ///
    /// `None` means generation failed or produced nothing usable; the
    /// product keeps its placeholder and the pending flag is cleared.
    fn generate<'a>(&'a self, product_name: &'a str) -> ImageFuture<'a>;
}

/// Outcome of one generation task, addressed to a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePatch {
    pub product_id: String,
    pub image_url: Option<String>,
}

/// Spawns the task that applies generation outcomes to the ledger.
///
/// Runs until every sender (the session plus in-flight generation tasks)
/// is gone.
pub fn spawn_patch_applier(
    shared: SharedLedger,
    mut rx: mpsc::Receiver<ImagePatch>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(patch) = rx.recv().await {
            debug!(product_id = %patch.product_id, generated = patch.image_url.is_some(), "Applying image patch");
            shared.with_ledger_mut(|ledger| {
                ledger.apply_product_image(&patch.product_id, patch.image_url);
            });
        }
        debug!("Image patch applier stopped");
    })
}

/// Spawns one fire-and-forget generation task.
///
/// The session does not track the handle; a result arriving after the
/// channel closed is silently dropped.
pub fn spawn_generation(
    generator: Arc<dyn ImageGenerator>,
    product_id: String,
    product_name: String,
    tx: mpsc::Sender<ImagePatch>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let image_url = generator.generate(&product_name).await;
        let patch = ImagePatch {
            product_id,
            image_url,
        };
        if tx.send(patch).await.is_err() {
            debug!("Image patch channel closed, dropping result");
        }
    })
}
