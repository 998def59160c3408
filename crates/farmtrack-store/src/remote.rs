//! # Remote Document Store
//!
//! HTTP client for the per-user snapshot document API.
//!
//! ## Wire Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Remote Document API                                  │
//! │                                                                         │
//! │  GET  {base}/v1/ledgers/{user}                                          │
//! │       200 → snapshot document (possibly partial)                       │
//! │       404 → no document yet (fresh user)                               │
//! │                                                                         │
//! │  PATCH {base}/v1/ledgers/{user}    body: full snapshot                  │
//! │       200 → { "lastUpdated": <server stamp> }                          │
//! │       Server merges fields; anything absent in the write survives.     │
//! │                                                                         │
//! │  WATCH (polling)                                                        │
//! │       GET every poll_interval; forward the document when its           │
//! │       lastUpdated advanced past the last one seen. Errors back off     │
//! │       exponentially and reset on the next success.                     │
//! │                                                                         │
//! │  Auth: optional bearer token on every request.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use farmtrack_core::{Snapshot, SnapshotPatch};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{StoreError, StoreResult};
use crate::store::SnapshotStore;

// =============================================================================
// Remote Configuration
// =============================================================================

/// Configuration for the remote document client.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Service base URL, e.g. `https://api.farmtrack.app`.
    pub base_url: String,

    /// Document owner; one document per user.
    pub user_id: String,

    /// Optional bearer token.
    pub auth_token: Option<String>,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Watch polling interval.
    pub poll_interval: Duration,

    /// Initial backoff after a failed poll.
    pub initial_backoff: Duration,

    /// Maximum backoff between polls.
    pub max_backoff: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: String::new(),
            user_id: String::new(),
            auth_token: None,
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(5),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

// =============================================================================
// Remote Store
// =============================================================================

/// Acknowledgement body returned by a merge-write.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveAck {
    last_updated: i64,
}

/// Client for one user's remote snapshot document.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    endpoint: Url,
    auth_token: Option<String>,
    poll_interval: Duration,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RemoteStore {
    /// Builds the client and resolves the document endpoint.
    ///
    /// ## Errors
    /// Returns [`StoreError::InvalidEndpoint`] when the base URL cannot be
    /// parsed, so a bad configuration fails at session start instead of on
    /// the first flush.
    pub fn new(config: RemoteConfig) -> StoreResult<Self> {
        // Normalize the trailing slash so a base with a path joins correctly
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base: Url = base.parse()?;
        let endpoint = base.join(&format!("v1/ledgers/{}", config.user_id))?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(RemoteStore {
            client,
            endpoint,
            auth_token: config.auth_token,
            poll_interval: config.poll_interval,
            initial_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
        })
    }

    /// The resolved document URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Polling loop behind [`SnapshotStore::watch`].
    ///
    /// Forwards the document whenever its `lastUpdated` advances past the
    /// last stamp seen here. The sync layer applies its own echo guard on
    /// top, so forwarding the occasional already-known document is fine.
    async fn poll_loop(self, tx: mpsc::Sender<SnapshotPatch>) {
        info!(endpoint = %self.endpoint, interval = ?self.poll_interval, "Remote watch starting");

        let mut backoff = self.create_backoff();
        let mut cursor: i64 = 0;

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            match self.load().await {
                Ok(Some(patch)) => {
                    backoff.reset();

                    let stamp = patch.last_updated.unwrap_or(0);
                    if stamp > cursor {
                        debug!(stamp, cursor, "Remote document advanced");
                        cursor = stamp;
                        if tx.send(patch).await.is_err() {
                            debug!("Watch receiver dropped, stopping");
                            break;
                        }
                    }
                }
                Ok(None) => {
                    backoff.reset();
                }
                Err(e) => {
                    warn!(error = %e, "Remote poll failed");
                    if let Some(delay) = backoff.next_backoff() {
                        debug!(?delay, "Backing off before next poll");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        info!("Remote watch stopped");
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None, // Poll forever
            ..Default::default()
        }
    }
}

impl SnapshotStore for RemoteStore {
    async fn load(&self) -> StoreResult<Option<SnapshotPatch>> {
        let request = self.authorize(self.client.get(self.endpoint.clone()));
        let response = request.send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let patch: SnapshotPatch = response.json().await?;
                debug!(last_updated = ?patch.last_updated, "Remote document fetched");
                Ok(Some(patch))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::RemoteStatus {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> StoreResult<i64> {
        let request = self.authorize(self.client.patch(self.endpoint.clone()).json(snapshot));
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let ack: SaveAck = response.json().await?;
        debug!(last_updated = ack.last_updated, "Remote snapshot accepted");
        Ok(ack.last_updated)
    }

    fn watch(&self, tx: mpsc::Sender<SnapshotPatch>) -> Option<JoinHandle<()>> {
        let store = self.clone();
        Some(tokio::spawn(store.poll_loop(tx)))
    }

    fn describe(&self) -> String {
        format!("remote document {}", self.endpoint)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
