//! The data service: one object owning the local store, the remote
//! store, the sync queue and the connectivity flag, routing every
//! operation through a single read path and a single write path chosen
//! by [`DataServiceConfig`].
//!
//! Routing rules:
//! - `Local` never touches the network.
//! - `Remote` goes to the remote store; a failed call is retried against
//!   the local store when `fallback_to_local` is set.
//! - `Hybrid` reads from the remote store while online (mirroring whole
//!   collections into the local cache) and from the local store while
//!   offline. Writes land locally first and are mirrored to the remote
//!   store, or queued for later replay when that mirror cannot happen.

mod bulk;
mod catalog;
mod sessions;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::{DataServiceConfig, DataSource};
use crate::error::Result;
use crate::store::{LocalStore, RemoteStore};
use crate::sync::{DrainOutcome, SyncAction, SyncQueue};

/// How often the background worker retries the queue between
/// connectivity notifications.
pub const SYNC_RETRY_INTERVAL: Duration = Duration::from_secs(5);

struct Connectivity {
    online: AtomicBool,
    wake: Notify,
}

#[derive(Clone)]
pub struct DataService {
    config: DataServiceConfig,
    local: LocalStore,
    remote: RemoteStore,
    queue: SyncQueue,
    connectivity: Arc<Connectivity>,
}

impl DataService {
    /// Assumes connectivity until told otherwise via [`set_online`].
    ///
    /// [`set_online`]: DataService::set_online
    pub fn new(config: DataServiceConfig, local: LocalStore, remote: RemoteStore) -> Self {
        let queue = SyncQueue::new(local.pool().clone());
        Self {
            config,
            local,
            remote,
            queue,
            connectivity: Arc::new(Connectivity {
                online: AtomicBool::new(true),
                wake: Notify::new(),
            }),
        }
    }

    pub fn config(&self) -> &DataServiceConfig {
        &self.config
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.online.load(Ordering::Relaxed)
    }

    /// Report a connectivity change. Coming back online wakes the sync
    /// worker so queued writes replay immediately instead of waiting for
    /// the next retry tick.
    pub fn set_online(&self, online: bool) {
        let was = self.connectivity.online.swap(online, Ordering::Relaxed);
        if online && !was {
            info!("Back online, waking sync worker");
            self.connectivity.wake.notify_one();
        } else if !online && was {
            info!("Connectivity lost, deferring remote writes");
        }
    }

    pub async fn pending_sync_count(&self) -> Result<u64> {
        self.queue.len().await
    }

    /// Replay the sync queue against the remote store right now.
    pub async fn sync_now(&self) -> Result<DrainOutcome> {
        self.queue.drain(&self.remote).await
    }

    /// Detached retry loop: every tick (or connectivity wake-up) while
    /// online, drain whatever is queued. Aborting the handle stops it.
    pub fn spawn_sync_worker(&self) -> JoinHandle<()> {
        let queue = self.queue.clone();
        let remote = self.remote.clone();
        let connectivity = self.connectivity.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(SYNC_RETRY_INTERVAL) => {}
                    _ = connectivity.wake.notified() => {}
                }
                if !connectivity.online.load(Ordering::Relaxed) {
                    continue;
                }
                match queue.drain(&remote).await {
                    Ok(outcome) if outcome.replayed > 0 || outcome.failed > 0 => {
                        debug!(
                            "Sync worker: {} replayed, {} still queued",
                            outcome.replayed, outcome.failed
                        );
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Sync worker drain failed: {}", e),
                }
            }
        })
    }

    /// The one read path. `mirror` refreshes the local cache from a
    /// successful hybrid remote read; pass a no-op for reads that do not
    /// cache (single records, derived queries).
    async fn read<T>(
        &self,
        op: &'static str,
        local: impl AsyncFnOnce() -> Result<T>,
        remote: impl AsyncFnOnce() -> Result<T>,
        mirror: impl AsyncFnOnce(&T) -> Result<()>,
    ) -> Result<T> {
        match self.config.data_source {
            DataSource::Local => local().await,
            DataSource::Remote => match remote().await {
                Ok(value) => Ok(value),
                Err(e) if self.config.fallback_to_local => {
                    warn!("Remote {} failed, falling back to local: {}", op, e);
                    local().await
                }
                Err(e) => Err(e),
            },
            DataSource::Hybrid => {
                if !self.is_online() {
                    return local().await;
                }
                match remote().await {
                    Ok(value) => {
                        if let Err(e) = mirror(&value).await {
                            warn!("Failed to mirror {} into local cache: {}", op, e);
                        }
                        Ok(value)
                    }
                    Err(e) => {
                        warn!("Remote {} failed, serving local cache: {}", op, e);
                        local().await
                    }
                }
            }
        }
    }

    /// The one write path. Hybrid writes must land locally first; the
    /// remote leg either succeeds now or the action is queued for the
    /// worker, never lost.
    async fn write<T>(
        &self,
        op: &'static str,
        local: impl AsyncFnOnce() -> Result<T>,
        remote: impl AsyncFnOnce() -> Result<T>,
        action: impl FnOnce() -> SyncAction,
    ) -> Result<T> {
        match self.config.data_source {
            DataSource::Local => local().await,
            DataSource::Remote => match remote().await {
                Ok(value) => Ok(value),
                Err(e) if self.config.fallback_to_local => {
                    warn!("Remote {} failed, falling back to local: {}", op, e);
                    local().await
                }
                Err(e) => Err(e),
            },
            DataSource::Hybrid => {
                let stored = local().await?;
                if self.config.sync_to_remote {
                    if self.is_online() {
                        if let Err(e) = remote().await {
                            warn!("Remote {} failed, queueing for sync: {}", op, e);
                            self.queue.enqueue(&action()).await?;
                        }
                    } else {
                        debug!("Offline, queueing {} for sync", op);
                        self.queue.enqueue(&action()).await?;
                    }
                }
                Ok(stored)
            }
        }
    }
}
