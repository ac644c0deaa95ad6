//! Bulk operations on [`DataService`]: export, import, wipe, storage
//! usage. Imports and wipes have no queue representation, so in hybrid
//! mode a failed remote leg is logged and left for a later manual sync
//! or re-import.

use log::warn;

use super::DataService;
use crate::config::DataSource;
use crate::error::Result;
use crate::model::ExportBundle;
use crate::store::StorageInfo;

impl DataService {
    pub async fn export_data(&self) -> Result<ExportBundle> {
        self.read(
            "export data",
            async || self.local.export_data().await,
            async || self.remote.export_data().await,
            async |_: &ExportBundle| Ok(()),
        )
        .await
    }

    /// Replace stored collections with the bundle's contents. Ids in the
    /// bundle are preserved.
    pub async fn import_data(&self, bundle: &ExportBundle) -> Result<()> {
        match self.config.data_source {
            DataSource::Local => self.local.import_data(bundle).await,
            DataSource::Remote => match self.remote.import_data(bundle).await {
                Ok(()) => Ok(()),
                Err(e) if self.config.fallback_to_local => {
                    warn!("Remote import failed, importing locally: {}", e);
                    self.local.import_data(bundle).await
                }
                Err(e) => Err(e),
            },
            DataSource::Hybrid => {
                self.local.import_data(bundle).await?;
                if self.config.sync_to_remote && self.is_online() {
                    if let Err(e) = self.remote.import_data(bundle).await {
                        warn!("Remote import failed, local copy kept: {}", e);
                    }
                }
                Ok(())
            }
        }
    }

    /// Wipe every collection. Pending sync actions refer to records that
    /// no longer exist, so the queue is emptied too.
    pub async fn clear_all_data(&self) -> Result<()> {
        self.queue.clear().await?;
        match self.config.data_source {
            DataSource::Local => self.local.clear_all_data().await,
            DataSource::Remote => match self.remote.clear_all_data().await {
                Ok(()) => Ok(()),
                Err(e) if self.config.fallback_to_local => {
                    warn!("Remote clear failed, clearing locally: {}", e);
                    self.local.clear_all_data().await
                }
                Err(e) => Err(e),
            },
            DataSource::Hybrid => {
                self.local.clear_all_data().await?;
                if self.config.sync_to_remote && self.is_online() {
                    if let Err(e) = self.remote.clear_all_data().await {
                        warn!("Remote clear failed, local store wiped: {}", e);
                    }
                }
                Ok(())
            }
        }
    }

    /// Local cache usage against its advisory capacity.
    pub async fn storage_info(&self) -> Result<StorageInfo> {
        self.local.storage_info().await
    }
}
