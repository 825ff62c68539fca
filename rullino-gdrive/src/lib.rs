//! rullino-gdrive
//!
//! Google Drive storage connector for the rullino ecosystem: date-keyed
//! folder layout, file uploads, and storage-quota lookup behind the
//! `StorageSink` contract.
//!
//! OAuth is out of scope: construct the connector with a valid access token,
//! or inject a custom [`adapter::DriveTransport`] in tests.
#![warn(missing_docs)]

/// Drive transport definitions and the production transport backed by
/// `reqwest`.
pub mod adapter;
/// Date-keyed folder mapping and creation.
pub mod folders;

use std::sync::Arc;

use async_trait::async_trait;

use adapter::{DriveTransport, HttpTransport};
use folders::DriveFolders;
use rullino_core::{FolderId, RemoteFile, RullinoError, StorageQuota, StorageSink};

/// Stable connector identifier.
pub const CONNECTOR_NAME: &str = "rullino-gdrive";

/// Name of the root folder uploads land under, unless overridden.
pub const DEFAULT_ROOT_FOLDER: &str = "Rullino Drive";

/// Public storage connector backed by a drive account.
pub struct DriveStorage {
    transport: Arc<dyn DriveTransport>,
    folders: DriveFolders,
}

impl DriveStorage {
    /// Build a connector for an authenticated account.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the built-in endpoints fail to parse
    /// (they do not in practice).
    pub fn new(token: impl Into<String>) -> Result<Self, RullinoError> {
        Ok(Self::from_transport(Arc::new(HttpTransport::new(token)?)))
    }

    /// Build a connector over a custom transport (tests, instrumented
    /// clients).
    #[must_use]
    pub fn from_transport(transport: Arc<dyn DriveTransport>) -> Self {
        Self::with_root_folder(transport, DEFAULT_ROOT_FOLDER)
    }

    /// Build a connector uploading under a custom root folder name.
    #[must_use]
    pub fn with_root_folder(
        transport: Arc<dyn DriveTransport>,
        root_name: impl Into<String>,
    ) -> Self {
        let folders = DriveFolders::new(transport.clone(), root_name.into());
        Self { transport, folders }
    }
}

#[async_trait]
impl StorageSink for DriveStorage {
    fn name(&self) -> &'static str {
        CONNECTOR_NAME
    }

    async fn ensure_folder(&self, path: &str) -> Result<FolderId, RullinoError> {
        self.folders.ensure(path).await
    }

    async fn upload(
        &self,
        folder: &FolderId,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<RemoteFile, RullinoError> {
        let entry = self.transport.upload(name, folder.as_str(), bytes).await?;
        Ok(RemoteFile {
            size: entry.size_bytes(),
            id: entry.id,
            name: entry.name,
        })
    }

    async fn quota(&self) -> Result<StorageQuota, RullinoError> {
        self.transport.about().await
    }
}
