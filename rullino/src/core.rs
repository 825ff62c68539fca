use std::sync::Arc;

use rullino_core::{MediaConnector, RullinoError, StorageSink};

/// Orchestrator that moves album entities from a source connector into a
/// storage sink.
pub struct Rullino {
    pub(crate) source: Arc<dyn MediaConnector>,
    pub(crate) storage: Arc<dyn StorageSink>,
    pub(crate) cfg: RullinoConfig,
}

impl std::fmt::Debug for Rullino {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rullino")
            .field("source", &self.source.name())
            .field("storage", &self.storage.name())
            .field("cfg", &self.cfg)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RullinoConfig {
    pub folder_structure: String,
    pub delete_after_upload: bool,
    pub permanent_delete: bool,
}

impl Default for RullinoConfig {
    fn default() -> Self {
        Self {
            folder_structure: "%Y/%m".to_string(),
            delete_after_upload: false,
            permanent_delete: false,
        }
    }
}

/// Builder for constructing a `Rullino` orchestrator with custom
/// configuration.
#[derive(Default)]
pub struct RullinoBuilder {
    source: Option<Arc<dyn MediaConnector>>,
    storage: Option<Arc<dyn StorageSink>>,
    cfg: RullinoConfig,
}

impl RullinoBuilder {
    /// Create a new builder with sensible defaults.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no connectors; you must register a source via
    ///   [`with_source`] and a sink via [`with_storage`].
    /// - Defaults are conservative: uploads land in `%Y/%m` date folders and
    ///   originals are left in place until deletion is explicitly enabled.
    ///
    /// [`with_source`]: Self::with_source
    /// [`with_storage`]: Self::with_storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the source-side connector (the photo service).
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn MediaConnector>) -> Self {
        self.source = Some(source);
        self
    }

    /// Register the storage-side connector (the upload target).
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn StorageSink>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the `chrono` format string mapping an entity's capture date to
    /// its storage folder path.
    ///
    /// The formatted path must come out as `YYYY/mm`-style segments the
    /// storage sink understands; the default is `%Y/%m`.
    #[must_use]
    pub fn folder_structure(mut self, format: impl Into<String>) -> Self {
        self.cfg.folder_structure = format.into();
        self
    }

    /// Delete each original after its upload succeeds.
    ///
    /// Requires the source connector to advertise the remover capability;
    /// `build` succeeds either way but `transfer` reports `Unsupported`
    /// when deletion was requested without it.
    #[must_use]
    pub const fn delete_after_upload(mut self, yes: bool) -> Self {
        self.cfg.delete_after_upload = yes;
        self
    }

    /// Expunge deleted originals instead of leaving them in the source's
    /// recently-deleted area.
    #[must_use]
    pub const fn permanent_delete(mut self, yes: bool) -> Self {
        self.cfg.permanent_delete = yes;
        self
    }

    /// Build the `Rullino` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the source or storage connector is missing.
    pub fn build(self) -> Result<Rullino, RullinoError> {
        let source = self.source.ok_or_else(|| {
            RullinoError::InvalidArg(
                "no source connector registered; add one via with_source(...)".to_string(),
            )
        })?;
        let storage = self.storage.ok_or_else(|| {
            RullinoError::InvalidArg(
                "no storage connector registered; add one via with_storage(...)".to_string(),
            )
        })?;
        Ok(Rullino {
            source,
            storage,
            cfg: self.cfg,
        })
    }
}

impl Rullino {
    /// Start building a new `Rullino` instance.
    ///
    /// Typical usage chains connector registration and options, e.g.:
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    ///
    /// let icloud = Arc::new(ICloudPhotos::new(endpoint, params));
    /// let drive = Arc::new(DriveStorage::new(token)?);
    ///
    /// let rullino = rullino::Rullino::builder()
    ///     .with_source(icloud.clone())
    ///     .with_storage(drive)
    ///     .delete_after_upload(true)
    ///     .build()?;
    ///
    /// let album = Arc::new(icloud.album("All Photos")?);
    /// let report = rullino.transfer(album, &Selection::Last(200)).await?;
    /// ```
    #[must_use]
    pub fn builder() -> RullinoBuilder {
        RullinoBuilder::new()
    }

    /// Current quota of the storage sink.
    ///
    /// # Errors
    /// Propagates the sink's transport failure, if any.
    pub async fn storage_quota(&self) -> Result<rullino_core::StorageQuota, RullinoError> {
        self.storage.quota().await
    }
}
