//! Mock connectors for CI-safe examples and facade tests. Provide
//! deterministic data from static fixtures: an in-memory photo library
//! obeying the paged rank contract, and an in-memory storage sink.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use rullino_core::{
    AlbumSource, Direction, FolderId, MediaConnector, MediaDownloader, MediaItem, MediaRemover,
    PageRequest, RawRecord, RecordSource, RemoteFile, RullinoError, StorageQuota, StorageSink,
    VersionKind,
};

pub mod fixtures;

/// In-memory photo library with one album of deterministic fixture items.
///
/// Ranks follow the descending convention: index 0 is the newest item, and a
/// page fetch at `offset` walks back toward rank 0. A rank past the end of
/// the store yields an empty page, mirroring how the real service signals
/// exhaustion.
pub struct MockLibrary {
    items: Vec<MediaItem>,
    title: String,
    page_size: u64,
    reported_len: Option<u64>,
    deleted: Mutex<Vec<String>>,
}

impl MockLibrary {
    /// Library with `len` daily items, the newest dated `newest`.
    #[must_use]
    pub fn new(len: usize, newest: NaiveDate) -> Self {
        Self {
            items: fixtures::album_items(len, newest),
            title: "All Photos".to_string(),
            page_size: 10,
            reported_len: None,
            deleted: Mutex::new(Vec::new()),
        }
    }

    /// Override the logical page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Report a different length than the store actually holds, to exercise
    /// exhaustion handling.
    #[must_use]
    pub const fn with_reported_len(mut self, len: u64) -> Self {
        self.reported_len = Some(len);
        self
    }

    /// Rename the item at `rank`. Names containing `FAIL-DOWNLOAD` make
    /// downloads fail, names containing `FAIL-UPLOAD` make [`MockStorage`]
    /// uploads fail.
    #[must_use]
    pub fn with_filename(mut self, rank: usize, name: &str) -> Self {
        if let Some(item) = self.items.get_mut(rank) {
            item.master.filename = name.to_string();
        }
        self
    }

    /// Ids deleted through the remover capability, in call order.
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// The fixture items, newest first.
    #[must_use]
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    fn find(&self, id: &str) -> Option<&MediaItem> {
        self.items.iter().find(|item| item.id() == id)
    }
}

#[async_trait]
impl RecordSource for MockLibrary {
    async fn page(&self, req: &PageRequest) -> Result<Vec<RawRecord>, RullinoError> {
        let len = self.items.len();
        let per_page = usize::try_from(req.limit / 2).unwrap_or(usize::MAX).max(1);
        let Ok(start) = usize::try_from(req.offset) else {
            return Ok(Vec::new());
        };
        if start >= len {
            return Ok(Vec::new());
        }

        let ranks: Vec<usize> = match req.direction {
            Direction::Descending => {
                let take = per_page.min(start + 1);
                (start + 1 - take..=start).rev().collect()
            }
            Direction::Ascending => (start..len.min(start + per_page)).collect(),
        };

        Ok(ranks
            .into_iter()
            .flat_map(|rank| {
                let item = &self.items[rank];
                [
                    RawRecord::Master(item.master.clone()),
                    RawRecord::Asset(item.asset.clone()),
                ]
            })
            .collect())
    }
}

#[async_trait]
impl AlbumSource for MockLibrary {
    fn title(&self) -> &str {
        &self.title
    }

    fn direction(&self) -> Direction {
        Direction::Descending
    }

    fn page_size(&self) -> u64 {
        self.page_size
    }

    async fn len(&self) -> Result<u64, RullinoError> {
        Ok(self
            .reported_len
            .unwrap_or(self.items.len() as u64))
    }
}

impl MediaConnector for MockLibrary {
    fn name(&self) -> &'static str {
        "rullino-mock"
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn as_downloader(&self) -> Option<&dyn MediaDownloader> {
        Some(self as &dyn MediaDownloader)
    }

    fn as_remover(&self) -> Option<&dyn MediaRemover> {
        Some(self as &dyn MediaRemover)
    }
}

#[async_trait]
impl MediaDownloader for MockLibrary {
    async fn download(
        &self,
        item: &MediaItem,
        kind: VersionKind,
    ) -> Result<Vec<u8>, RullinoError> {
        // "FAIL-DOWNLOAD" in the filename forces a failure, so pipelines can
        // exercise their per-item error paths.
        if item.filename().contains("FAIL-DOWNLOAD") {
            return Err(RullinoError::transport("rullino-mock", "forced failure"));
        }
        if item.version(kind).is_none() {
            return Err(RullinoError::not_found(format!(
                "{kind:?} rendition of {}",
                item.filename()
            )));
        }
        Ok(fixtures::payload(item))
    }
}

#[async_trait]
impl MediaRemover for MockLibrary {
    async fn delete(&self, item: &MediaItem, _permanent: bool) -> Result<(), RullinoError> {
        if self.find(item.id()).is_none() {
            return Err(RullinoError::not_found(format!("item {}", item.id())));
        }
        self.deleted
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(item.id().to_string());
        Ok(())
    }
}

/// In-memory storage sink with a date-keyed folder map.
pub struct MockStorage {
    quota: StorageQuota,
    folders: Mutex<HashMap<String, FolderId>>,
    files: Mutex<Vec<(String, String, u64)>>,
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStorage {
    /// Empty storage with a roomy quota.
    #[must_use]
    pub fn new() -> Self {
        Self {
            quota: StorageQuota {
                total: 15 * 1024 * 1024 * 1024,
                used: 0,
                trashed: 0,
            },
            folders: Mutex::new(HashMap::new()),
            files: Mutex::new(Vec::new()),
        }
    }

    /// Uploaded files as `(folder path, file name, size)` tuples, in call
    /// order.
    #[must_use]
    pub fn files(&self) -> Vec<(String, String, u64)> {
        self.files
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn path_of(&self, folder: &FolderId) -> Option<String> {
        self.folders
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .find(|(_, id)| **id == *folder)
            .map(|(path, _)| path.clone())
    }
}

#[async_trait]
impl StorageSink for MockStorage {
    fn name(&self) -> &'static str {
        "rullino-mock"
    }

    async fn ensure_folder(&self, path: &str) -> Result<FolderId, RullinoError> {
        let mut folders = self
            .folders
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = folders
            .entry(path.to_string())
            .or_insert_with(|| FolderId::new(format!("folder-{path}")));
        Ok(id.clone())
    }

    async fn upload(
        &self,
        folder: &FolderId,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<RemoteFile, RullinoError> {
        if name.contains("FAIL-UPLOAD") {
            return Err(RullinoError::transport("rullino-mock", "forced failure"));
        }
        let path = self
            .path_of(folder)
            .ok_or_else(|| RullinoError::not_found(format!("folder {folder}")))?;
        let size = bytes.len() as u64;
        self.files
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((path, name.to_string(), size));
        Ok(RemoteFile {
            id: format!("file-{name}"),
            name: name.to_string(),
            size: Some(size),
        })
    }

    async fn quota(&self) -> Result<StorageQuota, RullinoError> {
        Ok(self.quota)
    }
}
