use async_trait::async_trait;

use crate::RullinoError;
use crate::types::{
    Direction, FolderId, MediaItem, PageRequest, RawRecord, RemoteFile, StorageQuota, VersionKind,
};

/// Focused role trait for anything that can serve one paged record query.
///
/// This is the engine-facing contract: the paging engine issues one request
/// at a time and never retries; transport failures propagate as-is.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page of raw records at the requested rank.
    async fn page(&self, req: &PageRequest) -> Result<Vec<RawRecord>, RullinoError>;
}

/// A named, ordered album exposed through paged record queries.
#[async_trait]
pub trait AlbumSource: RecordSource {
    /// Human-facing album title.
    fn title(&self) -> &str;

    /// Server-defined traversal order for this album.
    fn direction(&self) -> Direction;

    /// Logical entities per page fetch.
    fn page_size(&self) -> u64;

    /// Total number of logical entities in the album.
    ///
    /// The paging engine never discovers this itself; callers obtain it here
    /// (one counting query) and pass it in.
    async fn len(&self) -> Result<u64, RullinoError>;
}

/// Focused role trait for connectors that can fetch original media bytes.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Download one rendition of the given item.
    async fn download(&self, item: &MediaItem, kind: VersionKind)
    -> Result<Vec<u8>, RullinoError>;
}

/// Focused role trait for connectors that can delete originals.
#[async_trait]
pub trait MediaRemover: Send + Sync {
    /// Delete the item from the source library.
    ///
    /// `permanent` expunges instead of moving to the recently-deleted area.
    async fn delete(&self, item: &MediaItem, permanent: bool) -> Result<(), RullinoError>;
}

/// Main source-side connector trait. Exposes capability discovery.
pub trait MediaConnector: Send + Sync {
    /// A stable identifier, e.g. "rullino-icloud".
    fn name(&self) -> &'static str;

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Advertise download capability by returning a usable trait object
    /// reference when supported.
    fn as_downloader(&self) -> Option<&dyn MediaDownloader> {
        None
    }

    /// Advertise delete capability by returning a usable trait object
    /// reference when supported.
    fn as_remover(&self) -> Option<&dyn MediaRemover> {
        None
    }
}

/// Storage-side collaborator: folder creation, upload, and quota lookup.
#[async_trait]
pub trait StorageSink: Send + Sync {
    /// A stable identifier, e.g. "rullino-gdrive".
    fn name(&self) -> &'static str;

    /// Resolve (creating if needed) the folder for a `YYYY/mm` date path.
    async fn ensure_folder(&self, path: &str) -> Result<FolderId, RullinoError>;

    /// Upload a file into the given folder.
    async fn upload(
        &self,
        folder: &FolderId,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<RemoteFile, RullinoError>;

    /// Current storage quota.
    async fn quota(&self) -> Result<StorageQuota, RullinoError>;
}
