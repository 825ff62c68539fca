//! Rullino moves photo libraries between cloud services.
//!
//! Overview
//! - Streams album entities through the `rullino_core` paging engine: a
//!   selection (everything, the last N, or a date range) is resolved into
//!   one minimal sequence of paged fetches, consumed lazily.
//! - Pipes each entity through download → date folder → upload, optionally
//!   deleting the original afterwards.
//! - Collects per-entity failures into a report instead of aborting the run;
//!   only a fatal album-stream error stops it, keeping everything already
//!   moved.
//!
//! Key behaviors and trade-offs
//! - Selections: `All` and `Last(n)` resolve with pure arithmetic; date
//!   ranges first scan a lightweight projection of the album to locate the
//!   matching slice, trading one cheap pre-pass for minimal full-metadata
//!   fetches.
//! - Laziness: nothing is fetched until the consumer pulls, and stopping
//!   early costs nothing extra. Each run re-resolves and re-fetches; there
//!   is no cross-run caching.
//! - Deletion: off by default; when enabled, originals are deleted only
//!   after their upload succeeded, and failures leave the original in
//!   place.
//!
//! Examples
//! Building an orchestrator and moving a date range:
//! ```rust,ignore
//! use std::sync::Arc;
//! use rullino::{Rullino, Selection};
//!
//! let icloud = Arc::new(ICloudPhotos::new(endpoint, params));
//! let drive = Arc::new(DriveStorage::new(token)?);
//!
//! let rullino = Rullino::builder()
//!     .with_source(icloud.clone())
//!     .with_storage(drive)
//!     .folder_structure("%Y/%m")
//!     .delete_after_upload(true)
//!     .build()?;
//!
//! let album = Arc::new(icloud.album("All Photos")?);
//! let from = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let to = chrono::NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
//! let report = rullino
//!     .transfer(album, &Selection::between(from, to))
//!     .await?;
//! println!("moved {} items", report.uploaded.len());
//! ```
//!
//! Streaming without transferring:
//! ```rust,ignore
//! use futures::StreamExt;
//! let stream = rullino_core::fetch_album(album, &Selection::Last(5)).await?;
//! futures::pin_mut!(stream);
//! while let Some(item) = stream.next().await {
//!     println!("{}", item?.filename());
//! }
//! ```
//!
//! See `rullino/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod transfer;

pub use core::{Rullino, RullinoBuilder};
pub use transfer::{TransferEntry, TransferFailure, TransferReport, TransferStage};

// Re-export core types for convenience
pub use rullino_core::{
    AlbumSource,
    AssetFlags,
    AssetRecord,
    DateSpan,
    Direction,
    FolderId,
    MasterRecord,
    // Connector traits
    MediaConnector,
    MediaDownloader,
    // Entity types
    MediaItem,
    MediaRemover,
    MediaVersion,
    RawRecord,
    RecordSource,
    RemoteFile,
    RullinoError,
    // Engine surface
    Selection,
    StorageQuota,
    StorageSink,
    VersionKind,
    Window,
    fetch_album,
};
