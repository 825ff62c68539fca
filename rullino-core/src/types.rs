//! Shared data types for albums, wire records, and joined media items.

use std::collections::BTreeMap;

use bitflags::bitflags;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::RullinoError;

/// Default number of logical entities requested per page fetch.
///
/// The raw-record limit sent on the wire is twice this value, because every
/// logical entity arrives as two records (asset + master).
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Server-defined traversal order of an album.
///
/// `Descending` means index 0 is the most recent entity and `len - 1` the
/// oldest. All offset arithmetic in the paging engine depends on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Index 0 is the oldest entity.
    Ascending,
    /// Index 0 is the most recent entity.
    Descending,
}

impl Direction {
    /// Wire string understood by the record service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::Descending
    }
}

/// The exact slice of an album to materialize.
///
/// `count == 0` means no fetch is performed. `offset` is signed because the
/// descending fetch loop drives it below zero on the final page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Starting rank for the first page fetch.
    pub offset: i64,
    /// Number of logical entities to yield.
    pub count: u64,
}

impl Window {
    /// A window that fetches nothing.
    pub const EMPTY: Self = Self { offset: 0, count: 0 };

    /// Window covering the whole album.
    #[must_use]
    pub fn full(album_len: u64, direction: Direction) -> Self {
        if album_len == 0 {
            return Self::EMPTY;
        }
        let offset = match direction {
            Direction::Descending => i64::try_from(album_len).unwrap_or(i64::MAX) - 1,
            Direction::Ascending => 0,
        };
        Self {
            offset,
            count: album_len,
        }
    }

    /// Window covering the `n` most recent entities, clamped to the album
    /// length.
    ///
    /// In descending order the most recent `n` entities occupy ranks
    /// `0 ..= n - 1`; the window starts at the end of that range so the fetch
    /// loop can walk back toward rank 0 one page at a time.
    #[must_use]
    pub fn last(album_len: u64, n: u64, direction: Direction) -> Self {
        let n = n.min(album_len);
        if n == 0 {
            return Self::EMPTY;
        }
        let offset = match direction {
            Direction::Descending => i64::try_from(n).unwrap_or(i64::MAX) - 1,
            Direction::Ascending => 0,
        };
        Self { offset, count: n }
    }

    /// `true` when the window fetches nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Validated inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    /// Inclusive lower bound.
    pub start: NaiveDate,
    /// Inclusive upper bound.
    pub end: NaiveDate,
}

impl DateSpan {
    /// Build a span, rejecting `start > end`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the bounds are reversed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RullinoError> {
        if start > end {
            return Err(RullinoError::InvalidArg(format!(
                "date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Inclusive membership test.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// What slice of an album a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// Every entity in the album.
    All,
    /// The `n` most recent entities.
    Last(u64),
    /// Entities whose date falls in `[start, end]`, both inclusive.
    ///
    /// When `end` is `None` it defaults to tomorrow at resolution time, which
    /// keeps same-day entries (and mildly skewed clocks) inside the range.
    Between {
        /// Inclusive lower bound.
        start: NaiveDate,
        /// Inclusive upper bound; `None` defaults to tomorrow.
        end: Option<NaiveDate>,
    },
}

impl Selection {
    /// Entities between two dates, both inclusive.
    #[must_use]
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::Between {
            start,
            end: Some(end),
        }
    }

    /// Entities from `start` up to (and including) today.
    #[must_use]
    pub const fn since(start: NaiveDate) -> Self {
        Self::Between { start, end: None }
    }
}

/// Field projection requested from the record service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    /// Full media metadata for every record.
    Full,
    /// Date and identity fields only; used while scanning for date
    /// boundaries to keep payloads small.
    Lightweight,
}

/// One paged query against the record service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Starting rank of the page.
    pub offset: i64,
    /// Maximum raw records to return (twice the logical page size).
    pub limit: u64,
    /// Traversal direction for this album.
    pub direction: Direction,
    /// Field projection to request.
    pub scope: FieldScope,
}

bitflags! {
    /// Per-asset boolean attributes carried on the child record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AssetFlags: u8 {
        /// The user marked this item as a favorite.
        const FAVORITE = 1 << 0;
        /// The item is hidden from the main library view.
        const HIDDEN = 1 << 1;
    }
}

/// Media rendition families published on the master record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VersionKind {
    /// Full-resolution original.
    Original,
    /// Alternate original (e.g. RAW+JPEG pairs).
    OriginalAlt,
    /// Medium-resolution derivative.
    Medium,
    /// Thumbnail derivative.
    Thumb,
    /// Full-resolution video rendition.
    FullVideo,
    /// Medium-resolution video rendition.
    MediumVideo,
    /// Small video rendition.
    SmallVideo,
    /// Sidecar resource (e.g. live-photo companion).
    Sidecar,
}

/// One downloadable rendition of a media item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaVersion {
    /// Pixel width, when published.
    pub width: Option<u32>,
    /// Pixel height, when published.
    pub height: Option<u32>,
    /// Wire file type, e.g. `public.jpeg`.
    pub file_type: Option<String>,
    /// Content fingerprint.
    pub fingerprint: Option<String>,
    /// Size in bytes, when published.
    pub size: Option<u64>,
    /// Short-lived download URL.
    pub url: Option<String>,
}

/// Child wire record: asset-specific fields plus the foreign key to its
/// master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Record name (the asset's identity).
    pub record_name: String,
    /// Server change tag, needed for modify operations.
    pub record_change_tag: Option<String>,
    /// Record name of the master this asset belongs to.
    pub master_ref: String,
    /// When the media was captured.
    pub asset_date: DateTime<Utc>,
    /// When the media entered the library.
    pub added_date: Option<DateTime<Utc>>,
    /// Favorite/hidden attributes.
    pub flags: AssetFlags,
    /// User caption, when set.
    pub caption: Option<String>,
}

/// Parent wire record: fields shared by every rendition of one media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRecord {
    /// Record name (referenced by asset records).
    pub record_name: String,
    /// Server change tag, needed for modify operations.
    pub record_change_tag: Option<String>,
    /// Decoded original filename.
    pub filename: String,
    /// Published renditions keyed by kind.
    pub versions: BTreeMap<VersionKind, MediaVersion>,
}

/// Raw record as delivered by one page fetch, split by the wire
/// discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    /// A child (`CPLAsset`) record.
    Asset(AssetRecord),
    /// A parent (`CPLMaster`) record.
    Master(MasterRecord),
}

/// The joined logical entity: one asset and its resolved master.
///
/// Only the record joiner creates these; they have no independent existence
/// on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// The child record.
    pub asset: AssetRecord,
    /// The parent record the child's foreign key resolved to.
    pub master: MasterRecord,
}

impl MediaItem {
    /// Stable identity of the item (the asset record name).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.asset.record_name
    }

    /// Original filename from the master record.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.master.filename
    }

    /// Capture timestamp.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.asset.asset_date
    }

    /// Rendition of a specific kind, when published.
    #[must_use]
    pub fn version(&self, kind: VersionKind) -> Option<&MediaVersion> {
        self.master.versions.get(&kind)
    }

    /// Highest-fidelity rendition available, preferring the original.
    #[must_use]
    pub fn best_version(&self) -> Option<(VersionKind, &MediaVersion)> {
        const PREFERENCE: &[VersionKind] = &[
            VersionKind::Original,
            VersionKind::OriginalAlt,
            VersionKind::FullVideo,
            VersionKind::Medium,
            VersionKind::MediumVideo,
            VersionKind::SmallVideo,
            VersionKind::Thumb,
            VersionKind::Sidecar,
        ];
        PREFERENCE
            .iter()
            .find_map(|k| self.master.versions.get(k).map(|v| (*k, v)))
    }

    /// `true` when the user marked the item as a favorite.
    #[must_use]
    pub const fn is_favorite(&self) -> bool {
        self.asset.flags.contains(AssetFlags::FAVORITE)
    }

    /// `true` when the item is hidden from the main library view.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.asset.flags.contains(AssetFlags::HIDDEN)
    }
}

/// Identifier of a folder on the storage side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderId(String);

impl FolderId {
    /// Wrap a provider-issued folder id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file created on the storage side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Provider-issued file id.
    pub id: String,
    /// File name as stored.
    pub name: String,
    /// Size in bytes, when reported.
    pub size: Option<u64>,
}

/// Storage-side quota snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageQuota {
    /// Total bytes granted.
    pub total: u64,
    /// Bytes consumed by live files.
    pub used: u64,
    /// Bytes consumed by trashed files.
    pub trashed: u64,
}

impl StorageQuota {
    /// Bytes consumed overall; trashed files still count against the grant.
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.used.saturating_add(self.trashed)
    }

    /// Bytes still available.
    #[must_use]
    pub const fn available(&self) -> u64 {
        self.total.saturating_sub(self.consumed())
    }
}
