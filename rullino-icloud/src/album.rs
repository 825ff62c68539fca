use std::sync::Arc;

use async_trait::async_trait;

use rullino_core::{
    AlbumSource, DEFAULT_PAGE_SIZE, Direction, PageRequest, RawRecord, RecordSource, RullinoError,
};

use crate::adapter::CloudKitTransport;
use crate::wire::{self, Filter};

/// Static description of a service-defined smart album.
#[derive(Debug, Clone, Copy)]
pub struct AlbumSpec {
    /// Human-facing title.
    pub title: &'static str,
    /// Record type paged by list queries.
    pub list_type: &'static str,
    /// Object type used by the index-count lookup.
    pub obj_type: &'static str,
    /// Smart-album filter value, when the album is a filtered view.
    pub smart_album: Option<&'static str>,
}

/// Smart albums the service exposes to every library.
pub const SMART_ALBUMS: &[AlbumSpec] = &[
    AlbumSpec {
        title: "All Photos",
        list_type: "CPLAssetAndMasterByAssetDateWithoutHiddenOrDeleted",
        obj_type: "CPLAssetByAssetDateWithoutHiddenOrDeleted",
        smart_album: None,
    },
    AlbumSpec {
        title: "Favorites",
        list_type: "CPLAssetAndMasterInSmartAlbumByAssetDate",
        obj_type: "CPLAssetInSmartAlbumByAssetDate:Favorite",
        smart_album: Some("FAVORITE"),
    },
    AlbumSpec {
        title: "Videos",
        list_type: "CPLAssetAndMasterInSmartAlbumByAssetDate",
        obj_type: "CPLAssetInSmartAlbumByAssetDate:Video",
        smart_album: Some("VIDEO"),
    },
    AlbumSpec {
        title: "Bursts",
        list_type: "CPLAssetAndMasterInSmartAlbumByAssetDate",
        obj_type: "CPLAssetInSmartAlbumByAssetDate:Burst",
        smart_album: Some("BURST"),
    },
    AlbumSpec {
        title: "Panoramas",
        list_type: "CPLAssetAndMasterInSmartAlbumByAssetDate",
        obj_type: "CPLAssetInSmartAlbumByAssetDate:Panorama",
        smart_album: Some("PANORAMA"),
    },
    AlbumSpec {
        title: "Screenshots",
        list_type: "CPLAssetAndMasterInSmartAlbumByAssetDate",
        obj_type: "CPLAssetInSmartAlbumByAssetDate:Screenshot",
        smart_album: Some("SCREENSHOT"),
    },
    AlbumSpec {
        title: "Time-lapse",
        list_type: "CPLAssetAndMasterInSmartAlbumByAssetDate",
        obj_type: "CPLAssetInSmartAlbumByAssetDate:Timelapse",
        smart_album: Some("TIMELAPSE"),
    },
    AlbumSpec {
        title: "Live",
        list_type: "CPLAssetAndMasterInSmartAlbumByAssetDate",
        obj_type: "CPLAssetInSmartAlbumByAssetDate:Live",
        smart_album: Some("LIVE"),
    },
    AlbumSpec {
        title: "Hidden",
        list_type: "CPLAssetAndMasterHiddenByAssetDate",
        obj_type: "CPLAssetHiddenByAssetDate",
        smart_album: None,
    },
    AlbumSpec {
        title: "Recently Deleted",
        list_type: "CPLAssetAndMasterDeletedByExpungedDate",
        obj_type: "CPLAssetDeletedByExpungedDate",
        smart_album: None,
    },
];

/// Look up a smart album by title.
///
/// Exact title first, then a case-insensitive pass, mirroring how album
/// names are usually typed by hand.
#[must_use]
pub fn find_spec(name: &str) -> Option<&'static AlbumSpec> {
    SMART_ALBUMS
        .iter()
        .find(|spec| spec.title == name)
        .or_else(|| {
            SMART_ALBUMS
                .iter()
                .find(|spec| spec.title.eq_ignore_ascii_case(name))
        })
}

/// One album of the photos service, exposed through paged record queries.
///
/// Albums always page in descending order: date windows are resolved
/// against the direction-defined rank space and the fetch loop walks the
/// album back toward its most recent entity.
pub struct PhotoAlbum {
    transport: Arc<dyn CloudKitTransport>,
    spec: &'static AlbumSpec,
    page_size: u64,
}

impl PhotoAlbum {
    pub(crate) fn new(transport: Arc<dyn CloudKitTransport>, spec: &'static AlbumSpec) -> Self {
        Self {
            transport,
            spec,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the logical page size (the raw-record limit is twice this).
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    fn extra_filters(&self) -> Vec<Filter> {
        match self.spec.smart_album {
            Some(value) => vec![Filter::equals(
                "smartAlbum",
                "STRING",
                serde_json::Value::from(value),
            )],
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl RecordSource for PhotoAlbum {
    async fn page(&self, req: &PageRequest) -> Result<Vec<RawRecord>, RullinoError> {
        let body = wire::list_query(req, self.spec.list_type, &self.extra_filters());
        let body = serde_json::to_value(&body)
            .map_err(|e| RullinoError::Data(format!("unserializable query body: {e}")))?;
        let response = self.transport.post("records/query", &body).await?;
        wire::parse_records(response)
    }
}

#[async_trait]
impl AlbumSource for PhotoAlbum {
    fn title(&self) -> &str {
        self.spec.title
    }

    fn direction(&self) -> Direction {
        Direction::Descending
    }

    fn page_size(&self) -> u64 {
        self.page_size
    }

    async fn len(&self) -> Result<u64, RullinoError> {
        let body = wire::count_query(self.spec.obj_type);
        let response = self
            .transport
            .post("internal/records/query/batch", &body)
            .await?;
        wire::parse_count(&response)
    }
}
