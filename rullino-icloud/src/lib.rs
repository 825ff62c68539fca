//! rullino-icloud
//!
//! iCloud Photos connector for the rullino ecosystem. Exposes smart albums
//! as paged record sources for the core engine, plus original-media download
//! and delete-after-upload support.
//!
//! Session establishment (authentication, cookies, trust tokens) is out of
//! scope: construct the connector from an already-authenticated service
//! endpoint and its session query parameters, or inject a custom
//! [`adapter::CloudKitTransport`] in tests.
#![warn(missing_docs)]

/// Transport definitions and the production transport backed by `reqwest`.
pub mod adapter;
/// Smart albums and the paged album source.
pub mod album;
/// Wire bodies, desired-key sets, and record parsing.
pub mod wire;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use adapter::{CloudKitTransport, HttpTransport};
pub use album::{AlbumSpec, PhotoAlbum, SMART_ALBUMS};
use rullino_core::{
    MediaConnector, MediaDownloader, MediaItem, MediaRemover, RullinoError, VersionKind,
};

/// Stable connector identifier.
pub const CONNECTOR_NAME: &str = "rullino-icloud";

/// Public connector type for the photos service.
pub struct ICloudPhotos {
    transport: Arc<dyn CloudKitTransport>,
}

impl ICloudPhotos {
    /// Build a connector for an authenticated session.
    ///
    /// `endpoint` is the session's photos service endpoint (zone queries are
    /// issued relative to it); `params` are the session query parameters
    /// attached to every call.
    #[must_use]
    pub fn new(endpoint: Url, params: Vec<(String, String)>) -> Self {
        Self::from_transport(Arc::new(HttpTransport::new(endpoint, params)))
    }

    /// Build a connector over a custom transport (tests, instrumented
    /// clients).
    #[must_use]
    pub fn from_transport(transport: Arc<dyn CloudKitTransport>) -> Self {
        Self { transport }
    }

    /// Open a smart album by title.
    ///
    /// Lookup is exact first, then case-insensitive.
    ///
    /// # Errors
    /// Returns `NotFound` when no album of that name exists.
    pub fn album(&self, name: &str) -> Result<PhotoAlbum, RullinoError> {
        let spec = album::find_spec(name)
            .ok_or_else(|| RullinoError::not_found(format!("album {name}")))?;
        Ok(PhotoAlbum::new(self.transport.clone(), spec))
    }

    /// Titles of the albums this connector can open.
    #[must_use]
    pub fn album_titles(&self) -> Vec<&'static str> {
        SMART_ALBUMS.iter().map(|spec| spec.title).collect()
    }
}

impl MediaConnector for ICloudPhotos {
    fn name(&self) -> &'static str {
        CONNECTOR_NAME
    }

    fn vendor(&self) -> &'static str {
        "Apple iCloud"
    }

    fn as_downloader(&self) -> Option<&dyn MediaDownloader> {
        Some(self as &dyn MediaDownloader)
    }

    fn as_remover(&self) -> Option<&dyn MediaRemover> {
        Some(self as &dyn MediaRemover)
    }
}

#[async_trait]
impl MediaDownloader for ICloudPhotos {
    async fn download(
        &self,
        item: &MediaItem,
        kind: VersionKind,
    ) -> Result<Vec<u8>, RullinoError> {
        let version = item.version(kind).ok_or_else(|| {
            RullinoError::not_found(format!("{kind:?} rendition of {}", item.filename()))
        })?;
        let url = version.url.as_deref().ok_or_else(|| {
            RullinoError::Data(format!(
                "{kind:?} rendition of {} carries no download URL",
                item.filename()
            ))
        })?;
        self.transport.fetch_bytes(url).await
    }
}

#[async_trait]
impl MediaRemover for ICloudPhotos {
    async fn delete(&self, item: &MediaItem, permanent: bool) -> Result<(), RullinoError> {
        let body = wire::delete_body(item, permanent)?;
        self.transport.post("records/modify", &body).await?;
        Ok(())
    }
}
