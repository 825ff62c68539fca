//! rullino-core
//!
//! Core types, traits, and the album paging engine shared across the rullino
//! ecosystem.
//!
//! - `types`: common data structures (windows, selections, wire records,
//!   media items, storage quotas).
//! - `connector`: the connector role traits for album sources, media
//!   download/delete, and storage sinks.
//! - `paging`: the paged fetch engine: window resolution, date-boundary
//!   scanning, and child/parent record joining.
//!
//! Async runtime (Tokio)
//! ---------------------
//! This crate assumes the Tokio ecosystem as the async runtime. The connector
//! traits are `async_trait` contracts and the paged fetch surface returns
//! `futures` streams; code consuming them is expected to run under a Tokio
//! 1.x runtime.
//!
//! The engine performs one network round-trip at a time per stream and holds
//! no state across invocations; independent streams can run concurrently
//! without coordination.
#![warn(missing_docs)]

/// Connector role traits for album sources and storage sinks.
pub mod connector;
mod error;
pub mod paging;
pub mod types;

pub use connector::{
    AlbumSource, MediaConnector, MediaDownloader, MediaRemover, RecordSource, StorageSink,
};
pub use error::RullinoError;
pub use paging::fetch::{fetch_album, resolve_selection, scan_window, stream_window};
pub use paging::join::{JoinedPage, join_page, page_children};
pub use paging::scan::{BoundaryScanner, ScanStep, scan_dates};
pub use types::*;
