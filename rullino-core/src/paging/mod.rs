//! Album paging engine shared by connectors and the orchestrator.
//!
//! Modules include:
//! - `scan`: locate the index range of a date span over lightweight records
//! - `join`: rejoin split child/parent wire records into media items
//! - `fetch`: resolve a selection to a window and stream it page by page
/// Date-boundary scanning over lightweight record projections.
pub mod scan;
/// Child/parent record joining.
pub mod join;
/// Window resolution and the lazy paged fetch loop.
pub mod fetch;
