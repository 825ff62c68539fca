use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use futures::Stream;
use futures::stream;

use crate::RullinoError;
use crate::connector::{AlbumSource, RecordSource};
use crate::paging::join::{join_page, page_children};
use crate::paging::scan::{BoundaryScanner, ScanStep};
use crate::types::{DateSpan, Direction, FieldScope, MediaItem, PageRequest, Selection, Window};

/// Advance a fetch offset past `seen` child records.
///
/// Descending albums walk back toward rank 0, ascending albums walk forward.
const fn advance(offset: i64, seen: u64, direction: Direction) -> i64 {
    let step = seen as i64;
    match direction {
        Direction::Descending => offset - step,
        Direction::Ascending => offset + step,
    }
}

/// Resolve a selection into the concrete window to fetch.
///
/// `All` and `Last` are pure arithmetic. `Between` validates its bounds
/// before any network call (an open end defaults to tomorrow, keeping
/// same-day entries and mildly skewed clocks in range) and then drives a
/// lightweight boundary scan against `source`.
///
/// # Errors
/// - [`RullinoError::InvalidArg`] when the date range is reversed.
/// - Any transport error from the boundary scan's page fetches.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "rullino_core::paging::resolve_selection",
        skip(source),
        fields(album_len = album_len, direction = direction.as_str()),
    )
)]
pub async fn resolve_selection<S>(
    source: &S,
    album_len: u64,
    direction: Direction,
    page_size: u64,
    selection: &Selection,
) -> Result<Window, RullinoError>
where
    S: RecordSource + ?Sized,
{
    match *selection {
        Selection::All => Ok(Window::full(album_len, direction)),
        Selection::Last(n) => Ok(Window::last(album_len, n, direction)),
        Selection::Between { start, end } => {
            let end = end.unwrap_or_else(|| {
                let today = Utc::now().date_naive();
                today.succ_opt().unwrap_or(today)
            });
            let span = DateSpan::new(start, end)?;
            scan_window(source, album_len, direction, page_size, span).await
        }
    }
}

/// Locate the window of entities whose dates fall inside `span`.
///
/// Traverses the album's lightweight projection in its native paged order,
/// feeding child dates to a [`BoundaryScanner`], and stops fetching as soon
/// as both boundaries are known.
///
/// # Errors
/// Propagates page-fetch failures; no retry is attempted.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "rullino_core::paging::scan_window",
        skip(source, span),
        fields(album_len = album_len, direction = direction.as_str()),
    )
)]
pub async fn scan_window<S>(
    source: &S,
    album_len: u64,
    direction: Direction,
    page_size: u64,
    span: DateSpan,
) -> Result<Window, RullinoError>
where
    S: RecordSource + ?Sized,
{
    let mut scanner = BoundaryScanner::new(direction, span);
    let full = Window::full(album_len, direction);
    let limit = page_size.max(1) * 2;
    let mut offset = full.offset;
    let mut remaining = full.count;

    'scan: while remaining > 0 {
        let req = PageRequest {
            offset,
            limit,
            direction,
            scope: FieldScope::Lightweight,
        };
        let children = page_children(source.page(&req).await?);
        if children.is_empty() {
            break;
        }
        let seen = children.len() as u64;
        offset = advance(offset, seen, direction);
        remaining = remaining.saturating_sub(seen);
        for asset in &children {
            if scanner.observe(asset.asset_date.date_naive()) == ScanStep::Done {
                break 'scan;
            }
        }
    }

    Ok(scanner.into_window(album_len))
}

struct PageWalk<S: ?Sized> {
    source: Arc<S>,
    offset: i64,
    remaining: u64,
    direction: Direction,
    limit: u64,
    buffered: VecDeque<MediaItem>,
}

/// Stream the entities of a resolved window, one page fetch at a time.
///
/// The sequence is lazy, finite, and not restartable: each page is fetched
/// only when the consumer pulls past the buffered items, and dropping the
/// stream early leaves no fetch pending (the offset is advanced before a
/// page's items are yielded). A page with no child records ends the sequence
/// even when the remaining count is not exhausted; that is the store running
/// dry, not an error. Fetch and join failures end the sequence with an error
/// item; entities already yielded remain valid.
pub fn stream_window<S>(
    source: Arc<S>,
    window: Window,
    direction: Direction,
    page_size: u64,
) -> impl Stream<Item = Result<MediaItem, RullinoError>> + Send
where
    S: RecordSource + ?Sized + 'static,
{
    let walk = PageWalk {
        source,
        offset: window.offset,
        remaining: window.count,
        direction,
        // Over-fetch 2x: both record kinds of the child/parent split count
        // toward the page's raw record limit.
        limit: page_size.max(1) * 2,
        buffered: VecDeque::new(),
    };

    stream::try_unfold(walk, |mut walk| async move {
        loop {
            if walk.remaining == 0 {
                return Ok(None);
            }
            if let Some(item) = walk.buffered.pop_front() {
                walk.remaining -= 1;
                return Ok(Some((item, walk)));
            }

            let req = PageRequest {
                offset: walk.offset,
                limit: walk.limit,
                direction: walk.direction,
                scope: FieldScope::Full,
            };
            let joined = join_page(walk.source.page(&req).await?)?;
            if joined.children_seen == 0 {
                return Ok(None);
            }
            walk.offset = advance(walk.offset, joined.children_seen, walk.direction);
            walk.buffered = joined.items.into();
        }
    })
}

/// Resolve a selection against an album and stream the matching entities.
///
/// Convenience composing [`resolve_selection`] and [`stream_window`]; the
/// album's length is looked up once here and never rediscovered by the
/// engine.
///
/// # Errors
/// Returns resolution failures eagerly; fetch failures surface as error
/// items on the returned stream.
pub async fn fetch_album<A>(
    album: Arc<A>,
    selection: &Selection,
) -> Result<impl Stream<Item = Result<MediaItem, RullinoError>> + Send, RullinoError>
where
    A: AlbumSource + ?Sized + 'static,
{
    let album_len = album.len().await?;
    let direction = album.direction();
    let page_size = album.page_size();
    let window =
        resolve_selection(album.as_ref(), album_len, direction, page_size, selection).await?;
    Ok(stream_window(album, window, direction, page_size))
}
