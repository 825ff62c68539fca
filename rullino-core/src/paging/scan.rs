use chrono::NaiveDate;

use crate::types::{DateSpan, Direction, Window};

/// Outcome of feeding one date to a [`BoundaryScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    /// The scanner needs more records.
    Continue,
    /// Both boundaries are known; stop traversing.
    Done,
}

/// Incremental scanner that locates the traversal-index range whose dates
/// fall inside a span.
///
/// Feed it one date per child record, in the album's paged traversal order,
/// and stop as soon as it reports [`ScanStep::Done`].
///
/// The paged walk visits records oldest-first for both directions: an
/// ascending album walks rank 0 upward, a descending album walks from
/// `len - 1` back toward rank 0 (rank 0 being the most recent). Dates are
/// therefore non-decreasing along the traversal, and the scan closes once a
/// record falls strictly past the span's end. Range exits use strict
/// comparisons, so records sharing a boundary date are always included even
/// when the store's order is not strictly monotonic by date.
#[derive(Debug)]
pub struct BoundaryScanner {
    direction: Direction,
    span: DateSpan,
    idx: u64,
    first: Option<u64>,
    last: Option<u64>,
}

impl BoundaryScanner {
    /// Start a scan for `span` over an album traversed in `direction`.
    #[must_use]
    pub const fn new(direction: Direction, span: DateSpan) -> Self {
        Self {
            direction,
            span,
            idx: 0,
            first: None,
            last: None,
        }
    }

    /// Classify one record date.
    ///
    /// Returns [`ScanStep::Done`] once the range has been entered and then
    /// exited, at which point the closing boundary is the previous index.
    pub fn observe(&mut self, date: NaiveDate) -> ScanStep {
        if date > self.span.end {
            if self.first.is_some() && self.last.is_none() {
                self.last = Some(self.idx - 1);
                return ScanStep::Done;
            }
        } else if self.span.contains(date) && self.first.is_none() {
            self.first = Some(self.idx);
        }
        self.idx += 1;
        ScanStep::Continue
    }

    /// Convert the scan result into a fetch window for an album of
    /// `album_len` entities.
    ///
    /// A range left open at the end of the traversal closes at
    /// `album_len - 1`. A scan that never entered the span resolves to the
    /// empty window ("nothing to do", not an error).
    ///
    /// The conversion exists because the window addresses entities by
    /// position from the direction-defined start, while the scan indexes by
    /// traversal order; the two coincide only for ascending albums.
    #[must_use]
    pub fn into_window(self, album_len: u64) -> Window {
        let Some(first) = self.first else {
            return Window::EMPTY;
        };
        let last = self
            .last
            .unwrap_or_else(|| album_len.saturating_sub(1))
            .max(first);
        let count = last - first + 1;
        let offset = match self.direction {
            Direction::Descending => album_len.saturating_sub(1).saturating_sub(first),
            Direction::Ascending => first,
        };
        Window {
            offset: i64::try_from(offset).unwrap_or(i64::MAX),
            count,
        }
    }
}

/// Scan an already-materialized date sequence.
///
/// Convenience over driving [`BoundaryScanner`] by hand; the paged driver in
/// [`crate::paging::fetch`] feeds the scanner incrementally instead so it can
/// stop fetching early.
#[must_use]
pub fn scan_dates<I>(dates: I, direction: Direction, span: DateSpan, album_len: u64) -> Window
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut scanner = BoundaryScanner::new(direction, span);
    for date in dates {
        if scanner.observe(date) == ScanStep::Done {
            break;
        }
    }
    scanner.into_window(album_len)
}
