use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use futures::StreamExt;
use rullino_core::{
    AlbumSource, AssetFlags, AssetRecord, Direction, FieldScope, MasterRecord, PageRequest,
    RawRecord, RecordSource, RullinoError, Selection, fetch_album,
};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

/// In-memory album obeying the wire's rank model: rank 0 is the newest entity
/// of a descending album, and a page fetch walks from `offset` toward rank 0
/// (descending) or toward `len - 1` (ascending). A rank past the end of the
/// store yields an empty page.
struct FixtureAlbum {
    dates: Vec<NaiveDate>,
    reported_len: u64,
    direction: Direction,
    page_size: u64,
    fail_full_fetches: bool,
    requests: Mutex<Vec<PageRequest>>,
}

impl FixtureAlbum {
    fn descending(len: usize, page_size: u64) -> Self {
        let dates = (0..len)
            .map(|rank| base() + Duration::days((len - 1 - rank) as i64))
            .collect();
        Self {
            dates,
            reported_len: len as u64,
            direction: Direction::Descending,
            page_size,
            fail_full_fetches: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn ascending(len: usize, page_size: u64) -> Self {
        let dates = (0..len)
            .map(|rank| base() + Duration::days(rank as i64))
            .collect();
        Self {
            dates,
            reported_len: len as u64,
            direction: Direction::Ascending,
            page_size,
            fail_full_fetches: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn offsets(&self, scope: FieldScope) -> Vec<i64> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.scope == scope)
            .map(|r| r.offset)
            .collect()
    }

    fn record_pair(&self, rank: usize) -> [RawRecord; 2] {
        let master_name = format!("master-{rank}");
        [
            RawRecord::Master(MasterRecord {
                record_name: master_name.clone(),
                record_change_tag: Some("1".to_string()),
                filename: format!("IMG_{rank:04}.JPG"),
                versions: BTreeMap::new(),
            }),
            RawRecord::Asset(AssetRecord {
                record_name: format!("asset-{rank}"),
                record_change_tag: None,
                master_ref: master_name,
                asset_date: self.dates[rank]
                    .and_hms_opt(12, 0, 0)
                    .unwrap()
                    .and_local_timezone(Utc)
                    .unwrap(),
                added_date: None,
                flags: AssetFlags::default(),
                caption: None,
            }),
        ]
    }
}

#[async_trait]
impl RecordSource for FixtureAlbum {
    async fn page(&self, req: &PageRequest) -> Result<Vec<RawRecord>, RullinoError> {
        self.requests.lock().unwrap().push(req.clone());
        if self.fail_full_fetches && req.scope == FieldScope::Full {
            return Err(RullinoError::transport("fixture", "forced failure"));
        }

        let len = self.dates.len();
        let per_page = usize::try_from(req.limit / 2).unwrap();
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
            .flat_map(|rank| self.record_pair(rank))
            .collect())
    }
}

#[async_trait]
impl AlbumSource for FixtureAlbum {
    fn title(&self) -> &str {
        "fixture"
    }
    fn direction(&self) -> Direction {
        self.direction
    }
    fn page_size(&self) -> u64 {
        self.page_size
    }
    async fn len(&self) -> Result<u64, RullinoError> {
        Ok(self.reported_len)
    }
}

async fn collect(
    album: Arc<FixtureAlbum>,
    selection: Selection,
) -> Vec<Result<rullino_core::MediaItem, RullinoError>> {
    let stream = fetch_album(album, &selection).await.unwrap();
    stream.collect().await
}

#[tokio::test]
async fn last_three_of_ten_needs_one_fetch() {
    let album = Arc::new(FixtureAlbum::descending(10, 100));
    let items = collect(album.clone(), Selection::Last(3)).await;
    let ids: Vec<String> = items
        .into_iter()
        .map(|r| r.unwrap().id().to_string())
        .collect();
    // Window starts at rank 2 and walks toward the newest entity.
    assert_eq!(ids, ["asset-2", "asset-1", "asset-0"]);
    assert_eq!(album.offsets(FieldScope::Full), [2]);
}

#[tokio::test]
async fn offsets_advance_by_children_seen() {
    let album = Arc::new(FixtureAlbum::descending(10, 3));
    let items = collect(album.clone(), Selection::All).await;
    assert_eq!(items.len(), 10);
    let offsets = album.offsets(FieldScope::Full);
    assert_eq!(offsets, [9, 6, 3, 0]);
    for pair in offsets.windows(2) {
        assert_eq!(pair[0] - pair[1], 3);
    }
}

#[tokio::test]
async fn short_store_ends_the_sequence_without_error() {
    // The caller believes the album holds 50 entities; the store has 30.
    let mut album = FixtureAlbum::ascending(30, 10);
    album.reported_len = 50;
    let album = Arc::new(album);

    let items = collect(album.clone(), Selection::All).await;
    assert_eq!(items.len(), 30);
    assert!(items.iter().all(Result::is_ok));
    // The fourth fetch came back empty and terminated the walk.
    assert_eq!(album.offsets(FieldScope::Full), [0, 10, 20, 30]);
}

#[tokio::test]
async fn dropping_the_stream_early_leaves_no_fetch_pending() {
    let album = Arc::new(FixtureAlbum::descending(10, 5));
    let stream = fetch_album(album.clone(), &Selection::All).await.unwrap();
    futures::pin_mut!(stream);

    assert!(album.offsets(FieldScope::Full).is_empty());
    stream.next().await.unwrap().unwrap();
    stream.next().await.unwrap().unwrap();
    drop(stream);
    assert_eq!(album.offsets(FieldScope::Full), [9]);
}

#[tokio::test]
async fn empty_selection_never_fetches() {
    let album = Arc::new(FixtureAlbum::descending(10, 5));
    let items = collect(album.clone(), Selection::Last(0)).await;
    assert!(items.is_empty());
    assert!(album.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn date_selection_scans_lightweight_then_fetches_full() {
    let album = Arc::new(FixtureAlbum::descending(10, 3));
    let start = base() + Duration::days(2);
    let end = base() + Duration::days(5);
    let items = collect(album.clone(), Selection::between(start, end)).await;

    let dates: Vec<NaiveDate> = items
        .into_iter()
        .map(|r| r.unwrap().created().date_naive())
        .collect();
    assert_eq!(
        dates,
        (2..=5)
            .map(|i| base() + Duration::days(i))
            .collect::<Vec<_>>()
    );
    // The scan walked the lightweight projection from the oldest rank and
    // stopped one page after leaving the range.
    assert_eq!(album.offsets(FieldScope::Lightweight), [9, 6, 3]);
    assert_eq!(album.offsets(FieldScope::Full), [7, 4]);
}

#[tokio::test]
async fn date_selection_without_matches_yields_nothing() {
    let album = Arc::new(FixtureAlbum::descending(10, 3));
    let start = base() - Duration::days(30);
    let end = base() - Duration::days(20);
    let items = collect(album.clone(), Selection::between(start, end)).await;
    assert!(items.is_empty());
    assert!(album.offsets(FieldScope::Full).is_empty());
}

#[tokio::test]
async fn reversed_range_fails_before_any_fetch() {
    let album = Arc::new(FixtureAlbum::descending(10, 3));
    let selection = Selection::between(base() + Duration::days(5), base());
    let err = fetch_album(album.clone(), &selection).await.err().unwrap();
    assert!(matches!(err, RullinoError::InvalidArg(_)));
    assert!(album.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn transport_failure_surfaces_as_an_error_item() {
    let mut album = FixtureAlbum::descending(10, 3);
    album.fail_full_fetches = true;
    let album = Arc::new(album);

    let stream = fetch_album(album, &Selection::Last(3)).await.unwrap();
    futures::pin_mut!(stream);
    let first = stream.next().await.unwrap();
    assert!(matches!(first, Err(RullinoError::Transport { .. })));
}
