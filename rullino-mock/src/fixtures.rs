use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use rullino_core::{
    AssetFlags, AssetRecord, MasterRecord, MediaItem, MediaVersion, VersionKind,
};

/// Deterministic synthetic album of `len` items, one per day ending at
/// `newest`.
///
/// Items are indexed by descending rank: index 0 is the newest. Every fifth
/// item is a favorite, and every item publishes an original plus a thumbnail
/// rendition with stable URLs and sizes.
#[must_use]
pub fn album_items(len: usize, newest: NaiveDate) -> Vec<MediaItem> {
    (0..len)
        .map(|rank| {
            let date = newest - Duration::days(rank as i64);
            let mut flags = AssetFlags::default();
            if rank % 5 == 0 {
                flags |= AssetFlags::FAVORITE;
            }

            let mut versions = BTreeMap::new();
            versions.insert(
                VersionKind::Original,
                MediaVersion {
                    width: Some(4032),
                    height: Some(3024),
                    file_type: Some("public.jpeg".to_string()),
                    fingerprint: Some(format!("fp-{rank}")),
                    size: Some(2_000_000 + rank as u64),
                    url: Some(format!("https://mock.invalid/original/{rank}")),
                },
            );
            versions.insert(
                VersionKind::Thumb,
                MediaVersion {
                    width: Some(256),
                    height: Some(192),
                    file_type: Some("public.jpeg".to_string()),
                    fingerprint: Some(format!("fp-thumb-{rank}")),
                    size: Some(10_000),
                    url: Some(format!("https://mock.invalid/thumb/{rank}")),
                },
            );

            MediaItem {
                asset: AssetRecord {
                    record_name: format!("asset-{rank}"),
                    record_change_tag: Some("1".to_string()),
                    master_ref: format!("master-{rank}"),
                    asset_date: date
                        .and_hms_opt(12, 0, 0)
                        .unwrap_or_default()
                        .and_utc(),
                    added_date: None,
                    flags,
                    caption: None,
                },
                master: MasterRecord {
                    record_name: format!("master-{rank}"),
                    record_change_tag: Some("1".to_string()),
                    filename: format!("IMG_{rank:04}.JPG"),
                    versions,
                },
            }
        })
        .collect()
}

/// Deterministic payload for a fixture item's download.
#[must_use]
pub fn payload(item: &MediaItem) -> Vec<u8> {
    format!("jpeg-bytes-of-{}", item.filename()).into_bytes()
}
