use std::collections::HashMap;

use crate::RullinoError;
use crate::types::{AssetRecord, MediaItem, RawRecord};

/// Result of joining one page of raw records.
#[derive(Debug, Clone)]
pub struct JoinedPage {
    /// Joined entities, in the order their child records appeared.
    pub items: Vec<MediaItem>,
    /// Number of child records the page contained.
    ///
    /// The fetch loop advances its offset by this value, so it must count
    /// every child seen, including any past the caller's remaining count.
    pub children_seen: u64,
}

/// Join one page of raw records into media items.
///
/// Single pass: children keep page order, masters go into a name-keyed map,
/// then each child is resolved through its foreign key. Output order follows
/// child order regardless of where masters appeared in the page.
///
/// # Errors
/// Returns [`RullinoError::Protocol`] when a child's `master_ref` does not
/// resolve within the page. The record is never silently dropped; that would
/// corrupt the caller's offset bookkeeping.
pub fn join_page(records: Vec<RawRecord>) -> Result<JoinedPage, RullinoError> {
    let mut children: Vec<AssetRecord> = Vec::new();
    let mut masters = HashMap::new();
    for record in records {
        match record {
            RawRecord::Asset(asset) => children.push(asset),
            RawRecord::Master(master) => {
                masters.insert(master.record_name.clone(), master);
            }
        }
    }

    let children_seen = children.len() as u64;
    let mut items = Vec::with_capacity(children.len());
    for asset in children {
        let master = masters
            .get(&asset.master_ref)
            .cloned()
            .ok_or_else(|| RullinoError::protocol(&asset.record_name, &asset.master_ref))?;
        items.push(MediaItem { asset, master });
    }

    Ok(JoinedPage {
        items,
        children_seen,
    })
}

/// Extract the child records of a page, preserving order.
///
/// Used by the lightweight boundary scan, which only needs dates and never
/// joins.
#[must_use]
pub fn page_children(records: Vec<RawRecord>) -> Vec<AssetRecord> {
    records
        .into_iter()
        .filter_map(|record| match record {
            RawRecord::Asset(asset) => Some(asset),
            RawRecord::Master(_) => None,
        })
        .collect()
}
