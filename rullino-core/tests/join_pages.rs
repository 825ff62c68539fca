use std::collections::BTreeMap;

use chrono::DateTime;
use rullino_core::{
    AssetFlags, AssetRecord, MasterRecord, RawRecord, RullinoError, join_page, page_children,
};

fn asset(name: &str, master_ref: &str) -> RawRecord {
    RawRecord::Asset(AssetRecord {
        record_name: name.to_string(),
        record_change_tag: None,
        master_ref: master_ref.to_string(),
        asset_date: DateTime::from_timestamp(1_577_836_800, 0).unwrap(),
        added_date: None,
        flags: AssetFlags::default(),
        caption: None,
    })
}

fn master(name: &str) -> RawRecord {
    RawRecord::Master(MasterRecord {
        record_name: name.to_string(),
        record_change_tag: Some("3t".to_string()),
        filename: format!("{name}.jpg"),
        versions: BTreeMap::new(),
    })
}

#[test]
fn join_order_follows_child_order() {
    // Masters arrive last and in reverse; output must still follow the
    // children.
    let page = vec![
        asset("c1", "p1"),
        asset("c2", "p2"),
        master("p2"),
        master("p1"),
    ];
    let joined = join_page(page).unwrap();
    assert_eq!(joined.children_seen, 2);
    let ids: Vec<&str> = joined.items.iter().map(|i| i.id()).collect();
    assert_eq!(ids, ["c1", "c2"]);
    assert_eq!(joined.items[0].master.record_name, "p1");
    assert_eq!(joined.items[1].master.record_name, "p2");
}

#[test]
fn interleaved_masters_join_the_same_way() {
    let page = vec![
        master("p1"),
        asset("c1", "p1"),
        master("p2"),
        asset("c2", "p2"),
    ];
    let joined = join_page(page).unwrap();
    let ids: Vec<&str> = joined.items.iter().map(|i| i.id()).collect();
    assert_eq!(ids, ["c1", "c2"]);
}

#[test]
fn missing_master_is_a_protocol_violation() {
    let page = vec![asset("c1", "p1"), asset("c2", "gone"), master("p1")];
    let err = join_page(page).unwrap_err();
    match err {
        RullinoError::Protocol { record, master } => {
            assert_eq!(record, "c2");
            assert_eq!(master, "gone");
        }
        other => panic!("expected protocol violation, got {other}"),
    }
}

#[test]
fn masters_only_page_counts_zero_children() {
    let joined = join_page(vec![master("p1"), master("p2")]).unwrap();
    assert_eq!(joined.children_seen, 0);
    assert!(joined.items.is_empty());
}

#[test]
fn shared_master_resolves_for_every_child() {
    // Burst shots can reference the same master.
    let page = vec![asset("c1", "p1"), asset("c2", "p1"), master("p1")];
    let joined = join_page(page).unwrap();
    assert_eq!(joined.children_seen, 2);
    assert!(
        joined
            .items
            .iter()
            .all(|i| i.master.record_name == "p1")
    );
}

#[test]
fn page_children_keeps_order_and_drops_masters() {
    let page = vec![master("p1"), asset("c1", "p1"), asset("c2", "p1")];
    let children = page_children(page);
    let names: Vec<&str> = children.iter().map(|c| c.record_name.as_str()).collect();
    assert_eq!(names, ["c1", "c2"]);
}
