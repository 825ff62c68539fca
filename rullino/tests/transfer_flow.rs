use std::sync::Arc;

use chrono::NaiveDate;
use rullino_core::{MediaConnector, RullinoError, Selection};
use rullino_mock::{MockLibrary, MockStorage};
use rullino::Rullino;

fn newest() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 3, 5).unwrap()
}

fn orchestrator(
    library: Arc<MockLibrary>,
    storage: Arc<MockStorage>,
    delete: bool,
) -> Rullino {
    Rullino::builder()
        .with_source(library)
        .with_storage(storage)
        .delete_after_upload(delete)
        .build()
        .unwrap()
}

#[tokio::test]
async fn uploads_land_in_date_folders() {
    let library = Arc::new(MockLibrary::new(10, newest()).with_page_size(4));
    let storage = Arc::new(MockStorage::new());
    let rullino = orchestrator(library.clone(), storage.clone(), false);

    let report = rullino
        .transfer(library.clone(), &Selection::All)
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.uploaded.len(), 10);

    let files = storage.files();
    assert_eq!(files.len(), 10);
    // Items span 2020-03-05 back to 2020-02-25, so both month folders
    // appear.
    assert!(files.iter().any(|(folder, _, _)| folder == "2020/03"));
    assert!(files.iter().any(|(folder, _, _)| folder == "2020/02"));
    // Nothing was deleted without opting in.
    assert!(library.deleted().is_empty());
}

#[tokio::test]
async fn last_n_moves_only_the_most_recent() {
    let library = Arc::new(MockLibrary::new(10, newest()).with_page_size(4));
    let storage = Arc::new(MockStorage::new());
    let rullino = orchestrator(library.clone(), storage.clone(), false);

    let report = rullino
        .transfer(library.clone(), &Selection::Last(3))
        .await
        .unwrap();

    let names: Vec<&str> = report
        .uploaded
        .iter()
        .map(|e| e.filename.as_str())
        .collect();
    // Ranks 2, 1, 0: the three newest, oldest of the window first.
    assert_eq!(names, ["IMG_0002.JPG", "IMG_0001.JPG", "IMG_0000.JPG"]);
}

#[tokio::test]
async fn date_range_moves_the_matching_slice() {
    let library = Arc::new(MockLibrary::new(10, newest()).with_page_size(4));
    let storage = Arc::new(MockStorage::new());
    let rullino = orchestrator(library.clone(), storage.clone(), false);

    let from = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    let report = rullino
        .transfer(library.clone(), &Selection::since(from))
        .await
        .unwrap();

    // 2020-03-01 ..= 2020-03-05: ranks 4..=0.
    assert_eq!(report.uploaded.len(), 5);
    assert!(
        storage
            .files()
            .iter()
            .all(|(folder, _, _)| folder == "2020/03")
    );
}

#[tokio::test]
async fn delete_after_upload_removes_originals() {
    let library = Arc::new(MockLibrary::new(6, newest()));
    let storage = Arc::new(MockStorage::new());
    let rullino = orchestrator(library.clone(), storage.clone(), true);

    let report = rullino
        .transfer(library.clone(), &Selection::All)
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(library.deleted().len(), 6);
}

#[tokio::test]
async fn failed_items_are_recorded_and_skipped() {
    let library = Arc::new(
        MockLibrary::new(6, newest())
            .with_filename(3, "FAIL-DOWNLOAD.JPG")
            .with_page_size(2),
    );
    let storage = Arc::new(MockStorage::new());
    let rullino = orchestrator(library.clone(), storage.clone(), true);

    let report = rullino
        .transfer(library.clone(), &Selection::All)
        .await
        .unwrap();

    assert_eq!(report.uploaded.len(), 5);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].id, "asset-3");
    assert_eq!(report.failed[0].stage, rullino::TransferStage::Download);
    // The failed item's original must not be deleted.
    assert!(!library.deleted().contains(&"asset-3".to_string()));
    assert_eq!(library.deleted().len(), 5);
}

#[tokio::test]
async fn upload_failures_leave_the_original_in_place() {
    let library = Arc::new(
        MockLibrary::new(4, newest()).with_filename(1, "FAIL-UPLOAD.JPG"),
    );
    let storage = Arc::new(MockStorage::new());
    let rullino = orchestrator(library.clone(), storage.clone(), true);

    let report = rullino
        .transfer(library.clone(), &Selection::All)
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].stage, rullino::TransferStage::Upload);
    assert!(!library.deleted().contains(&"asset-1".to_string()));
}

#[tokio::test]
async fn delete_without_the_capability_is_unsupported() {
    struct ListOnly;
    impl MediaConnector for ListOnly {
        fn name(&self) -> &'static str {
            "list-only"
        }
    }

    let library = Arc::new(MockLibrary::new(2, newest()));
    let storage = Arc::new(MockStorage::new());
    let rullino = Rullino::builder()
        .with_source(Arc::new(ListOnly))
        .with_storage(storage)
        .delete_after_upload(true)
        .build()
        .unwrap();

    let err = rullino
        .transfer(library, &Selection::All)
        .await
        .unwrap_err();
    assert!(matches!(err, RullinoError::Unsupported { .. }));
}

#[test]
fn builder_requires_both_connectors() {
    let err = Rullino::builder().build().unwrap_err();
    assert!(matches!(err, RullinoError::InvalidArg(_)));

    let err = Rullino::builder()
        .with_storage(Arc::new(MockStorage::new()))
        .build()
        .unwrap_err();
    assert!(matches!(err, RullinoError::InvalidArg(_)));
}
