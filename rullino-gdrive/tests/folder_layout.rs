use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rullino_core::{RullinoError, StorageQuota, StorageSink};
use rullino_gdrive::DriveStorage;
use rullino_gdrive::adapter::{DriveEntry, DriveTransport, FOLDER_MIME};

/// In-memory drive: a parent-id keyed tree plus a call log.
#[derive(Default)]
struct FakeDrive {
    children: Mutex<HashMap<String, Vec<DriveEntry>>>,
    creates: Mutex<Vec<(String, String)>>,
    uploads: Mutex<Vec<(String, String, usize)>>,
    next_id: Mutex<u32>,
}

impl FakeDrive {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn folder(id: &str, name: &str) -> DriveEntry {
        DriveEntry {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: FOLDER_MIME.to_string(),
            size: None,
        }
    }

    /// Seed an existing folder chain root -> "Rullino Drive" -> 2019 ->
    /// February.
    fn seeded() -> Arc<Self> {
        let drive = Self::new();
        {
            let mut children = drive.children.lock().unwrap();
            children.insert(
                "root".to_string(),
                vec![Self::folder("upload-root", "Rullino Drive")],
            );
            children.insert(
                "upload-root".to_string(),
                vec![Self::folder("y2019", "2019")],
            );
            children.insert(
                "y2019".to_string(),
                vec![Self::folder("m2019-02", "February")],
            );
        }
        drive
    }

    fn create_count(&self) -> usize {
        self.creates.lock().unwrap().len()
    }
}

#[async_trait]
impl DriveTransport for FakeDrive {
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveEntry>, RullinoError> {
        Ok(self
            .children
            .lock()
            .unwrap()
            .get(folder_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_folder(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<DriveEntry, RullinoError> {
        self.creates
            .lock()
            .unwrap()
            .push((name.to_string(), parent_id.to_string()));
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let entry = Self::folder(&format!("f{}", *next), name);
        self.children
            .lock()
            .unwrap()
            .entry(parent_id.to_string())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn upload(
        &self,
        name: &str,
        parent_id: &str,
        bytes: Vec<u8>,
    ) -> Result<DriveEntry, RullinoError> {
        self.uploads
            .lock()
            .unwrap()
            .push((name.to_string(), parent_id.to_string(), bytes.len()));
        Ok(DriveEntry {
            id: format!("file-{name}"),
            name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            size: Some(bytes.len().to_string()),
        })
    }

    async fn about(&self) -> Result<StorageQuota, RullinoError> {
        Ok(StorageQuota {
            total: 100,
            used: 40,
            trashed: 10,
        })
    }
}

#[tokio::test]
async fn missing_folders_are_created_root_first() {
    let drive = FakeDrive::new();
    let storage = DriveStorage::from_transport(drive.clone());

    let folder = storage.ensure_folder("2020/03").await.unwrap();

    let creates = drive.creates.lock().unwrap().clone();
    // Root, then year under root, then month under year.
    assert_eq!(creates[0], ("Rullino Drive".to_string(), "root".to_string()));
    assert_eq!(creates[1].0, "2020");
    assert_eq!(creates[2].0, "March");
    assert_eq!(folder.as_str(), "f3");
}

#[tokio::test]
async fn resolved_folders_are_cached() {
    let drive = FakeDrive::new();
    let storage = DriveStorage::from_transport(drive.clone());

    let first = storage.ensure_folder("2020/03").await.unwrap();
    let again = storage.ensure_folder("2020/03").await.unwrap();
    assert_eq!(first, again);
    assert_eq!(drive.create_count(), 3);

    // Same year, new month: only one more create.
    storage.ensure_folder("2020/04").await.unwrap();
    assert_eq!(drive.create_count(), 4);
}

#[tokio::test]
async fn existing_layout_is_mapped_instead_of_recreated() {
    let drive = FakeDrive::seeded();
    let storage = DriveStorage::from_transport(drive.clone());

    let folder = storage.ensure_folder("2019/02").await.unwrap();
    assert_eq!(folder.as_str(), "m2019-02");
    assert_eq!(drive.create_count(), 0);

    // A new month under the mapped year creates exactly one folder.
    storage.ensure_folder("2019/03").await.unwrap();
    let creates = drive.creates.lock().unwrap().clone();
    assert_eq!(creates, [("March".to_string(), "y2019".to_string())]);
}

#[tokio::test]
async fn malformed_date_paths_are_rejected() {
    let storage = DriveStorage::from_transport(FakeDrive::new());
    for path in ["2020", "2020/13", "2020/0", "20/03", "year/03"] {
        assert!(
            matches!(
                storage.ensure_folder(path).await,
                Err(RullinoError::InvalidArg(_))
            ),
            "{path} should be rejected"
        );
    }
}

#[tokio::test]
async fn uploads_land_in_the_requested_folder() {
    let drive = FakeDrive::new();
    let storage = DriveStorage::from_transport(drive.clone());

    let folder = storage.ensure_folder("2020/03").await.unwrap();
    let file = storage
        .upload(&folder, "IMG_0001.JPG", vec![0u8; 1024])
        .await
        .unwrap();

    assert_eq!(file.name, "IMG_0001.JPG");
    assert_eq!(file.size, Some(1024));
    assert_eq!(
        drive.uploads.lock().unwrap().as_slice(),
        [("IMG_0001.JPG".to_string(), folder.as_str().to_string(), 1024)]
    );
}

#[tokio::test]
async fn quota_counts_trash_against_the_grant() {
    let storage = DriveStorage::from_transport(FakeDrive::new());
    let quota = storage.quota().await.unwrap();
    assert_eq!(quota.consumed(), 50);
    assert_eq!(quota.available(), 50);
}
