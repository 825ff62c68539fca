use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use rullino_core::{FolderId, RullinoError};

use crate::adapter::DriveTransport;

/// Month folder names, indexed by month number minus one.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Split and validate a `"YYYY/mm"` date path.
fn split_path(path: &str) -> Result<(&str, u32), RullinoError> {
    let invalid = || RullinoError::InvalidArg(format!("date path {path} is not YYYY/mm"));
    let (year, month) = path.split_once('/').ok_or_else(invalid)?;
    if year.len() != 4 || year.bytes().any(|b| !b.is_ascii_digit()) {
        return Err(invalid());
    }
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Date-keyed folder map over a drive.
///
/// Uploads land under one root folder, laid out as year folders containing
/// month folders named by English month name. The map is keyed `"YYYY/mm"`
/// (plus bare year keys) and is filled lazily: the first use discovers or
/// creates the root and maps whatever structure already exists, so repeated
/// transfers reuse folders from previous runs.
pub struct DriveFolders {
    transport: Arc<dyn DriveTransport>,
    root_name: String,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    root: Option<FolderId>,
    folders: HashMap<String, FolderId>,
}

impl DriveFolders {
    pub(crate) fn new(transport: Arc<dyn DriveTransport>, root_name: String) -> Self {
        Self {
            transport,
            root_name,
            state: Mutex::new(State::default()),
        }
    }

    /// Resolve (creating if needed) the folder for a `"YYYY/mm"` date path.
    ///
    /// # Errors
    /// - `InvalidArg` when the path is not `YYYY/mm`.
    /// - Transport errors from folder listing or creation.
    pub async fn ensure(&self, path: &str) -> Result<FolderId, RullinoError> {
        let (year, month) = split_path(path)?;
        let month_title = month_name(month)
            .ok_or_else(|| RullinoError::InvalidArg(format!("bad month in {path}")))?;

        let mut state = self.state.lock().await;
        self.ensure_root(&mut state).await?;
        if let Some(id) = state.folders.get(path) {
            return Ok(id.clone());
        }

        let year_id = match state.folders.get(year) {
            Some(id) => id.clone(),
            None => {
                let root = state.root.clone().ok_or_else(|| {
                    RullinoError::transport(crate::CONNECTOR_NAME, "upload root vanished")
                })?;
                let created = self.transport.create_folder(year, root.as_str()).await?;
                let id = FolderId::new(created.id);
                state.folders.insert(year.to_string(), id.clone());
                id
            }
        };

        let created = self
            .transport
            .create_folder(month_title, year_id.as_str())
            .await?;
        let id = FolderId::new(created.id);
        state.folders.insert(path.to_string(), id.clone());
        Ok(id)
    }

    /// Discover or create the upload root and map its existing layout.
    async fn ensure_root(&self, state: &mut State) -> Result<(), RullinoError> {
        if state.root.is_some() {
            return Ok(());
        }

        let entries = self.transport.list_children("root").await?;
        let existing = entries
            .into_iter()
            .find(|e| e.is_folder() && e.name == self.root_name);

        let root = match existing {
            Some(entry) => {
                let id = FolderId::new(entry.id);
                self.map_existing(&id, &mut state.folders).await?;
                id
            }
            None => FolderId::new(self.transport.create_folder(&self.root_name, "root").await?.id),
        };
        state.root = Some(root);
        Ok(())
    }

    /// Map the year/month folders already present under the root.
    async fn map_existing(
        &self,
        root: &FolderId,
        folders: &mut HashMap<String, FolderId>,
    ) -> Result<(), RullinoError> {
        for year in self.transport.list_children(root.as_str()).await? {
            if !year.is_folder() || year.name.len() != 4 || year.name.parse::<u32>().is_err() {
                continue;
            }
            for month in self.transport.list_children(&year.id).await? {
                if !month.is_folder() {
                    continue;
                }
                if let Some(idx) = MONTH_NAMES.iter().position(|m| *m == month.name) {
                    let key = format!("{}/{:02}", year.name, idx + 1);
                    folders.insert(key, FolderId::new(month.id));
                }
            }
            folders.insert(year.name, FolderId::new(year.id));
        }
        Ok(())
    }
}
