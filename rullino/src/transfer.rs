use std::sync::Arc;

use chrono::Local;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use rullino_core::{
    AlbumSource, MediaItem, RemoteFile, RullinoError, Selection, fetch_album,
};

use crate::core::Rullino;

/// Pipeline stage a failed item got stuck in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStage {
    /// Fetching the original bytes from the source.
    Download,
    /// Resolving the date folder on the storage side.
    Folder,
    /// Uploading into the date folder.
    Upload,
    /// Deleting the original after upload.
    Delete,
}

/// One successfully uploaded entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferEntry {
    /// Source-side identity of the entity.
    pub id: String,
    /// Original filename.
    pub filename: String,
    /// Date folder path the file landed in.
    pub folder: String,
    /// The file as created on the storage side.
    pub file: RemoteFile,
}

/// One entity the pipeline could not move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferFailure {
    /// Source-side identity of the entity.
    pub id: String,
    /// Original filename.
    pub filename: String,
    /// Stage that failed.
    pub stage: TransferStage,
    /// Human-readable failure description.
    pub error: String,
}

/// Outcome of one transfer run.
///
/// Per-item failures do not stop the run; they are collected here and the
/// pipeline moves on. A fatal album-stream error stops the run and is
/// recorded in `halted`, with everything already moved still reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferReport {
    /// Entities uploaded, in transfer order.
    pub uploaded: Vec<TransferEntry>,
    /// Entities that failed one pipeline stage.
    pub failed: Vec<TransferFailure>,
    /// Fatal stream error that cut the run short, if any.
    pub halted: Option<String>,
}

impl TransferReport {
    /// `true` when every streamed entity was moved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.halted.is_none()
    }

    fn fail(&mut self, item: &MediaItem, stage: TransferStage, error: &RullinoError) {
        tracing::error!(
            id = item.id(),
            filename = item.filename(),
            ?stage,
            error = %error,
            "transfer stage failed"
        );
        self.failed.push(TransferFailure {
            id: item.id().to_string(),
            filename: item.filename().to_string(),
            stage,
            error: error.to_string(),
        });
    }
}

impl Rullino {
    /// Move the selected entities of an album into the storage sink.
    ///
    /// Streams the album lazily (one page fetch at a time) and, per entity:
    /// downloads the best rendition, resolves the date folder from the
    /// capture date in local time, uploads, and optionally deletes the
    /// original. Entities that fail a stage are recorded and skipped;
    /// storage and source stay untouched for them beyond the failed stage.
    ///
    /// # Errors
    /// - `Unsupported` when the source cannot download, or deletion was
    ///   requested and it cannot delete; checked before any fetch.
    /// - Resolution failures (`InvalidArg`) from the selection, also before
    ///   any fetch.
    /// Fatal stream errors mid-run do not error the call; they halt the run
    /// and are recorded on the report.
    #[tracing::instrument(skip(self, album, selection), fields(album = album.title()))]
    pub async fn transfer(
        &self,
        album: Arc<dyn AlbumSource>,
        selection: &Selection,
    ) -> Result<TransferReport, RullinoError> {
        let downloader = self
            .source
            .as_downloader()
            .ok_or_else(|| RullinoError::unsupported("media/download"))?;
        let remover = if self.cfg.delete_after_upload {
            Some(
                self.source
                    .as_remover()
                    .ok_or_else(|| RullinoError::unsupported("media/delete"))?,
            )
        } else {
            None
        };

        match self.storage.quota().await {
            Ok(quota) => tracing::info!(
                available = quota.available(),
                consumed = quota.consumed(),
                storage = self.storage.name(),
                "storage quota before transfer"
            ),
            Err(error) => tracing::warn!(%error, "could not read storage quota"),
        }

        let stream = fetch_album(album, selection).await?;
        futures::pin_mut!(stream);

        let mut report = TransferReport::default();
        while let Some(next) = stream.next().await {
            let item = match next {
                Ok(item) => item,
                Err(error) => {
                    tracing::error!(%error, "album stream failed; stopping transfer");
                    report.halted = Some(error.to_string());
                    break;
                }
            };
            self.move_item(&item, downloader, remover, &mut report)
                .await;
        }

        tracing::info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            halted = report.halted.is_some(),
            "transfer finished"
        );
        Ok(report)
    }

    async fn move_item(
        &self,
        item: &MediaItem,
        downloader: &dyn rullino_core::MediaDownloader,
        remover: Option<&dyn rullino_core::MediaRemover>,
        report: &mut TransferReport,
    ) {
        let Some((kind, _)) = item.best_version() else {
            report.fail(
                item,
                TransferStage::Download,
                &RullinoError::not_found(format!("downloadable rendition of {}", item.filename())),
            );
            return;
        };

        let bytes = match downloader.download(item, kind).await {
            Ok(bytes) => bytes,
            Err(error) => return report.fail(item, TransferStage::Download, &error),
        };

        let date_path = item
            .created()
            .with_timezone(&Local)
            .format(&self.cfg.folder_structure)
            .to_string();
        let folder = match self.storage.ensure_folder(&date_path).await {
            Ok(folder) => folder,
            Err(error) => return report.fail(item, TransferStage::Folder, &error),
        };

        let file = match self.storage.upload(&folder, item.filename(), bytes).await {
            Ok(file) => file,
            Err(error) => return report.fail(item, TransferStage::Upload, &error),
        };
        tracing::info!(
            filename = item.filename(),
            folder = %date_path,
            "uploaded to storage"
        );

        if let Some(remover) = remover {
            if let Err(error) = remover.delete(item, self.cfg.permanent_delete).await {
                report.fail(item, TransferStage::Delete, &error);
            } else {
                tracing::info!(filename = item.filename(), "deleted original from source");
            }
        }

        report.uploaded.push(TransferEntry {
            id: item.id().to_string(),
            filename: item.filename().to_string(),
            folder: date_path,
            file,
        });
    }
}
