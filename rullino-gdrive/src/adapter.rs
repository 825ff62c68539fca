use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use rullino_core::{RullinoError, StorageQuota};

use crate::CONNECTOR_NAME;

/// Mime type marking folders on the drive.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// One file or folder as reported by the drive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveEntry {
    /// Provider-issued id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Mime type; folders carry [`FOLDER_MIME`].
    #[serde(default)]
    pub mime_type: String,
    /// Size in bytes, reported as a decimal string.
    #[serde(default)]
    pub size: Option<String>,
}

impl DriveEntry {
    /// `true` when the entry is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME
    }

    /// Parsed size in bytes, when reported.
    #[must_use]
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Drive abstraction (so we can inject fakes in tests).
#[async_trait]
pub trait DriveTransport: Send + Sync {
    /// List the non-trashed children of a folder (`"root"` for the drive
    /// root).
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveEntry>, RullinoError>;

    /// Create a folder under a parent.
    async fn create_folder(&self, name: &str, parent_id: &str)
    -> Result<DriveEntry, RullinoError>;

    /// Upload a file into a parent folder.
    async fn upload(
        &self,
        name: &str,
        parent_id: &str,
        bytes: Vec<u8>,
    ) -> Result<DriveEntry, RullinoError>;

    /// Storage quota of the account.
    async fn about(&self) -> Result<StorageQuota, RullinoError>;
}

#[derive(Debug, Clone, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AboutResponse {
    storage_quota: WireQuota,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuota {
    // The drive reports byte counts as decimal strings; unlimited plans omit
    // the limit entirely.
    #[serde(default)]
    limit: Option<String>,
    #[serde(default)]
    usage: Option<String>,
    #[serde(default)]
    usage_in_drive_trash: Option<String>,
}

fn parse_bytes(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// Real transport backed by a shared `reqwest` client and a bearer token.
///
/// Token acquisition and refresh are the caller's concern, same as the
/// session on the photo-service side.
pub struct HttpTransport {
    http: reqwest::Client,
    api: Url,
    upload: Url,
    token: String,
}

impl HttpTransport {
    /// Build a transport against the public drive endpoints.
    ///
    /// # Errors
    /// Never fails for the built-in endpoints; kept fallible for parity with
    /// [`Self::with_endpoints`].
    pub fn new(token: impl Into<String>) -> Result<Self, RullinoError> {
        Self::with_endpoints(
            "https://www.googleapis.com/drive/v3/",
            "https://www.googleapis.com/upload/drive/v3/",
            token,
        )
    }

    /// Build a transport against custom endpoints (tests, proxies).
    ///
    /// # Errors
    /// Returns `InvalidArg` when an endpoint does not parse as a URL.
    pub fn with_endpoints(
        api: &str,
        upload: &str,
        token: impl Into<String>,
    ) -> Result<Self, RullinoError> {
        let parse = |s: &str| {
            Url::parse(s).map_err(|e| RullinoError::InvalidArg(format!("bad endpoint {s}: {e}")))
        };
        Ok(Self {
            http: reqwest::Client::new(),
            api: parse(api)?,
            upload: parse(upload)?,
            token: token.into(),
        })
    }

    fn url(&self, base: &Url, path: &str) -> Result<Url, RullinoError> {
        base.join(path)
            .map_err(|e| RullinoError::InvalidArg(format!("bad path {path}: {e}")))
    }

    fn err(e: impl std::fmt::Display) -> RullinoError {
        RullinoError::transport(CONNECTOR_NAME, e.to_string())
    }

    async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response, RullinoError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(RullinoError::transport(
                CONNECTOR_NAME,
                format!("{what} returned {status}"),
            ))
        }
    }
}

#[async_trait]
impl DriveTransport for HttpTransport {
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveEntry>, RullinoError> {
        let url = self.url(&self.api, "files")?;
        let query = format!("'{folder_id}' in parents and trashed=false");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name,mimeType,size)"),
                ("pageSize", "1000"),
            ])
            .send()
            .await
            .map_err(Self::err)?;
        let list: FileList = Self::check(response, "files.list")
            .await?
            .json()
            .await
            .map_err(Self::err)?;
        Ok(list.files)
    }

    async fn create_folder(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<DriveEntry, RullinoError> {
        let url = self.url(&self.api, "files")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .query(&[("fields", "id,name,mimeType")])
            .json(&json!({
                "name": name,
                "mimeType": FOLDER_MIME,
                "parents": [parent_id],
            }))
            .send()
            .await
            .map_err(Self::err)?;
        Self::check(response, "files.create")
            .await?
            .json()
            .await
            .map_err(Self::err)
    }

    async fn upload(
        &self,
        name: &str,
        parent_id: &str,
        bytes: Vec<u8>,
    ) -> Result<DriveEntry, RullinoError> {
        // Two-phase resumable upload: metadata first, then the bytes against
        // the returned session URL.
        let url = self.url(&self.upload, "files")?;
        let init = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .query(&[("uploadType", "resumable"), ("fields", "id,name,size")])
            .json(&json!({ "name": name, "parents": [parent_id] }))
            .send()
            .await
            .map_err(Self::err)?;
        let init = Self::check(init, "upload init").await?;
        let session = init
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                RullinoError::transport(CONNECTOR_NAME, "upload init returned no session URL")
            })?;

        let response = self
            .http
            .put(session)
            .bearer_auth(&self.token)
            .body(bytes)
            .send()
            .await
            .map_err(Self::err)?;
        Self::check(response, "upload")
            .await?
            .json()
            .await
            .map_err(Self::err)
    }

    async fn about(&self) -> Result<StorageQuota, RullinoError> {
        let url = self.url(&self.api, "about")?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("fields", "storageQuota")])
            .send()
            .await
            .map_err(Self::err)?;
        let about: AboutResponse = Self::check(response, "about")
            .await?
            .json()
            .await
            .map_err(Self::err)?;
        Ok(StorageQuota {
            total: parse_bytes(about.storage_quota.limit.as_deref(), u64::MAX),
            used: parse_bytes(about.storage_quota.usage.as_deref(), 0),
            trashed: parse_bytes(about.storage_quota.usage_in_drive_trash.as_deref(), 0),
        })
    }
}
