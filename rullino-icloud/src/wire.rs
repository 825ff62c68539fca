//! Wire bodies and record parsing for the CloudKit-backed photos service.
//!
//! Every logical photo arrives split across two records: a `CPLAsset` child
//! carrying dates, flags, and a `masterRef` foreign key, and a `CPLMaster`
//! parent carrying the filename and the published renditions. The paging
//! engine rejoins them per page.

use std::collections::{BTreeMap, HashMap};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rullino_core::{
    AssetFlags, AssetRecord, MasterRecord, MediaVersion, PageRequest, RawRecord, RullinoError,
    VersionKind,
};

/// Wire discriminator of child records.
pub const RECORD_TYPE_ASSET: &str = "CPLAsset";
/// Wire discriminator of parent records.
pub const RECORD_TYPE_MASTER: &str = "CPLMaster";

/// Zone every photo query runs against.
pub const ZONE_NAME: &str = "PrimarySync";

/// Rendition families and their wire field prefixes.
const VERSION_PREFIXES: &[(VersionKind, &str)] = &[
    (VersionKind::Original, "resOriginal"),
    (VersionKind::OriginalAlt, "resOriginalAlt"),
    (VersionKind::Medium, "resJPEGMed"),
    (VersionKind::Thumb, "resJPEGThumb"),
    (VersionKind::FullVideo, "resVidFull"),
    (VersionKind::MediumVideo, "resVidMed"),
    (VersionKind::SmallVideo, "resVidSmall"),
    (VersionKind::Sidecar, "resSidecar"),
];

/// Fields requested for a full-metadata page.
pub const FULL_KEYS: &[&str] = &[
    "resOriginalWidth",
    "resOriginalHeight",
    "resOriginalFileType",
    "resOriginalFingerprint",
    "resOriginalRes",
    "resOriginalAltWidth",
    "resOriginalAltHeight",
    "resOriginalAltFileType",
    "resOriginalAltFingerprint",
    "resOriginalAltRes",
    "resJPEGMedWidth",
    "resJPEGMedHeight",
    "resJPEGMedFileType",
    "resJPEGMedFingerprint",
    "resJPEGMedRes",
    "resJPEGThumbWidth",
    "resJPEGThumbHeight",
    "resJPEGThumbFileType",
    "resJPEGThumbFingerprint",
    "resJPEGThumbRes",
    "resVidFullWidth",
    "resVidFullHeight",
    "resVidFullFileType",
    "resVidFullFingerprint",
    "resVidFullRes",
    "resVidMedWidth",
    "resVidMedHeight",
    "resVidMedFileType",
    "resVidMedFingerprint",
    "resVidMedRes",
    "resVidSmallWidth",
    "resVidSmallHeight",
    "resVidSmallFileType",
    "resVidSmallFingerprint",
    "resVidSmallRes",
    "resSidecarWidth",
    "resSidecarHeight",
    "resSidecarFileType",
    "resSidecarFingerprint",
    "resSidecarRes",
    "itemType",
    "dataClassType",
    "filenameEnc",
    "originalOrientation",
    "recordName",
    "recordType",
    "recordChangeTag",
    "masterRef",
    "assetDate",
    "addedDate",
    "isFavorite",
    "isHidden",
    "isDeleted",
    "captionEnc",
];

/// Fields requested while scanning for date boundaries: one date and the
/// identity fields, nothing else.
pub const LIGHTWEIGHT_KEYS: &[&str] = &[
    "assetDate",
    "recordName",
    "recordType",
    "recordChangeTag",
    "masterRef",
];

/// One `filterBy` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Field the filter applies to.
    pub field_name: String,
    /// Typed filter value.
    pub field_value: FieldValue,
    /// Comparison operator, e.g. `EQUALS`.
    pub comparator: String,
}

impl Filter {
    /// Equality filter helper.
    pub fn equals(field: impl Into<String>, kind: &str, value: Value) -> Self {
        Self {
            field_name: field.into(),
            field_value: FieldValue {
                kind: kind.to_string(),
                value,
            },
            comparator: "EQUALS".to_string(),
        }
    }
}

/// Typed wire value wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldValue {
    /// Wire type tag, e.g. `INT64` or `STRING`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The value itself.
    pub value: Value,
}

/// Zone reference carried on every body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneId {
    /// Zone name, always [`ZONE_NAME`] here.
    pub zone_name: &'static str,
    /// Zone type, only sent on modify operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<&'static str>,
}

impl ZoneId {
    fn query() -> Self {
        Self {
            zone_name: ZONE_NAME,
            zone_type: None,
        }
    }

    fn modify() -> Self {
        Self {
            zone_name: ZONE_NAME,
            zone_type: Some("REGULAR_CUSTOM_ZONE"),
        }
    }
}

/// Body of one paged record query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBody {
    /// Query spec: filters plus the list record type.
    pub query: QuerySpec,
    /// Maximum raw records to return.
    pub results_limit: u64,
    /// Field projection.
    pub desired_keys: Vec<String>,
    /// Target zone.
    #[serde(rename = "zoneID")]
    pub zone_id: ZoneId,
}

/// Filter set and record type of a paged query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    /// Rank, direction, and any album filters.
    pub filter_by: Vec<Filter>,
    /// List record type of the album being paged.
    pub record_type: String,
}

/// Build the body for one paged fetch against an album.
///
/// The rank and direction ride as filters; `resultsLimit` carries the raw
/// record cap (twice the logical page size, since each entity is two
/// records). Lightweight scope trims the projection down to the date and
/// identity fields.
#[must_use]
pub fn list_query(req: &PageRequest, list_type: &str, extra: &[Filter]) -> QueryBody {
    let mut filter_by = vec![
        Filter::equals("startRank", "INT64", Value::from(req.offset)),
        Filter::equals(
            "direction",
            "STRING",
            Value::from(req.direction.as_str()),
        ),
    ];
    filter_by.extend_from_slice(extra);

    let keys = match req.scope {
        rullino_core::FieldScope::Full => FULL_KEYS,
        rullino_core::FieldScope::Lightweight => LIGHTWEIGHT_KEYS,
    };

    QueryBody {
        query: QuerySpec {
            filter_by,
            record_type: list_type.to_string(),
        },
        results_limit: req.limit,
        desired_keys: keys.iter().map(|k| (*k).to_string()).collect(),
        zone_id: ZoneId::query(),
    }
}

/// Body of the batched index-count lookup used to size an album.
#[must_use]
pub fn count_query(obj_type: &str) -> Value {
    serde_json::json!({
        "batch": [{
            "resultsLimit": 1,
            "query": {
                "filterBy": {
                    "fieldName": "indexCountID",
                    "fieldValue": { "type": "STRING_LIST", "value": [obj_type] },
                    "comparator": "IN",
                },
                "recordType": "HyperionIndexCountLookup",
            },
            "zoneWide": true,
            "zoneID": { "zoneName": ZONE_NAME },
        }]
    })
}

/// Read the album length out of an index-count response.
///
/// # Errors
/// Returns `Data` when the response does not carry the expected
/// `itemCount` field.
pub fn parse_count(response: &Value) -> Result<u64, RullinoError> {
    response["batch"][0]["records"][0]["fields"]["itemCount"]["value"]
        .as_u64()
        .ok_or_else(|| RullinoError::Data("index count response missing itemCount".to_string()))
}

/// Body of the modify operation that deletes one asset.
///
/// The record identity comes from the asset record; the change tag comes
/// from its master. `permanent` expunges instead of moving the item to the
/// recently-deleted area.
///
/// # Errors
/// Returns `Data` when the master record carries no change tag (modify
/// operations are rejected without one).
pub fn delete_body(item: &rullino_core::MediaItem, permanent: bool) -> Result<Value, RullinoError> {
    let change_tag = item.master.record_change_tag.as_deref().ok_or_else(|| {
        RullinoError::Data(format!(
            "master {} carries no recordChangeTag",
            item.master.record_name
        ))
    })?;
    Ok(serde_json::json!({
        "operations": {
            "operationType": "update",
            "record": {
                "recordType": RECORD_TYPE_ASSET,
                "recordName": item.asset.record_name,
                "recordChangeTag": change_tag,
                "fields": {
                    "isDeleted": { "value": 1 },
                    "isExpunged": { "value": i32::from(permanent) },
                },
            },
        },
        "zoneID": serde_json::to_value(ZoneId::modify()).unwrap_or(Value::Null),
        "atomic": true,
    }))
}

/// One record as delivered on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    /// Record identity.
    pub record_name: String,
    /// Discriminator: `CPLAsset` or `CPLMaster`.
    pub record_type: String,
    /// Server change tag.
    #[serde(default)]
    pub record_change_tag: Option<String>,
    /// Typed field map.
    #[serde(default)]
    pub fields: HashMap<String, WireField>,
}

/// Typed field wrapper on a wire record.
#[derive(Debug, Clone, Deserialize)]
pub struct WireField {
    /// The raw value.
    #[serde(default)]
    pub value: Value,
}

/// Response of a paged record query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    /// Records of the page, both kinds interleaved.
    #[serde(default)]
    pub records: Vec<WireRecord>,
}

impl WireRecord {
    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|f| f.value.as_str())
    }

    fn i64_field(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(|f| f.value.as_i64())
    }

    fn base64_field(&self, key: &str) -> Option<String> {
        let raw = self.str_field(key)?;
        let bytes = BASE64.decode(raw).ok()?;
        String::from_utf8(bytes).ok()
    }

    fn timestamp_field(&self, key: &str) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.i64_field(key)?)
    }

    /// Convert into an engine record.
    ///
    /// Records of other types (index rows, containers) are skipped with
    /// `Ok(None)`.
    ///
    /// # Errors
    /// Returns `Data` for asset records missing their date or master
    /// reference.
    pub fn into_raw(self) -> Result<Option<RawRecord>, RullinoError> {
        if self.record_type == RECORD_TYPE_ASSET {
            self.into_asset().map(Some)
        } else if self.record_type == RECORD_TYPE_MASTER {
            Ok(Some(self.into_master()))
        } else {
            Ok(None)
        }
    }

    fn into_asset(self) -> Result<RawRecord, RullinoError> {
        let master_ref = self
            .fields
            .get("masterRef")
            .and_then(|f| f.value["recordName"].as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                RullinoError::Data(format!("asset {} carries no masterRef", self.record_name))
            })?;
        let asset_date = self.timestamp_field("assetDate").ok_or_else(|| {
            RullinoError::Data(format!("asset {} carries no assetDate", self.record_name))
        })?;

        let mut flags = AssetFlags::default();
        if self.i64_field("isFavorite") == Some(1) {
            flags |= AssetFlags::FAVORITE;
        }
        if self.i64_field("isHidden") == Some(1) {
            flags |= AssetFlags::HIDDEN;
        }

        Ok(RawRecord::Asset(AssetRecord {
            added_date: self.timestamp_field("addedDate"),
            caption: self.base64_field("captionEnc"),
            record_change_tag: self.record_change_tag.clone(),
            record_name: self.record_name,
            master_ref,
            asset_date,
            flags,
        }))
    }

    fn into_master(self) -> RawRecord {
        let mut versions = BTreeMap::new();
        for (kind, prefix) in VERSION_PREFIXES {
            let res = self.fields.get(format!("{prefix}Res").as_str());
            let version = MediaVersion {
                width: self
                    .i64_field(&format!("{prefix}Width"))
                    .and_then(|w| u32::try_from(w).ok()),
                height: self
                    .i64_field(&format!("{prefix}Height"))
                    .and_then(|h| u32::try_from(h).ok()),
                file_type: self.str_field(&format!("{prefix}FileType")).map(str::to_string),
                fingerprint: self
                    .str_field(&format!("{prefix}Fingerprint"))
                    .map(str::to_string),
                size: res.and_then(|f| f.value["size"].as_u64()),
                url: res
                    .and_then(|f| f.value["downloadURL"].as_str())
                    .map(str::to_string),
            };
            if version != MediaVersion::default() {
                versions.insert(*kind, version);
            }
        }

        // Lightweight pages omit filenameEnc; fall back to the record name so
        // the join still produces a usable item.
        let filename = self
            .base64_field("filenameEnc")
            .unwrap_or_else(|| self.record_name.clone());

        RawRecord::Master(MasterRecord {
            record_change_tag: self.record_change_tag.clone(),
            record_name: self.record_name,
            filename,
            versions,
        })
    }
}

/// Parse a paged query response into engine records, preserving order.
///
/// # Errors
/// Returns `Data` when the response body or a record in it is malformed.
pub fn parse_records(response: Value) -> Result<Vec<RawRecord>, RullinoError> {
    let parsed: QueryResponse = serde_json::from_value(response)
        .map_err(|e| RullinoError::Data(format!("malformed query response: {e}")))?;
    let mut records = Vec::with_capacity(parsed.records.len());
    for record in parsed.records {
        if let Some(raw) = record.into_raw()? {
            records.push(raw);
        }
    }
    Ok(records)
}
