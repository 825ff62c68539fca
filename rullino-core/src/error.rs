use thiserror::Error;

/// Unified error type for the rullino workspace.
///
/// Covers argument validation, wire-protocol violations, connector-tagged
/// transport failures, not-found conditions, and unsupported capabilities.
/// A store that simply runs out of records is *not* an error; the paging
/// engine ends the sequence instead.
#[derive(Debug, Error)]
pub enum RullinoError {
    /// Invalid input argument (bad date range, missing builder field, ...).
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with returned data (missing or malformed wire fields).
    #[error("data issue: {0}")]
    Data(String),

    /// A child record's foreign key did not resolve within its page.
    ///
    /// Fatal for the current stream: skipping the record would desynchronize
    /// offset advancement in the fetch loop.
    #[error("protocol violation: asset {record} references missing master {master}")]
    Protocol {
        /// Record name of the orphaned asset record.
        record: String,
        /// Record name of the master it references.
        master: String,
    },

    /// An individual connector call failed (network error, non-success status).
    #[error("{connector} failed: {msg}")]
    Transport {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A resource (album, folder, media version) could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "album Holidays".
        what: String,
    },

    /// The requested capability is not implemented by the target connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "media/delete").
        capability: &'static str,
    },
}

impl RullinoError {
    /// Helper: build a `Transport` error with the connector name and message.
    pub fn transport(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Transport {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `Protocol` error for an asset whose master is absent.
    pub fn protocol(record: impl Into<String>, master: impl Into<String>) -> Self {
        Self::Protocol {
            record: record.into(),
            master: master.into(),
        }
    }

    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub const fn unsupported(cap: &'static str) -> Self {
        Self::Unsupported { capability: cap }
    }
}
