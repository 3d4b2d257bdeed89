/// Outcome definitions for catalog identifiers
///
/// Every processed identifier ends in exactly one `OutcomeRecord`. The status
/// carries its own retry classification so retry mode never has to interpret
/// free-text details.
use crate::CatalogId;
use std::fmt;

/// Final status of one catalog identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    // ===== Success States =====
    /// Archive for the exact device tag was downloaded
    Success,

    /// Tag absent; the largest listed archive was downloaded instead
    SuccessFallback,

    // ===== Permanent Failure States =====
    /// Neither the exact tag nor any sized fallback download exists
    FailureNoMatch,

    /// Exact tag present but the page has no download link
    FailureNoDownloadLink,

    // ===== Transient Failure States =====
    /// Network failure, timeout, or any fault raised while processing
    FailureTransport,

    /// Catalog page returned a non-success HTTP status
    FailureHttpError,

    /// A link was selected but the archive transfer failed
    FailureDownload,
}

impl OutcomeStatus {
    /// Returns true if an archive was stored for this identifier
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::SuccessFallback)
    }

    /// Returns true if a later retry run may succeed
    ///
    /// The catalog entry was reached and definitively has nothing usable for
    /// `FailureNoMatch` and `FailureNoDownloadLink`, so those are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FailureTransport | Self::FailureHttpError | Self::FailureDownload
        )
    }

    /// Returns true for failures caused by moving bytes rather than page content
    pub fn is_transport_class(&self) -> bool {
        matches!(self, Self::FailureTransport | Self::FailureDownload)
    }

    /// The outcome text written after the identifier in a run log line
    pub fn log_label(&self) -> &'static str {
        match self {
            Self::Success => "yay",
            Self::SuccessFallback => "yay (largest available)",
            Self::FailureNoMatch => "nay (no working .jar)",
            Self::FailureNoDownloadLink => "nay (no downloads found)",
            Self::FailureTransport | Self::FailureHttpError => "nay (error)",
            Self::FailureDownload => "nay (download failed)",
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Success,
            Self::SuccessFallback,
            Self::FailureNoMatch,
            Self::FailureNoDownloadLink,
            Self::FailureTransport,
            Self::FailureHttpError,
            Self::FailureDownload,
        ]
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.log_label())
    }
}

/// The single outcome of processing one catalog identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRecord {
    pub id: CatalogId,
    pub status: OutcomeStatus,
    /// Free-text diagnostic, written to the log only for transport failures
    pub detail: Option<String>,
}

impl OutcomeRecord {
    pub fn new(id: CatalogId, status: OutcomeStatus, detail: Option<String>) -> Self {
        Self { id, status, detail }
    }

    pub fn success(id: CatalogId) -> Self {
        Self::new(id, OutcomeStatus::Success, None)
    }

    pub fn fallback(id: CatalogId) -> Self {
        Self::new(id, OutcomeStatus::SuccessFallback, None)
    }

    pub fn no_match(id: CatalogId) -> Self {
        Self::new(id, OutcomeStatus::FailureNoMatch, None)
    }

    pub fn no_download_link(id: CatalogId) -> Self {
        Self::new(id, OutcomeStatus::FailureNoDownloadLink, None)
    }

    pub fn http_error(id: CatalogId, status_code: u16) -> Self {
        Self::new(
            id,
            OutcomeStatus::FailureHttpError,
            Some(format!("HTTP {}", status_code)),
        )
    }

    pub fn transport(id: CatalogId, detail: impl Into<String>) -> Self {
        Self::new(id, OutcomeStatus::FailureTransport, Some(detail.into()))
    }

    pub fn download_failed(id: CatalogId, detail: impl Into<String>) -> Self {
        Self::new(id, OutcomeStatus::FailureDownload, Some(detail.into()))
    }

    /// Renders the record as a single run log line (without newline)
    pub fn to_log_line(&self) -> String {
        match (&self.status, &self.detail) {
            (OutcomeStatus::FailureTransport, Some(detail)) => {
                // Detail must stay on one line or the log stops being line-oriented
                let detail = detail.replace(['\r', '\n'], " ");
                format!("{}: {}, {}", self.id, self.status.log_label(), detail)
            }
            _ => format!("{}: {}", self.id, self.status.log_label()),
        }
    }

    /// Parses a run log record line
    ///
    /// Returns `None` for anything that is not `<id>: yay...` or `<id>: nay...`.
    /// Unknown `nay` texts are read as transport failures so they stay retryable.
    pub fn from_log_line(line: &str) -> Option<Self> {
        let (id_part, outcome) = line.trim().split_once(": ")?;
        let id: CatalogId = id_part.parse().ok()?;
        let outcome = outcome.trim();

        let record = match outcome {
            "yay" => Self::success(id),
            "yay (largest available)" => Self::fallback(id),
            "nay (no working .jar)" => Self::no_match(id),
            "nay (no downloads found)" => Self::no_download_link(id),
            "nay (download failed)" => Self::new(id, OutcomeStatus::FailureDownload, None),
            "nay (error)" => Self::new(id, OutcomeStatus::FailureHttpError, None),
            _ => {
                if let Some(detail) = outcome.strip_prefix("nay (error), ") {
                    Self::transport(id, detail)
                } else if let Some(rest) = outcome.strip_prefix("nay") {
                    Self::transport(id, rest.trim())
                } else if outcome.starts_with("yay") {
                    Self::success(id)
                } else {
                    return None;
                }
            }
        };

        Some(record)
    }
}

impl fmt::Display for OutcomeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_log_line())
    }
}
