//! Typed errors for a sync run.
//!
//! Uses `thiserror` for the library taxonomy. Only the fatal kinds stop a
//! run; everything else is absorbed per record and shows up in the tally.

use thiserror::Error;

/// Everything that can go wrong between schema discovery and the last write.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Target schema could not be fetched
    #[error("schema unavailable: {0}")]
    SchemaUnavailable(String),

    /// No schema column could be matched to the record title
    #[error("no column matches the required title field (`name`)")]
    MissingRequiredTitleField,

    /// Listing document could not be fetched
    #[error("listing unavailable: {0}")]
    ListingUnavailable(String),

    /// Listing fragment without a usable repository identity
    #[error("fragment unparseable: {reason}")]
    FragmentUnparseable { reason: String },

    /// Summary could not be produced for a repository
    #[error("enrichment unavailable for {repo}: {reason}")]
    EnrichmentUnavailable { repo: String, reason: String },

    /// Serialization produced no writable properties
    #[error("no writable properties for {repo}")]
    SerializationEmpty { repo: String },

    /// The store refused the record, or the request never completed
    #[error("write rejected{}: {message}", status_suffix(.status))]
    WriteRejected {
        status: Option<u16>,
        message: String,
    },
}

impl SyncError {
    /// Fatal errors abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::SchemaUnavailable(_)
                | SyncError::MissingRequiredTitleField
                | SyncError::ListingUnavailable(_)
        )
    }

    pub(crate) fn unparseable(reason: impl Into<String>) -> Self {
        SyncError::FragmentUnparseable {
            reason: reason.into(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}
