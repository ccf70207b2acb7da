//! Error types for songbook.
//!
//! The taxonomy mirrors the merge policy: per-entry failures are absorbed
//! by the pipeline loop and become skip records, while fatal conditions
//! propagate out of [`crate::pipeline::MergePipeline::merge`].
//!
//! - [`FetchError`]: one remote round trip failed. Every variant except
//!   `Auth` affects a single selection entry only.
//! - [`ParseError`]: downloaded bytes are not a usable PDF. Per-entry.
//! - [`PipelineError`]: the whole merge failed and no output exists.

use thiserror::Error;

/// Result type alias for fatal pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure of a single round trip to the remote store.
///
/// `Auth` is the only fatal variant: a rejected credential is rejected for
/// every remaining entry too, so the pipeline aborts instead of burning a
/// round trip per song. All other variants skip one entry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote store reports the identifier does not exist.
    #[error("document '{id}' not found in the remote store")]
    NotFound {
        /// Identifier that was requested.
        id: String,
    },

    /// The access credential was rejected (HTTP 401/403).
    #[error("access token rejected by the remote store: {detail}")]
    Auth {
        /// Server-side rejection detail.
        detail: String,
    },

    /// Network failure or server-side error (5xx and friends).
    #[error("transient fetch failure: {detail}")]
    Transient {
        /// What went wrong, for the skip record.
        detail: String,
    },

    /// The content stream ended before the declared length was reached.
    #[error("download ended early: received {received} of {expected} bytes")]
    IncompleteTransfer {
        /// Bytes actually received.
        received: u64,
        /// Bytes the server declared.
        expected: u64,
    },
}

impl FetchError {
    /// True if this failure invalidates the credential for all remaining
    /// entries and must abort the whole merge.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

/// The downloaded bytes are not a well-formed PDF.
///
/// Raised for corrupt or truncated bodies, documents with zero pages, and
/// files whose declared media type was a lie. Never corrupts the
/// accumulated output; the pipeline converts it into a skip.
#[derive(Debug, Error)]
#[error("not a well-formed PDF: {detail}")]
pub struct ParseError {
    /// Parser diagnostic.
    pub detail: String,
}

impl ParseError {
    pub(crate) fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Fatal outcome of a merge invocation. No output bytes exist when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The selection list itself was empty; nothing was ever attempted.
    #[error("no songs selected")]
    EmptySelection,

    /// Every entry in the selection was skipped; there is nothing to merge.
    #[error("none of the {attempted} selected songs could be merged")]
    NoValidInput {
        /// Number of entries that were attempted.
        attempted: usize,
    },

    /// The credential was rejected mid-run; the merge is abandoned whole.
    #[error("access token rejected: {detail}")]
    Auth {
        /// Server-side rejection detail.
        detail: String,
    },

    /// Serializing an output document with zero pages is undefined.
    #[error("refusing to serialize an output document with no pages")]
    EmptyOutput,

    /// lopdf failed to write the merged document out.
    #[error("failed to serialize merged document: {detail}")]
    Serialize {
        /// Writer diagnostic.
        detail: String,
    },
}

impl PipelineError {
    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::EmptySelection => 1,
            Self::NoValidInput { .. } => 3,
            Self::Auth { .. } => 4,
            Self::EmptyOutput => 5,
            Self::Serialize { .. } => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_not_found_display() {
        let err = FetchError::NotFound {
            id: "1A2b3C".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("1A2b3C"));
    }

    #[test]
    fn fetch_incomplete_transfer_display() {
        let err = FetchError::IncompleteTransfer {
            received: 512,
            expected: 2048,
        };
        let msg = err.to_string();
        assert!(msg.contains("512"));
        assert!(msg.contains("2048"));
    }

    #[test]
    fn only_auth_is_fatal() {
        assert!(
            FetchError::Auth {
                detail: "expired".into()
            }
            .is_fatal()
        );
        assert!(!FetchError::NotFound { id: "x".into() }.is_fatal());
        assert!(
            !FetchError::Transient {
                detail: "503".into()
            }
            .is_fatal()
        );
        assert!(
            !FetchError::IncompleteTransfer {
                received: 0,
                expected: 1,
            }
            .is_fatal()
        );
    }

    #[test]
    fn empty_selection_distinct_from_no_valid_input() {
        let empty = PipelineError::EmptySelection;
        let invalid = PipelineError::NoValidInput { attempted: 3 };
        assert_ne!(empty.to_string(), invalid.to_string());
        assert!(invalid.to_string().contains('3'));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(PipelineError::EmptySelection.exit_code(), 1);
        assert_eq!(PipelineError::NoValidInput { attempted: 2 }.exit_code(), 3);
        assert_eq!(
            PipelineError::Auth {
                detail: "nope".into()
            }
            .exit_code(),
            4
        );
        assert_eq!(PipelineError::EmptyOutput.exit_code(), 5);
    }
}
