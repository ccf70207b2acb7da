//! The remote store capability and its Google Drive implementation.
//!
//! The pipeline depends on a deliberately narrow surface: resolve an
//! identifier to metadata, and to a fully drained byte buffer. Anything
//! that can do those two things, whether the real Drive API or an
//! in-memory fake in the tests, can feed the merge.

pub mod client;

pub use client::DriveClient;

use std::fmt;

use serde::Deserialize;

use crate::error::FetchError;

/// The only media type the pipeline will merge. Files declaring anything
/// else are silently skipped, not rejected.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A canonical remote file identifier, extracted from a user reference by
/// [`crate::resolve::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteId(String);

impl RemoteId {
    /// Wrap an already-extracted identifier token.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bearer credential for the remote store.
///
/// `Debug` is implemented by hand so the secret can never leak through
/// logging or error formatting.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw OAuth access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for constructing the Authorization header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Metadata the store declares for a file, fetched before its content.
///
/// The declared media type alone decides whether the content is ever
/// downloaded; no existence or content check happens locally.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Human-readable file name, used in diagnostics only.
    pub name: String,

    /// Declared media type, matched against [`PDF_MEDIA_TYPE`].
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl DocumentMetadata {
    /// True if the declared media type is the accepted one.
    pub fn is_pdf(&self) -> bool {
        self.mime_type == PDF_MEDIA_TYPE
    }
}

/// The narrow remote store capability the pipeline consumes.
pub trait RemoteStore {
    /// Fetch name and declared media type for `id`.
    ///
    /// # Errors
    ///
    /// [`FetchError::NotFound`] if the store does not know the identifier,
    /// [`FetchError::Auth`] if the credential is rejected,
    /// [`FetchError::Transient`] for network or server failures.
    fn fetch_metadata(
        &self,
        id: &RemoteId,
        credential: &AccessToken,
    ) -> impl Future<Output = Result<DocumentMetadata, FetchError>>;

    /// Fetch the full binary content of `id` into one buffer.
    ///
    /// Implementations must drain the body incrementally so memory stays
    /// bounded to one document at a time.
    ///
    /// # Errors
    ///
    /// Same classes as [`RemoteStore::fetch_metadata`], plus
    /// [`FetchError::IncompleteTransfer`] when the stream ends before the
    /// declared length.
    fn fetch_content(
        &self,
        id: &RemoteId,
        credential: &AccessToken,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>>;
}
