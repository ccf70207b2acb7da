//! Google Drive v3 implementation of [`RemoteStore`].
//!
//! Two endpoints are used per file: `files/{id}?fields=id,name,mimeType`
//! for metadata and `files/{id}?alt=media` for content. Content bodies
//! are drained chunk by chunk so a merge never holds more than one
//! document's bytes in flight. No retries happen here; retry policy, if
//! any, belongs to the caller.

use futures::StreamExt;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::drive::{AccessToken, DocumentMetadata, RemoteId, RemoteStore};
use crate::error::FetchError;

const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// HTTP client for the Drive files API.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    base_url: String,
}

impl DriveClient {
    /// Create a client against the real Drive API.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the TLS backend cannot be
    /// initialized.
    pub fn new(config: &PipelineConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: DRIVE_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different base URL. Used by tests to run
    /// against a local stand-in server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send(
        &self,
        url: &str,
        id: &RemoteId,
        credential: &AccessToken,
    ) -> Result<reqwest::Response, FetchError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(credential.secret())
            .send()
            .await
            .map_err(|e| FetchError::Transient {
                detail: e.to_string(),
            })?;

        classify_status(response.status(), id)?;
        Ok(response)
    }
}

impl RemoteStore for DriveClient {
    async fn fetch_metadata(
        &self,
        id: &RemoteId,
        credential: &AccessToken,
    ) -> Result<DocumentMetadata, FetchError> {
        let url = format!("{}/files/{}?fields=id,name,mimeType", self.base_url, id);
        let response = self.send(&url, id, credential).await?;

        let metadata: DocumentMetadata =
            response.json().await.map_err(|e| FetchError::Transient {
                detail: format!("invalid metadata response: {e}"),
            })?;

        debug!(id = %id, name = %metadata.name, mime = %metadata.mime_type, "fetched metadata");
        Ok(metadata)
    }

    async fn fetch_content(
        &self,
        id: &RemoteId,
        credential: &AccessToken,
    ) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}/files/{}?alt=media", self.base_url, id);
        let response = self.send(&url, id, credential).await?;

        let expected = response.content_length();
        let mut buffer = Vec::with_capacity(expected.unwrap_or(0) as usize);

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Transient {
                detail: e.to_string(),
            })?;
            buffer.extend_from_slice(&chunk);
        }

        if let Some(expected) = expected
            && (buffer.len() as u64) < expected
        {
            return Err(FetchError::IncompleteTransfer {
                received: buffer.len() as u64,
                expected,
            });
        }

        debug!(id = %id, bytes = buffer.len(), "downloaded content");
        Ok(buffer)
    }
}

/// Map a Drive response status onto the fetch error taxonomy.
///
/// 401/403 mean the token is bad for every remaining file too, so they
/// classify as the fatal `Auth` variant. Everything else non-success is a
/// per-entry condition.
fn classify_status(status: StatusCode, id: &RemoteId) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Auth {
            detail: format!("HTTP {status}"),
        },
        StatusCode::NOT_FOUND => FetchError::NotFound {
            id: id.to_string(),
        },
        _ => FetchError::Transient {
            detail: format!("HTTP {status}"),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> RemoteId {
        RemoteId::new("1BxiMVs0XRA5nFMdKvBdBZjgm")
    }

    #[test]
    fn success_statuses_pass() {
        assert!(classify_status(StatusCode::OK, &id()).is_ok());
        assert!(classify_status(StatusCode::PARTIAL_CONTENT, &id()).is_ok());
    }

    #[test]
    fn auth_statuses_are_fatal() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = classify_status(status, &id()).unwrap_err();
            assert!(err.is_fatal(), "{status} should be fatal");
        }
    }

    #[test]
    fn not_found_carries_the_id() {
        let err = classify_status(StatusCode::NOT_FOUND, &id()).unwrap_err();
        match err {
            FetchError::NotFound { id } => assert!(id.contains("1BxiMVs0")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn server_errors_are_transient() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::TOO_MANY_REQUESTS,
        ] {
            let err = classify_status(status, &id()).unwrap_err();
            assert!(
                matches!(err, FetchError::Transient { .. }),
                "{status} should be transient"
            );
        }
    }

    #[test]
    fn client_builds_with_default_config() {
        let client = DriveClient::new(&PipelineConfig::default()).unwrap();
        assert!(client.base_url.starts_with("https://www.googleapis.com"));
    }

    #[test]
    fn base_url_can_be_overridden() {
        let client = DriveClient::new(&PipelineConfig::default())
            .unwrap()
            .with_base_url("http://127.0.0.1:9999/drive");
        assert_eq!(client.base_url, "http://127.0.0.1:9999/drive");
    }
}
