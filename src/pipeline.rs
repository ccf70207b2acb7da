//! The fetch-and-merge pipeline.
//!
//! Drives resolver, remote store, and assembler over an ordered selection
//! of references. The failure-handling contract is the whole point:
//! skip invalid entries and continue, fail only when nothing could be
//! merged at all or when the credential itself is bad.
//!
//! Each entry folds to a tagged outcome, either appended or skipped with
//! a recorded reason, instead of threading `continue` through the loop.
//! The fetch phase may run a few entries ahead under a bounded,
//! order-preserving buffer; appends are always consumed in selection
//! order, so the output page order is exactly the selection order no
//! matter how fetch completions interleave.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::Local;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::drive::{AccessToken, RemoteStore};
use crate::error::{FetchError, PipelineError};
use crate::merge::DocumentAssembler;
use crate::{naming, resolve};

/// Why one selection entry was left out of the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No identifier of recognized shape in the reference string.
    Unresolvable,

    /// The store declared a media type other than PDF.
    WrongMediaType {
        /// The declared media type.
        mime_type: String,
    },

    /// The store does not know the identifier.
    NotFound,

    /// Network or server failure for this entry only.
    Transient {
        /// What went wrong.
        detail: String,
    },

    /// The body downloaded fine but is not a well-formed PDF.
    Malformed {
        /// Parser diagnostic.
        detail: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolvable => write!(f, "no file identifier found in reference"),
            Self::WrongMediaType { mime_type } => write!(f, "not a PDF ({mime_type})"),
            Self::NotFound => write!(f, "file not found"),
            Self::Transient { detail } => write!(f, "fetch failed: {detail}"),
            Self::Malformed { detail } => write!(f, "unreadable PDF: {detail}"),
        }
    }
}

/// Diagnostic record for one skipped selection entry.
#[derive(Debug, Clone)]
pub struct SkipRecord {
    /// Zero-based position in the selection list.
    pub index: usize,

    /// The reference string as the user supplied it.
    pub reference: String,

    /// Why the entry was skipped.
    pub reason: SkipReason,
}

/// Summary of a completed merge run.
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// Entries in the selection list.
    pub attempted: usize,

    /// Entries whose pages made it into the output.
    pub merged: usize,

    /// Total pages in the output document.
    pub total_pages: usize,

    /// One record per skipped entry, in selection order.
    pub skipped: Vec<SkipRecord>,

    /// Wall-clock time for the whole run.
    pub elapsed: Duration,
}

/// The product of a successful merge.
#[derive(Debug)]
pub struct MergeOutput {
    /// The complete merged PDF.
    pub bytes: Vec<u8>,

    /// Suggested filename, named for the next Sunday.
    pub filename: String,

    /// Diagnostics for the caller to surface or log.
    pub report: MergeReport,
}

/// Per-entry result of the fetch phase, before any append happens.
enum Fetched {
    Payload { name: String, bytes: Vec<u8> },
    Skip(SkipReason),
}

/// Orchestrates one merge over a remote store implementation.
pub struct MergePipeline<'a, S: RemoteStore> {
    store: &'a S,
    config: &'a PipelineConfig,
}

impl<'a, S: RemoteStore> MergePipeline<'a, S> {
    /// Create a pipeline borrowing a store and configuration.
    pub fn new(store: &'a S, config: &'a PipelineConfig) -> Self {
        Self { store, config }
    }

    /// Merge the referenced documents, in selection order, into one PDF.
    ///
    /// Every per-entry failure (unresolvable reference, wrong media type,
    /// not found, transient fetch failure, malformed body) skips that
    /// entry and is recorded in the report. A rejected credential aborts
    /// the whole run with no output.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::EmptySelection`] when `selection` has no entries.
    /// - [`PipelineError::Auth`] when the store rejects the credential.
    /// - [`PipelineError::NoValidInput`] when every entry was skipped.
    /// - [`PipelineError::Serialize`] when the output cannot be written.
    pub async fn merge(
        &self,
        selection: &[String],
        credential: &AccessToken,
    ) -> Result<MergeOutput, PipelineError> {
        if selection.is_empty() {
            return Err(PipelineError::EmptySelection);
        }

        let start = Instant::now();
        info!(songs = selection.len(), "starting merge");

        let jobs = self.config.jobs.max(1);
        let mut fetches = stream::iter(
            selection
                .iter()
                .map(|reference| self.fetch_entry(reference, credential)),
        )
        .buffered(jobs);

        let mut assembler = DocumentAssembler::new();
        let mut skipped = Vec::new();
        let mut merged = 0usize;
        let mut index = 0usize;

        while let Some(fetched) = fetches.next().await {
            let reference = &selection[index];
            match fetched? {
                Fetched::Payload { name, bytes } => match assembler.append(&bytes) {
                    Ok(pages) => {
                        debug!(index, name = %name, pages, "appended");
                        merged += 1;
                    }
                    Err(e) => {
                        warn!(index, name = %name, error = %e, "skipping malformed PDF");
                        skipped.push(SkipRecord {
                            index,
                            reference: reference.clone(),
                            reason: SkipReason::Malformed {
                                detail: e.detail,
                            },
                        });
                    }
                },
                Fetched::Skip(reason) => {
                    warn!(index, reference = %reference, reason = %reason, "skipping entry");
                    skipped.push(SkipRecord {
                        index,
                        reference: reference.clone(),
                        reason,
                    });
                }
            }
            index += 1;
        }

        if assembler.is_empty() {
            return Err(PipelineError::NoValidInput {
                attempted: selection.len(),
            });
        }

        let total_pages = assembler.page_count();
        let bytes = assembler.serialize()?;
        let filename = naming::output_filename(Local::now().date_naive());

        let report = MergeReport {
            attempted: selection.len(),
            merged,
            total_pages,
            skipped,
            elapsed: start.elapsed(),
        };
        info!(
            merged = report.merged,
            skipped = report.skipped.len(),
            pages = report.total_pages,
            filename = %filename,
            "merge complete"
        );

        Ok(MergeOutput {
            bytes,
            filename,
            report,
        })
    }

    /// Resolve, gate on media type, and download one entry.
    ///
    /// Per-entry failures come back as `Fetched::Skip`; only the fatal
    /// `Auth` class propagates as an error.
    async fn fetch_entry(
        &self,
        reference: &str,
        credential: &AccessToken,
    ) -> Result<Fetched, PipelineError> {
        let Some(id) = resolve::resolve(reference) else {
            return Ok(Fetched::Skip(SkipReason::Unresolvable));
        };

        let metadata = match self.store.fetch_metadata(&id, credential).await {
            Ok(metadata) => metadata,
            Err(e) => return Ok(Fetched::Skip(classify_fetch(e)?)),
        };

        if !metadata.is_pdf() {
            return Ok(Fetched::Skip(SkipReason::WrongMediaType {
                mime_type: metadata.mime_type,
            }));
        }

        match self.store.fetch_content(&id, credential).await {
            Ok(bytes) => Ok(Fetched::Payload {
                name: metadata.name,
                bytes,
            }),
            Err(e) => Ok(Fetched::Skip(classify_fetch(e)?)),
        }
    }
}

/// Split fetch failures into skip reasons and the fatal auth case.
fn classify_fetch(error: FetchError) -> Result<SkipReason, PipelineError> {
    match error {
        FetchError::Auth { detail } => Err(PipelineError::Auth { detail }),
        FetchError::NotFound { .. } => Ok(SkipReason::NotFound),
        FetchError::Transient { detail } => Ok(SkipReason::Transient { detail }),
        FetchError::IncompleteTransfer { received, expected } => Ok(SkipReason::Transient {
            detail: format!("download ended early ({received}/{expected} bytes)"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_reason_display() {
        assert_eq!(
            SkipReason::Unresolvable.to_string(),
            "no file identifier found in reference"
        );
        assert!(
            SkipReason::WrongMediaType {
                mime_type: "image/png".into()
            }
            .to_string()
            .contains("image/png")
        );
        assert!(SkipReason::NotFound.to_string().contains("not found"));
    }

    #[test]
    fn classify_splits_fatal_from_skippable() {
        assert!(matches!(
            classify_fetch(FetchError::Auth {
                detail: "bad".into()
            }),
            Err(PipelineError::Auth { .. })
        ));
        assert_eq!(
            classify_fetch(FetchError::NotFound { id: "x".into() }).unwrap(),
            SkipReason::NotFound
        );
        assert!(matches!(
            classify_fetch(FetchError::IncompleteTransfer {
                received: 1,
                expected: 2
            })
            .unwrap(),
            SkipReason::Transient { .. }
        ));
    }
}
