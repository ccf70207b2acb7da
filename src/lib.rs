//! songbook - Fetch song sheets from Google Drive and merge them into a
//! single set-list PDF.
//!
//! Given an ordered selection of Drive sharing links (or bare file IDs)
//! and an OAuth access token, the pipeline downloads each file, checks it
//! really is a PDF, and appends its pages to one output document. Page
//! order in the output is exactly selection order. Bad entries (links
//! with no recognizable file ID, non-PDF files, missing files, corrupt
//! downloads) are skipped and recorded, not fatal; the merge only fails
//! outright when the token is rejected or nothing at all could be merged.
//!
//! The output is named after the next Sunday (`YYYY-MM-DD.pdf`), because
//! that is when the set will be sung.
//!
//! # Examples
//!
//! ```no_run
//! use songbook::config::PipelineConfig;
//! use songbook::drive::{AccessToken, DriveClient};
//! use songbook::pipeline::MergePipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let client = DriveClient::new(&config)?;
//! let pipeline = MergePipeline::new(&client, &config);
//!
//! let selection = vec![
//!     "https://drive.google.com/file/d/1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms/view".to_string(),
//! ];
//! let token = AccessToken::new(std::env::var("DRIVE_ACCESS_TOKEN")?);
//!
//! let output = pipeline.merge(&selection, &token).await?;
//! tokio::fs::write(&output.filename, &output.bytes).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod drive;
pub mod error;
pub mod merge;
pub mod naming;
pub mod pipeline;
pub mod resolve;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use drive::{AccessToken, DriveClient, RemoteId, RemoteStore};
pub use error::{FetchError, ParseError, PipelineError, Result};
pub use pipeline::{MergeOutput, MergePipeline, MergeReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
