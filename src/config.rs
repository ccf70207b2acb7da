//! Pipeline configuration.
//!
//! One plain struct drives a merge run. Defaults are chosen for a handful
//! of song sheets fetched over a residential connection; callers that
//! embed the library in a request handler will usually lower the timeout.

use std::time::Duration;

use anyhow::{Result, bail};

/// Settings for one merge run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How many entries may be in flight in the fetch phase at once.
    ///
    /// Appends are always applied in selection order regardless of this
    /// value; `1` makes the whole pipeline strictly sequential.
    pub jobs: usize,

    /// Per-request timeout for the remote store.
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `jobs` is zero or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            bail!("Number of jobs must be at least 1");
        }

        if self.request_timeout.is_zero() {
            bail!("Request timeout must be non-zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.jobs, 4);
    }

    #[test]
    fn zero_jobs_rejected() {
        let config = PipelineConfig {
            jobs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = PipelineConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
