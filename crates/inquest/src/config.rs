//! Library configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{InquestError, Result};
use crate::input::ParserConfig;
use crate::profile::ProfileConfig;
use crate::scoring::ScoringConfig;
use crate::selection::AllocatorConfig;

/// Candidate generation and scheduling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Candidates requested per quota slot.
    pub overgeneration_factor: f64,
    /// Minimum candidates requested beyond the quota.
    pub min_extra: usize,
    /// Timeout for each online request, in seconds.
    pub request_timeout_secs: u64,
    /// Dataset pipelines run at once.
    pub max_concurrent_datasets: usize,
    /// Online requests allowed per orchestrator (None = unlimited).
    pub request_budget: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            overgeneration_factor: 1.3,
            min_extra: 2,
            request_timeout_secs: 60,
            max_concurrent_datasets: 4,
            request_budget: None,
        }
    }
}

impl GenerationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Everything the orchestrator needs to know.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InquestConfig {
    pub parser: ParserConfig,
    pub profile: ProfileConfig,
    pub generation: GenerationConfig,
    pub scoring: ScoringConfig,
    pub allocator: AllocatorConfig,
}

impl InquestConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| InquestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let generation = &self.generation;
        if !generation.overgeneration_factor.is_finite() || generation.overgeneration_factor < 1.0 {
            return Err(InquestError::Config(format!(
                "overgeneration_factor must be at least 1.0, got {}",
                generation.overgeneration_factor
            )));
        }
        if generation.max_concurrent_datasets == 0 {
            return Err(InquestError::Config(
                "max_concurrent_datasets must be at least 1".to_string(),
            ));
        }
        if generation.request_timeout_secs == 0 {
            return Err(InquestError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.scoring.threshold) {
            return Err(InquestError::Config(format!(
                "scoring threshold must be within 0..=1, got {}",
                self.scoring.threshold
            )));
        }
        self.allocator.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = InquestConfig::default();
        assert_eq!(config.generation.max_concurrent_datasets, 4);
        assert_eq!(config.generation.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.scoring.max_retries, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"generation": {{"request_budget": 10}}, "scoring": {{"threshold": 0.8}}}}"#
        )
        .unwrap();

        let config = InquestConfig::from_file(file.path()).unwrap();
        assert_eq!(config.generation.request_budget, Some(10));
        assert_eq!(config.generation.overgeneration_factor, 1.3);
        assert_eq!(config.scoring.threshold, 0.8);
        assert_eq!(config.scoring.max_retries, 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = InquestConfig::default();
        config.generation.max_concurrent_datasets = 0;
        assert!(matches!(config.validate(), Err(InquestError::Config(_))));

        let mut config = InquestConfig::default();
        config.generation.overgeneration_factor = 0.5;
        assert!(config.validate().is_err());
    }
}
