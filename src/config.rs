//! YAML configuration file support for VOFP.
//!
//! One file configures every stage. Missing sections and missing fields fall
//! back to the reference defaults.
//!
//! ## Example YAML configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "production"
//!
//! video:
//!   frame_samples: 64
//!   motion_bins: 16
//!   visual_weight: 1.0
//!   motion_weight: 0.6
//!   features:
//!     hash_size: 8
//!     edge_grid: 4
//!     hsv_bins: [8, 8, 8]
//!     center_crop_margin: 0.06
//!
//! decision:
//!   not_original_threshold: 0.90
//!   hamming_close_bits: 10
//!   overlap_threshold: 0.25
//!   candidate_cache_capacity: 32
//!
//! ingest:
//!   work_dir: "/var/tmp/vofp"
//!   timeout_secs: 300
//!
//! index:
//!   backend: "redb"
//!   path: "data/vofp.redb"
//! ```

use std::fs;
use std::path::Path;

use index::BackendConfig;
use ingest::IngestConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use video::VideoConfig;

use crate::pipeline::DecisionConfig;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VofpConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Sampling, per-frame features and aggregation weights.
    #[serde(default)]
    pub video: VideoConfig,

    /// Thresholds of the originality decision.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Download behaviour.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Corpus storage.
    #[serde(default)]
    pub index: IndexYamlConfig,
}

impl VofpConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: VofpConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the version and every section.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.video
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("video: {e}")))?;
        self.decision
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("decision: {e}")))?;
        self.ingest
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("ingest: {e}")))?;
        self.index.validate()?;
        Ok(())
    }
}

impl Default for VofpConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            video: VideoConfig::default(),
            decision: DecisionConfig::default(),
            ingest: IngestConfig::default(),
            index: IndexYamlConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IndexBackendKind {
    #[default]
    Redb,
    InMemory,
}

/// Index section YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexYamlConfig {
    #[serde(default)]
    pub backend: IndexBackendKind,

    /// Database file for the redb backend.
    #[serde(default = "default_index_path")]
    pub path: String,
}

impl IndexYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.backend == IndexBackendKind::Redb && self.path.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "index.path must be set for the redb backend".into(),
            ));
        }
        Ok(())
    }

    pub fn backend_config(&self) -> BackendConfig {
        match self.backend {
            IndexBackendKind::Redb => BackendConfig::redb(self.path.clone()),
            IndexBackendKind::InMemory => BackendConfig::in_memory(),
        }
    }
}

impl Default for IndexYamlConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackendKind::default(),
            path: default_index_path(),
        }
    }
}

fn default_index_path() -> String {
    "data/vofp.redb".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
video:
  frame_samples: 32
decision:
  not_original_threshold: 0.85
"#;

        let config = VofpConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.video.frame_samples, 32);
        assert_eq!(config.video.motion_bins, 16);
        assert!((config.decision.not_original_threshold - 0.85).abs() < 1e-6);
        assert_eq!(config.decision.hamming_close_bits, 10);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
index:
  backend: "in_memory"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = VofpConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.index.backend_config(), BackendConfig::InMemory);
    }

    #[test]
    fn test_default_config() {
        let config = VofpConfig::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.video.fingerprint_len(), 736);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.index.backend_config(),
            BackendConfig::redb("data/vofp.redb")
        );
    }

    #[test]
    fn test_unsupported_version() {
        let result = VofpConfig::from_yaml("version: \"2\"\n");
        assert!(matches!(
            result,
            Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2"
        ));
    }

    #[test]
    fn test_section_validation_names_the_section() {
        let yaml = r#"
version: "1.0"
video:
  features:
    hash_size: 12
"#;
        let err = VofpConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("video"));

        let yaml = r#"
version: "1.0"
decision:
  overlap_threshold: 2.0
"#;
        let err = VofpConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("decision"));
    }

    #[test]
    fn test_redb_requires_path() {
        let yaml = r#"
version: "1.0"
index:
  backend: "redb"
  path: ""
"#;
        assert!(matches!(
            VofpConfig::from_yaml(yaml),
            Err(ConfigLoadError::Validation(_))
        ));
    }
}
