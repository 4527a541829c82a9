//! Segment configuration
//!
//! Declarative description of one segment, read from TOML:
//!
//! ```toml
//! name = "/seg_a"
//! size = 256
//! exclusive = true
//! mode = 0o600
//! read_only = false
//! ```
//!
//! Everything but `name` is optional and falls back to [`CreateOptions::default`].

use crate::error::{ShmError, ShmResult};
use crate::memory::{CreateOptions, DEFAULT_MODE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One shared memory segment as described in a config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Name passed to `shm_open` unchanged
    pub name: String,
    /// Size in bytes; 0 keeps whatever size the object has
    #[serde(default)]
    pub size: usize,
    /// Fail if the segment already exists
    #[serde(default = "default_exclusive")]
    pub exclusive: bool,
    /// Permission bits for a newly created segment
    #[serde(default = "default_mode")]
    pub mode: u32,
    /// Open and map without write access
    #[serde(default)]
    pub read_only: bool,
}

fn default_exclusive() -> bool {
    true
}

fn default_mode() -> u32 {
    DEFAULT_MODE
}

impl SegmentConfig {
    /// Config for `name` with default options
    pub fn new(name: impl Into<String>) -> Self {
        let options = CreateOptions::default();
        Self {
            name: name.into(),
            size: options.size,
            exclusive: options.exclusive,
            mode: options.mode,
            read_only: false,
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> ShmResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ShmError::Config(format!("Failed to parse segment config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> ShmResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ShmError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> ShmResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ShmError::Config(format!("Failed to serialize segment config: {}", e)))
    }

    pub fn validate(&self) -> ShmResult<()> {
        if self.name.is_empty() {
            return Err(ShmError::InvalidArgument("name is empty".to_string()));
        }
        Ok(())
    }

    /// Options for the create path
    pub fn create_options(&self) -> CreateOptions {
        CreateOptions {
            size: self.size,
            exclusive: self.exclusive,
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = SegmentConfig::from_toml_str(r#"name = "/seg_a""#).unwrap();
        assert_eq!(config, SegmentConfig::new("/seg_a"));
        assert_eq!(config.create_options(), CreateOptions::default());
    }

    #[test]
    fn test_full_config() {
        let config = SegmentConfig::from_toml_str(
            r#"
            name = "/seg_b"
            size = 4096
            exclusive = false
            mode = 0o640
            read_only = true
            "#,
        )
        .unwrap();

        assert_eq!(config.size, 4096);
        assert!(!config.exclusive);
        assert!(config.read_only);
        assert_eq!(config.create_options().permission_bits(), 0o640);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = SegmentConfig::from_toml_str(r#"name = """#).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_missing_name_is_config_error() {
        let err = SegmentConfig::from_toml_str("size = 16").unwrap_err();
        assert!(matches!(err, ShmError::Config(_)));
    }

    #[test]
    fn test_toml_round_trip_keeps_options() {
        let mut config = SegmentConfig::new("/seg_c");
        config.size = 128;
        let text = config.to_toml_string().unwrap();
        assert_eq!(SegmentConfig::from_toml_str(&text).unwrap(), config);
    }
}
