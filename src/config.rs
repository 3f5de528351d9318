use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Neutral mid-grey, RGB (127, 127, 127) normalised
pub const DEFAULT_GREY_LEVEL: f32 = 127.0 / 255.0;

/// Keyframe slots the insert node exposes
pub const DEFAULT_MAX_KEYFRAMES: usize = 5;

/// Upper bound on splice offsets; large offsets mean large grey gap fills
pub const DEFAULT_MAX_OFFSET: u32 = 2000;

/// Main configuration for vace-sequence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keyframe insertion settings
    pub keyframe: KeyframeConfig,

    /// Sequence splicing settings
    pub splice: SpliceConfig,

    /// Fill colour used for gaps and grey ranges
    pub fill: FillConfig,

    /// Parallel processing settings
    pub processing: ProcessingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.keyframe.validate()?;
        self.fill.validate()?;
        self.processing.validate()?;
        Ok(())
    }
}

/// Keyframe insertion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyframeConfig {
    /// Maximum keyframes (and positions) accepted per call
    pub max_slots: usize,

    /// Mask value written at keyframe positions (0.0 = editable)
    pub mask_value: f32,
}

impl Default for KeyframeConfig {
    fn default() -> Self {
        Self {
            max_slots: DEFAULT_MAX_KEYFRAMES,
            mask_value: 0.0,
        }
    }
}

impl KeyframeConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.max_slots) {
            return Err(ConfigError::InvalidValue {
                key: "keyframe.max_slots".to_string(),
                value: self.max_slots.to_string()
            }.into());
        }

        if !(0.0..=1.0).contains(&self.mask_value) {
            return Err(ConfigError::InvalidValue {
                key: "keyframe.mask_value".to_string(),
                value: self.mask_value.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Sequence splicing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpliceConfig {
    /// Largest accepted frame offset for sequence2
    pub max_offset: u32,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            max_offset: DEFAULT_MAX_OFFSET,
        }
    }
}

/// Fill colour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Level written to every channel of gap and grey frames
    pub grey_level: f32,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            grey_level: DEFAULT_GREY_LEVEL,
        }
    }
}

impl FillConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.grey_level) {
            return Err(ConfigError::InvalidValue {
                key: "fill.grey_level".to_string(),
                value: self.grey_level.to_string()
            }.into());
        }
        Ok(())
    }
}

/// Parallel processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of worker threads for per-frame work
    pub threads: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
        }
    }
}

impl ProcessingConfig {
    fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "processing.threads".to_string(),
                value: self.threads.to_string()
            }.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.keyframe.max_slots, 5);
        assert_eq!(config.splice.max_offset, 2000);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original_config = Config::default();
        original_config.keyframe.mask_value = 0.25;
        original_config.splice.max_offset = 64;

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(loaded_config.keyframe.mask_value, 0.25);
        assert_eq!(loaded_config.splice.max_offset, 64);
        assert_eq!(original_config.fill.grey_level, loaded_config.fill.grey_level);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[splice]\nmax_offset = 10\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.splice.max_offset, 10);
        assert_eq!(config.keyframe.max_slots, DEFAULT_MAX_KEYFRAMES);
    }

    #[test]
    fn test_invalid_mask_value() {
        let mut config = Config::default();
        config.keyframe.mask_value = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_grey_level() {
        let mut config = Config::default();
        config.fill.grey_level = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.user_message().contains("not found"));
    }
}
