//! TOML configuration for the inspector.
//!
//! ```toml
//! [codec]
//! head = [0x57, 0xAB]
//! address = 0
//! verify_checksum = false
//!
//! [tool]
//! log_level = "info"
//! ```
//!
//! Both tables and every key are optional; missing values fall back to the
//! chip's factory defaults.

use std::path::{Path, PathBuf};

use ch9329_core::CodecConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolConfig {
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub tool: ToolSettings,
}

/// Settings for the binary itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSettings {
    /// `tracing` filter used when `RUST_LOG` is unset, e.g. `"debug"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parses a configuration from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed.
pub fn parse_config(text: &str) -> Result<ToolConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Loads a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, including when it
/// does not exist, and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

impl ToolConfig {
    /// Renders the configuration as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_defaults() {
        let cfg = parse_config("").expect("empty config parses");
        assert_eq!(cfg, ToolConfig::default());
        assert_eq!(cfg.codec.head, [0x57, 0xAB]);
        assert_eq!(cfg.tool.log_level, "info");
    }

    #[test]
    fn test_partial_codec_table_keeps_other_defaults() {
        let cfg = parse_config("[codec]\naddress = 3\n").unwrap();
        assert_eq!(cfg.codec.address, 3);
        assert_eq!(cfg.codec.head, [0x57, 0xAB]);
        assert!(!cfg.codec.verify_checksum);
    }

    #[test]
    fn test_hex_integers_in_head_are_accepted() {
        let cfg = parse_config("[codec]\nhead = [0x57, 0xAC]\nverify_checksum = true\n").unwrap();
        assert_eq!(cfg.codec.head, [0x57, 0xAC]);
        assert!(cfg.codec.verify_checksum);
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let result = parse_config("[codec\naddress = 1");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_out_of_range_address_is_a_parse_error() {
        let result = parse_config("[codec]\naddress = 300\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_serializes_and_deserializes_round_trip() {
        let mut cfg = ToolConfig::default();
        cfg.codec.address = 0x02;
        cfg.tool.log_level = "debug".to_string();

        let text = cfg.to_toml().expect("serialize");
        let restored = parse_config(&text).expect("deserialize");

        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = load_config(Path::new("/nonexistent/ch9329/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
