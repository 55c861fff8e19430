//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce `ClientConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("logger.toml")).unwrap();
//! println!("Address: {}", config.transport.address);
//! ```

mod parser;
mod validator;

pub use contracts::ClientConfig;
pub use parser::ConfigFormat;

use contracts::LoggingError;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ClientConfig, LoggingError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<ClientConfig, LoggingError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    pub fn to_toml(config: &ClientConfig) -> Result<String, LoggingError> {
        toml::to_string_pretty(config)
            .map_err(|e| LoggingError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(config: &ClientConfig) -> Result<String, LoggingError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| LoggingError::config_parse(format!("JSON serialize error: {e}")))
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat, LoggingError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            LoggingError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            LoggingError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}
