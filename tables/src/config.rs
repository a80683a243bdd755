//! Configuration.
//!
//! Constants live here. Server settings can be overridden from the
//! environment (or a `.env` file loaded by the binary):
//!
//! | variable           | default   |
//! |--------------------|-----------|
//! | `ASSOC_PORT`       | `3000`    |
//! | `ASSOC_MAX_UPLOAD` | `1048576` |

use serde::{Deserialize, Serialize};

use crate::api::logs::log_warning;
use crate::parser::LineOffset;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum accepted upload size (in bytes). Tables are tiny; 1 MB is plenty.
pub const MAX_UPLOAD_SIZE: usize = 1024 * 1024;

/// Capacity of the log broadcast channel.
pub const LOG_CHANNEL_CAPACITY: usize = 100;

/// Origin label used when input has no file name.
pub const DEFAULT_ORIGIN: &str = "<input>";

pub const PORT_VAR: &str = "ASSOC_PORT";
pub const MAX_UPLOAD_VAR: &str = "ASSOC_MAX_UPLOAD";

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload: MAX_UPLOAD_SIZE,
        }
    }
}

impl ServerConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; malformed values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(PORT_VAR) {
            match raw.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => log_warning(format!("Ignoring {}={:?}: not a port", PORT_VAR, raw)),
            }
        }

        if let Some(raw) = lookup(MAX_UPLOAD_VAR) {
            match raw.trim().parse() {
                Ok(size) => config.max_upload = size,
                Err(_) => log_warning(format!("Ignoring {}={:?}: not a size", MAX_UPLOAD_VAR, raw)),
            }
        }

        config
    }
}

/// Options for loading one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Label used in error positions, usually the file path
    pub origin: String,

    /// Lines preceding the input in its source; negative values are
    /// rejected when loading
    pub line_offset: i64,

    /// Force an encoding instead of detecting it
    pub encoding: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            line_offset: 0,
            encoding: None,
        }
    }
}

impl LoadOptions {
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_line_offset(mut self, offset: i64) -> Self {
        self.line_offset = offset;
        self
    }

    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding;
        self
    }

    /// The offset as the parser takes it.
    pub fn offset(&self) -> Result<LineOffset, crate::error::CsvErrorKind> {
        LineOffset::try_from(self.line_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(|key| match key {
            PORT_VAR => Some("8080".into()),
            MAX_UPLOAD_VAR => Some(" 2048 ".into()),
            _ => None,
        });
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload, 2048);
    }

    #[test]
    fn test_malformed_values_keep_defaults() {
        let config = ServerConfig::from_lookup(|key| match key {
            PORT_VAR => Some("99999".into()),
            _ => Some("lots".into()),
        });
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_load_options() {
        let options = LoadOptions::default().with_origin("hard/7.csv").with_line_offset(-2);
        assert_eq!(options.origin, "hard/7.csv");
        assert!(options.offset().is_err());
        assert_eq!(LoadOptions::default().offset(), Ok(LineOffset::new(0)));
    }
}
