//! Demo feed configuration

use serde::Deserialize;

/// Demo feed settings
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// Delay between generated frames
    pub interval_ms: u64,
    /// `source` field stamped on generated proofs
    pub source: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1500,
            source: "iv-demo".to_string(),
        }
    }
}

/// Demo settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileDemo {
    pub interval_ms: Option<u64>,
    pub source: Option<String>,
}

impl DemoConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileDemo>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            // Zero would spin the generator
            interval_ms: file.interval_ms.unwrap_or(defaults.interval_ms).max(10),
            source: file.source.unwrap_or(defaults.source),
        }
    }
}
