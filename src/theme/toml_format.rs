// TOML theme format parser
//
// Native theme format for iv-widgets. A theme file names itself in [meta]
// and lists token values in a flat [tokens] table keyed by token name.
// Tokens a file leaves out are filled from the fallback theme.
//
// Format version: 1

use serde::Deserialize;
use std::collections::BTreeMap;

/// Root structure for TOML theme files
#[derive(Debug, Clone, Deserialize)]
pub struct TomlTheme {
    pub meta: ThemeMeta,
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

/// Theme metadata
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeMeta {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub author: Option<String>,
}

fn default_version() -> u32 {
    1
}

impl TomlTheme {
    /// Parse a TOML theme from string
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
