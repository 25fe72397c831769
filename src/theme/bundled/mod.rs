//! Bundled TOML themes (compiled into binary, extracted on first run)
//!
//! These themes are written to ~/.config/iv-widgets/themes/ on first run.
//! Users can then modify them freely. See iv_dark.rs for the flagship theme.

mod iv_dark;
mod iv_light;
mod iv_midnight;

pub use iv_dark::THEME as IV_DARK;
pub use iv_light::THEME as IV_LIGHT;
pub use iv_midnight::THEME as IV_MIDNIGHT;

/// A theme shipped inside the binary
pub struct BundledTheme {
    pub filename: &'static str,
    pub content: &'static str,
}

/// All bundled themes
pub const BUNDLED_THEMES: &[BundledTheme] = &[
    BundledTheme {
        filename: "IV_Dark.toml",
        content: IV_DARK,
    },
    BundledTheme {
        filename: "IV_Light.toml",
        content: IV_LIGHT,
    },
    BundledTheme {
        filename: "IV_Midnight.toml",
        content: IV_MIDNIGHT,
    },
];

/// List bundled theme names (for display)
pub fn list_bundled_themes() -> Vec<&'static str> {
    vec!["IV Dark", "IV Light", "IV Midnight"]
}
