// Theme system for widget stylesheets
//
// Architecture:
// - ThemeToken: fixed vocabulary of semantic design tokens
// - TomlTheme: on-disk format ([meta] + flat [tokens] table)
// - Theme: resolved, immutable token map shared by reference (Arc)
// - ThemeProvider: holds the current Arc<Theme>; swapping it does not notify
//   anyone, widgets pick the new values up on their next render
//
// Theme loading priority:
// 1. External TOML themes from ~/.config/iv-widgets/themes/*.toml
// 2. Bundled themes (extracted on first run)
// 3. Fallback to hardcoded default

mod bundled;
mod tokens;
mod toml_format;

pub use tokens::ThemeToken;
pub use toml_format::TomlTheme;

use crate::error::ThemeError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, RwLock};

/// Name of the theme used when nothing else is configured
pub const DEFAULT_THEME: &str = "IV Dark";

/// Characters that could break out of a declaration inside a `<style>` block
const FORBIDDEN_VALUE_CHARS: &[char] = &[';', '{', '}', '<', '>', '\n', '\r'];

/// Complete resolved theme ready for use in widget stylesheets.
///
/// Immutable once built. Every token always has a value.
#[derive(Debug)]
pub struct Theme {
    name: String,
    values: BTreeMap<ThemeToken, String>,
    /// `:host { --iv-*: ... }` block, built on first use
    prelude: OnceLock<Arc<str>>,
}

impl Theme {
    /// Load theme by name (external file, then bundled, then fallback)
    pub fn by_name(name: &str) -> Self {
        if let Some(theme) = Self::load_external(name) {
            return theme;
        }

        if let Some(theme) = Self::load_bundled(name) {
            return theme;
        }

        tracing::debug!("Theme '{}' not found, using fallback", name);
        Self::fallback()
    }

    /// Parse a TOML theme. Missing tokens are taken from the fallback theme,
    /// unknown keys are ignored.
    pub fn from_toml_str(content: &str) -> Result<Self, ThemeError> {
        let toml = TomlTheme::from_str(content)?;
        Self::from_toml(toml)
    }

    fn from_toml(toml: TomlTheme) -> Result<Self, ThemeError> {
        let mut values = Self::fallback_values();

        for (key, value) in toml.tokens {
            let Some(token) = ThemeToken::from_name(&key) else {
                tracing::debug!("Theme '{}': ignoring unknown token '{}'", toml.meta.name, key);
                continue;
            };
            values.insert(token, validate_value(token, &value)?);
        }

        Ok(Self::from_values(toml.meta.name, values))
    }

    /// Build a theme from explicit values (used for runtime overrides)
    pub fn with_overrides<I, S>(&self, name: &str, overrides: I) -> Result<Self, ThemeError>
    where
        I: IntoIterator<Item = (ThemeToken, S)>,
        S: AsRef<str>,
    {
        let mut values = self.values.clone();
        for (token, value) in overrides {
            values.insert(token, validate_value(token, value.as_ref())?);
        }
        Ok(Self::from_values(name.to_string(), values))
    }

    fn from_values(name: String, values: BTreeMap<ThemeToken, String>) -> Self {
        Self {
            name,
            values,
            prelude: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of a token
    pub fn get(&self, token: ThemeToken) -> &str {
        // Every constructor starts from the fallback map, so every token is present
        self.values.get(&token).map(String::as_str).unwrap_or_default()
    }

    /// Token values keyed by theme-file name
    pub fn to_map(&self) -> BTreeMap<&'static str, &str> {
        self.values
            .iter()
            .map(|(token, value)| (token.as_str(), value.as_str()))
            .collect()
    }

    /// `:host` block exposing every token as a CSS custom property.
    ///
    /// Built once per theme and shared by every widget that renders with it.
    pub fn css_prelude(&self) -> Arc<str> {
        self.prelude
            .get_or_init(|| {
                let mut css = String::from(":host {\n");
                for (token, value) in &self.values {
                    css.push_str(&format!("  {}: {};\n", token.css_var(), value));
                }
                css.push_str("}\n");
                Arc::from(css)
            })
            .clone()
    }

    /// Load from an external TOML file in the themes directory
    fn load_external(name: &str) -> Option<Self> {
        let dir = Self::themes_dir()?;
        let normalized = name.replace(' ', "_");

        for candidate in [name, normalized.as_str()] {
            let path = dir.join(format!("{}.toml", candidate));
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::from_toml_str(&contents) {
                    Ok(theme) => return Some(theme),
                    Err(e) => tracing::warn!("Skipping theme file {}: {}", path.display(), e),
                },
                Err(e) => tracing::warn!("Cannot read theme file {}: {}", path.display(), e),
            }
        }

        None
    }

    /// Load from themes compiled into the binary
    fn load_bundled(name: &str) -> Option<Self> {
        let filename = format!("{}.toml", name.replace(' ', "_"));
        bundled::BUNDLED_THEMES
            .iter()
            .find(|theme| theme.filename.eq_ignore_ascii_case(&filename))
            .and_then(|theme| match Self::from_toml_str(theme.content) {
                Ok(theme) => Some(theme),
                Err(e) => {
                    tracing::error!("Bundled theme {} is invalid: {}", theme.filename, e);
                    None
                }
            })
    }

    /// Hardcoded fallback when no themes can be loaded
    pub fn fallback() -> Self {
        Self::from_values("IV Dark (Fallback)".to_string(), Self::fallback_values())
    }

    fn fallback_values() -> BTreeMap<ThemeToken, String> {
        use ThemeToken::*;

        [
            (BrandPrimary, "#7c5cff"),
            (BrandSecondary, "#22d3ee"),
            (BrandAccent, "#f472b6"),
            (SurfaceBase, "#0f1117"),
            (SurfaceRaised, "#171a23"),
            (SurfaceOverlay, "#1f2330"),
            (TextPrimary, "#e6e8ef"),
            (TextSecondary, "#b3b8c7"),
            (TextMuted, "#7a8194"),
            (BorderSubtle, "#2a2f3d"),
            (BorderStrong, "#3d4457"),
            (StatusSuccess, "#22c55e"),
            (StatusWarning, "#f59e0b"),
            (StatusError, "#ef4444"),
            (StatusInfo, "#3b82f6"),
            (FontSans, "system-ui, sans-serif"),
            (FontMono, "ui-monospace, monospace"),
            (SpacingXs, "4px"),
            (SpacingSm, "8px"),
            (SpacingMd, "12px"),
            (SpacingLg, "20px"),
            (RadiusSm, "4px"),
            (RadiusMd, "10px"),
            (RadiusFull, "9999px"),
            (DurationFast, "120ms"),
            (DurationNormal, "240ms"),
            (DurationSlow, "480ms"),
            (ShadowGlow, "0 0 24px rgba(124, 92, 255, 0.45)"),
        ]
        .into_iter()
        .map(|(token, value)| (token, value.to_string()))
        .collect()
    }

    /// Get themes directory path
    fn themes_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config").join("iv-widgets").join("themes"))
    }

    /// List all available themes (bundled + external)
    pub fn list_available() -> Vec<String> {
        let mut themes: Vec<String> = bundled::list_bundled_themes()
            .into_iter()
            .map(str::to_string)
            .collect();

        if let Some(themes_dir) = Self::themes_dir() {
            if let Ok(entries) = std::fs::read_dir(themes_dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().is_some_and(|ext| ext == "toml") {
                        if let Some(stem) = path.file_stem() {
                            // Convert filename format (underscore) to display format (space)
                            let display_name = stem.to_string_lossy().replace('_', " ");
                            if !themes.iter().any(|t| t.eq_ignore_ascii_case(&display_name)) {
                                themes.push(display_name);
                            }
                        }
                    }
                }
            }
        }

        themes
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::by_name(DEFAULT_THEME)
    }
}

/// Reject values that are empty or could escape a CSS declaration
fn validate_value(token: ThemeToken, value: &str) -> Result<String, ThemeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(FORBIDDEN_VALUE_CHARS) {
        return Err(ThemeError::InvalidValue {
            token: token.as_str().to_string(),
            value: value.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Holds the page's current theme.
///
/// Widgets read `current()` at the start of every render. Replacing the theme
/// does not trigger anything by itself: the owner re-renders each widget.
#[derive(Debug)]
pub struct ThemeProvider {
    current: RwLock<Arc<Theme>>,
}

impl ThemeProvider {
    pub fn new(theme: Theme) -> Self {
        Self {
            current: RwLock::new(Arc::new(theme)),
        }
    }

    pub fn current(&self) -> Arc<Theme> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Swap in a new theme, returning the previous one
    pub fn replace(&self, theme: Theme) -> Arc<Theme> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tracing::info!("Theme switched: {} -> {}", guard.name(), theme.name());
        std::mem::replace(&mut *guard, Arc::new(theme))
    }
}

impl Default for ThemeProvider {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

/// Ensure themes directory exists and extract bundled themes on first run
pub fn ensure_themes_extracted() {
    let Some(themes_dir) = Theme::themes_dir() else {
        return;
    };

    if std::fs::create_dir_all(&themes_dir).is_err() {
        return;
    }

    // Check if we've already extracted (marker file)
    let marker = themes_dir.join(".extracted_v1");
    if marker.exists() {
        return;
    }

    for theme in bundled::BUNDLED_THEMES {
        let path = themes_dir.join(theme.filename);
        // Only write if file doesn't exist (don't overwrite user modifications)
        if !path.exists() {
            let _ = std::fs::write(&path, theme.content);
        }
    }

    let _ = std::fs::write(&marker, "1");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_has_every_token() {
        let theme = Theme::fallback();
        for token in ThemeToken::ALL {
            assert!(!theme.get(token).is_empty(), "missing {}", token);
        }
    }

    #[test]
    fn test_bundled_themes_parse() {
        for bundled in bundled::BUNDLED_THEMES {
            let theme = Theme::from_toml_str(bundled.content);
            assert!(theme.is_ok(), "{} failed: {:?}", bundled.filename, theme.err());
        }
    }

    #[test]
    fn test_load_bundled_by_display_name() {
        let theme = Theme::load_bundled("IV Light").unwrap();
        assert_eq!(theme.name(), "IV Light");
        assert_eq!(theme.get(ThemeToken::StatusError), "#dc2626");
    }

    #[test]
    fn test_partial_theme_fills_from_fallback() {
        let theme = Theme::load_bundled("IV Midnight").unwrap();
        assert_eq!(theme.get(ThemeToken::BrandPrimary), "#38bdf8");
        assert_eq!(
            theme.get(ThemeToken::DurationNormal),
            Theme::fallback().get(ThemeToken::DurationNormal)
        );
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let theme = Theme::from_toml_str(
            "[meta]\nname = \"X\"\n[tokens]\nnotAToken = \"red\"\nbrandPrimary = \"#123456\"\n",
        )
        .unwrap();
        assert_eq!(theme.get(ThemeToken::BrandPrimary), "#123456");
    }

    #[test]
    fn test_injection_values_are_rejected() {
        let result = Theme::from_toml_str(
            "[meta]\nname = \"Evil\"\n[tokens]\nbrandPrimary = \"red; } body { display: none\"\n",
        );
        assert!(matches!(result, Err(ThemeError::InvalidValue { .. })));

        let result = Theme::from_toml_str("[meta]\nname = \"Empty\"\n[tokens]\nfontMono = \"  \"\n");
        assert!(matches!(result, Err(ThemeError::InvalidValue { .. })));
    }

    #[test]
    fn test_unknown_name_uses_fallback() {
        let theme = Theme::by_name("definitely-not-a-theme-name");
        assert_eq!(theme.name(), "IV Dark (Fallback)");
    }

    #[test]
    fn test_prelude_is_shared() {
        let theme = Theme::fallback();
        let a = theme.css_prelude();
        let b = theme.css_prelude();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.contains("--iv-status-error: #ef4444;"));
    }

    #[test]
    fn test_with_overrides() {
        let base = Theme::fallback();
        let custom = base
            .with_overrides("Custom", [(ThemeToken::StatusError, "#ff0000")])
            .unwrap();
        assert_eq!(custom.get(ThemeToken::StatusError), "#ff0000");
        assert_eq!(base.get(ThemeToken::StatusError), "#ef4444");
    }

    #[test]
    fn test_provider_replace_keeps_old_arc_alive() {
        let provider = ThemeProvider::new(Theme::fallback());
        let before = provider.current();
        let old = provider.replace(Theme::load_bundled("IV Light").unwrap());
        assert!(Arc::ptr_eq(&before, &old));
        assert_eq!(before.name(), "IV Dark (Fallback)");
        assert_eq!(provider.current().name(), "IV Light");
    }
}
