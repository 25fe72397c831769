// Theme token names
//
// Every widget stylesheet is built from this fixed vocabulary. Names are the
// camelCase keys used in theme files; each token also has a kebab-case CSS
// custom property (`--iv-brand-primary`) exposed on `:host`.

use std::fmt;

/// A semantic design token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThemeToken {
    // ─── Brand ───────────────────────────────────────────────
    BrandPrimary,
    BrandSecondary,
    BrandAccent,

    // ─── Surfaces ────────────────────────────────────────────
    SurfaceBase,
    SurfaceRaised,
    SurfaceOverlay,

    // ─── Text ────────────────────────────────────────────────
    TextPrimary,
    TextSecondary,
    TextMuted,

    // ─── Borders ─────────────────────────────────────────────
    BorderSubtle,
    BorderStrong,

    // ─── Status ──────────────────────────────────────────────
    StatusSuccess,
    StatusWarning,
    StatusError,
    StatusInfo,

    // ─── Typography ──────────────────────────────────────────
    FontSans,
    FontMono,

    // ─── Spacing & shape ─────────────────────────────────────
    SpacingXs,
    SpacingSm,
    SpacingMd,
    SpacingLg,
    RadiusSm,
    RadiusMd,
    RadiusFull,

    // ─── Motion & effects ────────────────────────────────────
    DurationFast,
    DurationNormal,
    DurationSlow,
    ShadowGlow,
}

impl ThemeToken {
    /// All tokens, in theme-file order
    pub const ALL: [ThemeToken; 28] = [
        Self::BrandPrimary,
        Self::BrandSecondary,
        Self::BrandAccent,
        Self::SurfaceBase,
        Self::SurfaceRaised,
        Self::SurfaceOverlay,
        Self::TextPrimary,
        Self::TextSecondary,
        Self::TextMuted,
        Self::BorderSubtle,
        Self::BorderStrong,
        Self::StatusSuccess,
        Self::StatusWarning,
        Self::StatusError,
        Self::StatusInfo,
        Self::FontSans,
        Self::FontMono,
        Self::SpacingXs,
        Self::SpacingSm,
        Self::SpacingMd,
        Self::SpacingLg,
        Self::RadiusSm,
        Self::RadiusMd,
        Self::RadiusFull,
        Self::DurationFast,
        Self::DurationNormal,
        Self::DurationSlow,
        Self::ShadowGlow,
    ];

    /// Token name as written in theme files
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BrandPrimary => "brandPrimary",
            Self::BrandSecondary => "brandSecondary",
            Self::BrandAccent => "brandAccent",
            Self::SurfaceBase => "surfaceBase",
            Self::SurfaceRaised => "surfaceRaised",
            Self::SurfaceOverlay => "surfaceOverlay",
            Self::TextPrimary => "textPrimary",
            Self::TextSecondary => "textSecondary",
            Self::TextMuted => "textMuted",
            Self::BorderSubtle => "borderSubtle",
            Self::BorderStrong => "borderStrong",
            Self::StatusSuccess => "statusSuccess",
            Self::StatusWarning => "statusWarning",
            Self::StatusError => "statusError",
            Self::StatusInfo => "statusInfo",
            Self::FontSans => "fontSans",
            Self::FontMono => "fontMono",
            Self::SpacingXs => "spacingXs",
            Self::SpacingSm => "spacingSm",
            Self::SpacingMd => "spacingMd",
            Self::SpacingLg => "spacingLg",
            Self::RadiusSm => "radiusSm",
            Self::RadiusMd => "radiusMd",
            Self::RadiusFull => "radiusFull",
            Self::DurationFast => "durationFast",
            Self::DurationNormal => "durationNormal",
            Self::DurationSlow => "durationSlow",
            Self::ShadowGlow => "shadowGlow",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// CSS custom property name, e.g. `--iv-brand-primary`
    pub fn css_var(self) -> String {
        let mut out = String::from("--iv-");
        for c in self.as_str().chars() {
            if c.is_ascii_uppercase() {
                out.push('-');
                out.push(c.to_ascii_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for ThemeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
