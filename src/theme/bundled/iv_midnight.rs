//! IV Midnight - partial theme, relies on fallback for spacing and motion

pub const THEME: &str = r##"# IV Midnight theme for iv-widgets
# Only colors are defined; every other token comes from the fallback theme.

[meta]
name = "IV Midnight"
version = 1
author = "iv-widgets"

[tokens]
brandPrimary = "#38bdf8"
brandSecondary = "#a78bfa"
brandAccent = "#facc15"
surfaceBase = "#020617"
surfaceRaised = "#0b1226"
surfaceOverlay = "#111a33"
textPrimary = "#f1f5f9"
textSecondary = "#cbd5e1"
textMuted = "#64748b"
borderSubtle = "#1e293b"
borderStrong = "#334155"
statusSuccess = "#4ade80"
statusWarning = "#fbbf24"
statusError = "#f87171"
statusInfo = "#60a5fa"
shadowGlow = "0 0 28px rgba(56, 189, 248, 0.5)"
"##;
