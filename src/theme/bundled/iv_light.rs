//! IV Light - light surfaces for bright host pages

pub const THEME: &str = r##"# IV Light theme for iv-widgets

[meta]
name = "IV Light"
version = 1
author = "iv-widgets"

[tokens]
brandPrimary = "#5b3df5"
brandSecondary = "#0891b2"
brandAccent = "#db2777"
surfaceBase = "#ffffff"
surfaceRaised = "#f6f7fb"
surfaceOverlay = "#eceef5"
textPrimary = "#111827"
textSecondary = "#374151"
textMuted = "#6b7280"
borderSubtle = "#e5e7eb"
borderStrong = "#cbd0db"
statusSuccess = "#16a34a"
statusWarning = "#d97706"
statusError = "#dc2626"
statusInfo = "#2563eb"
fontSans = "'Inter', system-ui, sans-serif"
fontMono = "'JetBrains Mono', ui-monospace, monospace"
spacingXs = "4px"
spacingSm = "8px"
spacingMd = "12px"
spacingLg = "20px"
radiusSm = "4px"
radiusMd = "10px"
radiusFull = "9999px"
durationFast = "120ms"
durationNormal = "240ms"
durationSlow = "480ms"
shadowGlow = "0 0 18px rgba(91, 61, 245, 0.25)"
"##;
