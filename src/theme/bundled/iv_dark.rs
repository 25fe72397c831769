//! IV Dark - the default widget theme

pub const THEME: &str = r##"# IV Dark theme for iv-widgets

[meta]
name = "IV Dark"
version = 1
author = "iv-widgets"

[tokens]
brandPrimary = "#7c5cff"
brandSecondary = "#22d3ee"
brandAccent = "#f472b6"
surfaceBase = "#0f1117"
surfaceRaised = "#171a23"
surfaceOverlay = "#1f2330"
textPrimary = "#e6e8ef"
textSecondary = "#b3b8c7"
textMuted = "#7a8194"
borderSubtle = "#2a2f3d"
borderStrong = "#3d4457"
statusSuccess = "#22c55e"
statusWarning = "#f59e0b"
statusError = "#ef4444"
statusInfo = "#3b82f6"
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
shadowGlow = "0 0 24px rgba(124, 92, 255, 0.45)"
"##;
