//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# iv-widgets configuration

# Theme used for server-rendered widgets: IV Dark, IV Light, IV Midnight,
# or the name of any theme in ~/.config/iv-widgets/themes/
theme = "{theme}"

# Demo server bind address (`iv-widgets serve`)
bind_addr = "{bind}"

# Realtime WebSocket channels
[realtime]
# Reconnect delay: base * factor^attempt, capped at backoff_max_ms
backoff_base_ms = {backoff_base}
backoff_max_ms = {backoff_max}
backoff_factor = {backoff_factor}
# Reconnect after the server closes normally (code 1000/1001)
reconnect_on_clean_close = {reconnect_clean}
connect_timeout_ms = {connect_timeout}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"

# Demo feed (`iv-widgets serve`)
[demo]
interval_ms = {demo_interval}
source = "{demo_source}"
"#,
            theme = escape(&self.theme),
            bind = self.bind_addr,
            backoff_base = self.realtime.backoff_base_ms,
            backoff_max = self.realtime.backoff_max_ms,
            backoff_factor = self.realtime.backoff_factor,
            reconnect_clean = self.realtime.reconnect_on_clean_close,
            connect_timeout = self.realtime.connect_timeout_ms,
            log_level = escape(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = escape(&self.logging.file_dir.display().to_string()),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = escape(&self.logging.file_prefix),
            demo_interval = self.demo.interval_ms,
            demo_source = escape(&self.demo.source),
        )
    }
}

/// Escape a value for a TOML basic string
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
