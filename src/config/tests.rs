//! Configuration tests
//!
//! Round-trip guards: everything `to_toml()` writes must parse back into the
//! same effective configuration. When you add a field, these fail until it is
//! serialized and loaded.

use super::*;
use crate::realtime::BackoffPolicy;
use std::collections::HashMap;
use std::time::Duration;

fn no_env(_: &str) -> Option<String> {
    None
}

fn parse(toml_str: &str) -> FileConfig {
    match toml::from_str(toml_str) {
        Ok(file) => file,
        Err(e) => panic!("TOML should parse.\nTOML:\n{}\nError: {}", toml_str, e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let loaded = Config::from_sources(parse(&config.to_toml()), no_env).unwrap();

    assert_eq!(loaded.theme, config.theme);
    assert_eq!(loaded.bind_addr, config.bind_addr);
    assert_eq!(loaded.realtime, config.realtime);
    assert_eq!(loaded.logging, config.logging);
    assert_eq!(loaded.demo, config.demo);
}

/// Every field set to a non-default value must survive serialization
#[test]
fn test_config_roundtrip_all_fields() {
    let config = Config {
        theme: "My \"Quoted\" Theme".to_string(),
        bind_addr: "0.0.0.0:9000".parse().unwrap(),
        realtime: RealtimeSettings {
            backoff_base_ms: 250,
            backoff_max_ms: 8000,
            backoff_factor: 3,
            reconnect_on_clean_close: true,
            connect_timeout_ms: 2500,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            file_enabled: true,
            file_dir: "/var/log/ivw".into(),
            file_rotation: LogRotation::Hourly,
            file_prefix: "widgets".to_string(),
        },
        demo: DemoConfig {
            interval_ms: 300,
            source: "staging".to_string(),
        },
    };

    let loaded = Config::from_sources(parse(&config.to_toml()), no_env).unwrap();
    assert_eq!(loaded.theme, config.theme);
    assert_eq!(loaded.bind_addr, config.bind_addr);
    assert_eq!(loaded.realtime, config.realtime);
    assert_eq!(loaded.logging, config.logging);
    assert_eq!(loaded.demo, config.demo);
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_env_overrides_file() {
    let file = parse(
        r#"
theme = "IV Light"
bind_addr = "127.0.0.1:1111"
"#,
    );
    let env: HashMap<&str, &str> = [("IVW_THEME", "IV Midnight"), ("IVW_BIND", "127.0.0.1:2222")]
        .into_iter()
        .collect();

    let config = Config::from_sources(file, |k| env.get(k).map(|v| v.to_string())).unwrap();
    assert_eq!(config.theme, "IV Midnight");
    assert_eq!(config.bind_addr.port(), 2222);
}

#[test]
fn test_file_overrides_defaults_per_field() {
    let file = parse(
        r#"
[realtime]
backoff_factor = 4

[logging]
file_rotation = "NEVER"
"#,
    );
    let config = Config::from_sources(file, no_env).unwrap();
    assert_eq!(config.realtime.backoff_factor, 4);
    assert_eq!(config.realtime.backoff_base_ms, 1000);
    assert_eq!(config.logging.file_rotation, LogRotation::Never);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.theme, crate::theme::DEFAULT_THEME);
}

#[test]
fn test_invalid_bind_is_an_error() {
    let file = parse(r#"bind_addr = "not-an-address""#);
    let err = Config::from_sources(file, no_env).unwrap_err();
    assert!(err.to_string().contains("Invalid bind address"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Realtime policy
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_realtime_defaults_match_runtime_defaults() {
    assert_eq!(
        RealtimeSettings::default().to_runtime(),
        crate::realtime::RealtimeConfig::default()
    );
}

#[test]
fn test_realtime_settings_are_sanitized() {
    let settings = RealtimeSettings::from_file(Some(FileRealtime {
        backoff_base_ms: Some(5000),
        backoff_max_ms: Some(100),
        backoff_factor: Some(0),
        reconnect_on_clean_close: None,
        connect_timeout_ms: Some(0),
    }));
    let runtime = settings.to_runtime();
    assert_eq!(
        runtime.backoff,
        BackoffPolicy {
            base: Duration::from_millis(5000),
            max: Duration::from_millis(5000),
            factor: 1,
        }
    );
    assert_eq!(runtime.connect_timeout, Duration::from_millis(1));
    assert!(!runtime.reconnect_on_clean_close);
}

#[test]
fn test_demo_interval_floor() {
    let demo = DemoConfig::from_file(Some(FileDemo {
        interval_ms: Some(0),
        source: None,
    }));
    assert_eq!(demo.interval_ms, 10);
    assert_eq!(demo.source, "iv-demo");
}

#[test]
fn test_unknown_log_rotation_falls_back_to_daily() {
    let file = parse(
        r#"
[logging]
file_rotation = "weekly"
"#,
    );
    let config = Config::from_sources(file, no_env).unwrap();
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
    assert_eq!(" Hourly ".parse::<LogRotation>(), Ok(LogRotation::Hourly));
}
