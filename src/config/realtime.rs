//! Realtime channel configuration
//!
//! Connection policy shared by every widget channel: reconnect backoff,
//! clean-close behaviour and connect timeout.

use crate::realtime::{BackoffPolicy, RealtimeConfig};
use serde::Deserialize;
use std::time::Duration;

/// Realtime settings as configured
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeSettings {
    /// First reconnect delay
    pub backoff_base_ms: u64,
    /// Reconnect delay cap
    pub backoff_max_ms: u64,
    /// Delay multiplier per consecutive failure
    pub backoff_factor: u32,
    /// Reconnect after the server closes normally (1000/1001)
    pub reconnect_on_clean_close: bool,
    /// Give up on a connect attempt after this long
    pub connect_timeout_ms: u64,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            backoff_base_ms: 1000,
            backoff_max_ms: 30_000,
            backoff_factor: 2,
            reconnect_on_clean_close: false,
            connect_timeout_ms: 10_000,
        }
    }
}

/// Realtime settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileRealtime {
    pub backoff_base_ms: Option<u64>,
    pub backoff_max_ms: Option<u64>,
    pub backoff_factor: Option<u32>,
    pub reconnect_on_clean_close: Option<bool>,
    pub connect_timeout_ms: Option<u64>,
}

impl RealtimeSettings {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileRealtime>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let backoff_base_ms = file.backoff_base_ms.unwrap_or(defaults.backoff_base_ms).max(1);
        // A cap below the base would make the schedule shrink
        let backoff_max_ms = file
            .backoff_max_ms
            .unwrap_or(defaults.backoff_max_ms)
            .max(backoff_base_ms);

        Self {
            backoff_base_ms,
            backoff_max_ms,
            backoff_factor: file.backoff_factor.unwrap_or(defaults.backoff_factor).max(1),
            reconnect_on_clean_close: file
                .reconnect_on_clean_close
                .unwrap_or(defaults.reconnect_on_clean_close),
            connect_timeout_ms: file
                .connect_timeout_ms
                .unwrap_or(defaults.connect_timeout_ms)
                .max(1),
        }
    }

    /// Runtime policy handed to pages and channels
    pub fn to_runtime(&self) -> RealtimeConfig {
        RealtimeConfig {
            backoff: BackoffPolicy {
                base: Duration::from_millis(self.backoff_base_ms),
                max: Duration::from_millis(self.backoff_max_ms),
                factor: self.backoff_factor,
            },
            reconnect_on_clean_close: self.reconnect_on_clean_close,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }
}
