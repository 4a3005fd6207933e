/// Extension configuration
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::RetryPolicy;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Tunables shared by every extension context.
///
/// Service workers must register their listeners synchronously, so the only
/// override is the build-time `URL_GUARD_API_BASE` variable; everything else
/// is fixed at its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    pub api_base_url: String,
    pub notify_max_attempts: u32,
    pub notify_retry_delay_ms: u64,
    pub ready_retry_delay_ms: u64,
    pub status_clear_ms: u64,
    pub overlay_show_tick_ms: u64,
    pub overlay_summary_delay_ms: u64,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        ExtensionConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            notify_max_attempts: 3,
            notify_retry_delay_ms: 250,
            ready_retry_delay_ms: 1000,
            status_clear_ms: 3000,
            overlay_show_tick_ms: 5,
            overlay_summary_delay_ms: 50,
        }
    }
}

impl ExtensionConfig {
    pub fn from_build_env() -> Self {
        Self::with_api_base(option_env!("URL_GUARD_API_BASE"))
    }

    fn with_api_base(api_base: Option<&str>) -> Self {
        let mut config = ExtensionConfig::default();
        if let Some(base) = api_base.map(str::trim).filter(|b| !b.is_empty()) {
            config.api_base_url = base.trim_end_matches('/').to_string();
        }
        config
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    pub fn notify_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.notify_max_attempts,
            Duration::from_millis(self.notify_retry_delay_ms),
        )
    }

    pub fn ready_retry_delay(&self) -> Duration {
        Duration::from_millis(self.ready_retry_delay_ms)
    }

    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_millis(self.status_clear_ms)
    }

    pub fn overlay_show_tick(&self) -> Duration {
        Duration::from_millis(self.overlay_show_tick_ms)
    }

    pub fn overlay_summary_delay(&self) -> Duration {
        Duration::from_millis(self.overlay_summary_delay_ms)
    }
}
