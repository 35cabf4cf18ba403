use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default backend root, the local API service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default analysis preset
pub const DEFAULT_STRATEGY: &str = "top50";

/// Main configuration structure for Crawl-Tasks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

/// Transport configuration for the backend API
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Root address every endpoint path is appended to
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Hard upper bound on a single round trip (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Headers sent with every request
    #[serde(rename = "default-headers", default = "default_headers")]
    pub default_headers: BTreeMap<String, String>,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            default_headers: default_headers(),
        }
    }
}

/// Analysis defaults
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Strategy sent when a caller does not name one
    #[serde(rename = "default-strategy", default = "default_strategy")]
    pub default_strategy: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_strategy: default_strategy(),
        }
    }
}

/// Polling schedule used while waiting for a task to settle
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Delay before the second poll (milliseconds)
    #[serde(rename = "interval-ms", default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Upper bound on the delay between polls (milliseconds)
    #[serde(rename = "max-interval-ms", default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Growth factor applied to the delay after each poll
    #[serde(rename = "backoff-multiplier", default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Maximum number of polls before giving up
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Randomize each delay between 1x and 2x
    #[serde(default)]
    pub jitter: bool,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_attempts: default_max_attempts(),
            jitter: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

fn default_strategy() -> String {
    DEFAULT_STRATEGY.to_string()
}

fn default_interval_ms() -> u64 {
    2_000
}

fn default_max_interval_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    1.5
}

fn default_max_attempts() -> u32 {
    150
}
