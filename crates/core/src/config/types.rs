use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Upstream endpoints for set metadata and symbol artwork.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Metadata API base URL (default: https://api.scryfall.com)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Symbol image URL; `{code}` is replaced with the upper-case set code.
    /// An empty template disables symbol downloads.
    #[serde(default = "default_symbol_url_template")]
    pub symbol_url_template: String,
    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            symbol_url_template: default_symbol_url_template(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://api.scryfall.com".to_string()
}

fn default_symbol_url_template() -> String {
    "https://mtgcollectionbuilder.com/images/symbols/sets/{code}.png".to_string()
}

fn default_user_agent() -> String {
    format!("setlabel/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    10
}

/// Retry configuration for transient network failures.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Maximum attempts per request, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt in milliseconds; doubles per attempt.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Upper bound for a single backoff delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Upper bound of the random jitter added to each delay in milliseconds.
    #[serde(default = "default_jitter")]
    pub jitter_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    8000
}

fn default_jitter() -> u64 {
    250
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            jitter_ms: default_jitter(),
        }
    }
}

/// Which requests share a spacing budget.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitScope {
    /// Each batch worker spaces its own requests.
    #[default]
    PerWorker,
    /// All workers share one spacing budget.
    Shared,
}

/// Minimum spacing between upstream requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Minimum interval between two requests in milliseconds (default: 100)
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,
    #[serde(default)]
    pub scope: RateLimitScope,
}

fn default_min_interval() -> u64 {
    100
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval(),
            scope: RateLimitScope::default(),
        }
    }
}

/// Batch run configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Directory labels are written to (created if absent)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Number of parallel workers (default: 1, sequential)
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Skip codes whose label already exists
    #[serde(default)]
    pub skip_existing: bool,
    /// Always regenerate existing labels
    #[serde(default)]
    pub force: bool,
    /// Plan labels without writing them
    #[serde(default)]
    pub dry_run: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./labels")
}

fn default_parallelism() -> usize {
    1
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            parallelism: default_parallelism(),
            skip_existing: false,
            force: false,
            dry_run: false,
        }
    }
}
