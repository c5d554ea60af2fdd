//! Configuration schema for Carewatch.

use serde::{Deserialize, Serialize};

/// Root config for a Carewatch deployment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CarewatchConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub assessment: AssessmentConfig,
    #[serde(default)]
    pub checkins: CheckinsConfig,
}

impl CarewatchConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> CarewatchConfigBuilder {
        CarewatchConfigBuilder::new()
    }
}

/// Builder for assembling a `CarewatchConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct CarewatchConfigBuilder {
    config: CarewatchConfig,
}

impl CarewatchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CarewatchConfig::default(),
        }
    }

    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.config.provider = provider;
        self
    }

    pub fn assessment(mut self, assessment: AssessmentConfig) -> Self {
        self.config.assessment = assessment;
        self
    }

    pub fn checkins(mut self, checkins: CheckinsConfig) -> Self {
        self.config.checkins = checkins;
        self
    }

    pub fn build(self) -> CarewatchConfig {
        self.config
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Persistence backend selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSONL documents under `storage.path`.
    #[default]
    File,
    /// Process-local, lost on restart.
    Memory,
}

/// Observation and profile storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Data directory; defaults to `.carewatch/data` under the working directory.
    #[serde(default)]
    pub path: Option<String>,
}

/// Reasoning provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key. Unset means no provider.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

/// Upper bound on provider attempts: the first call plus one retry.
pub const MAX_PROVIDER_ATTEMPTS: u32 = 2;

/// Retry policy for transient provider failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first call.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    MAX_PROVIDER_ATTEMPTS
}

fn default_backoff_ms() -> u64 {
    500
}

/// Trend analysis and history window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// Number of prior check-ins loaded as context.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Per-item mean delta separating a trend from noise.
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,
    /// Decline magnitude at which a declining trend becomes concerning.
    #[serde(default = "default_concerning_threshold")]
    pub concerning_threshold: f64,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            trend_threshold: default_trend_threshold(),
            concerning_threshold: default_concerning_threshold(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

fn default_history_window() -> usize {
    5
}

fn default_trend_threshold() -> f64 {
    0.2
}

fn default_concerning_threshold() -> f64 {
    1.0
}

fn default_max_suggestions() -> usize {
    3
}

/// Check-in listing and input limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinsConfig {
    #[serde(default = "default_list_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_notes_max_chars")]
    pub notes_max_chars: usize,
}

impl Default for CheckinsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_list_limit(),
            max_limit: default_max_limit(),
            notes_max_chars: default_notes_max_chars(),
        }
    }
}

fn default_list_limit() -> usize {
    20
}

fn default_max_limit() -> usize {
    50
}

fn default_notes_max_chars() -> usize {
    1000
}
