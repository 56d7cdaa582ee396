//! Configuration schema for mnemo.

use chrono::Duration;
use mnemo_rs_memory::{Category, MalformedRecordPolicy, Priority, RetentionPolicy};
use serde::{Deserialize, Serialize};

/// Root config for a memory deployment.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MnemoConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub mirror: MirrorConfig,
}

impl MnemoConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> MnemoConfigBuilder {
        MnemoConfigBuilder::new()
    }
}

/// Builder for assembling a `MnemoConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct MnemoConfigBuilder {
    config: MnemoConfig,
}

impl MnemoConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: MnemoConfig::default(),
        }
    }

    /// Replace the store configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the retention configuration.
    pub fn retention(mut self, retention: RetentionConfig) -> Self {
        self.config.retention = retention;
        self
    }

    /// Replace the mirror configuration.
    pub fn mirror(mut self, mirror: MirrorConfig) -> Self {
        self.config.mirror = mirror;
        self
    }

    /// Finish building the config.
    pub fn build(self) -> MnemoConfig {
        self.config
    }
}

/// How retrieval treats record files that fail to decode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRecordMode {
    #[default]
    Skip,
    Abort,
}

impl From<MalformedRecordMode> for MalformedRecordPolicy {
    fn from(mode: MalformedRecordMode) -> Self {
        match mode {
            MalformedRecordMode::Skip => MalformedRecordPolicy::Skip,
            MalformedRecordMode::Abort => MalformedRecordPolicy::Abort,
        }
    }
}

/// Store location and defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryConfig {
    /// Memory root, relative to the working directory when not absolute.
    #[serde(default = "default_memory_root")]
    pub root: String,
    #[serde(default = "default_agent")]
    pub default_agent: String,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default)]
    pub malformed_records: MalformedRecordMode,
    /// Reject record types missing from the schema catalog.
    #[serde(default)]
    pub enforce_types: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            root: default_memory_root(),
            default_agent: default_agent(),
            default_limit: default_limit(),
            malformed_records: MalformedRecordMode::default(),
            enforce_types: false,
        }
    }
}

fn default_memory_root() -> String {
    "memory".to_string()
}

fn default_agent() -> String {
    mnemo_rs_memory::DEFAULT_AGENT.to_string()
}

fn default_limit() -> usize {
    mnemo_rs_memory::query::DEFAULT_LIMIT
}

/// Session expiry and low-value pruning settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetentionConfig {
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
    #[serde(default)]
    pub low_value: LowValueConfig,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            low_value: LowValueConfig::default(),
        }
    }
}

impl RetentionConfig {
    /// Policy consumed by the maintenance sweeps.
    pub fn to_policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            session_ttl: i64::try_from(self.session_ttl_hours)
                .ok()
                .and_then(Duration::try_hours)
                .unwrap_or(Duration::MAX),
            low_value_max_access: self.low_value.max_access_count,
            low_value_priority: self.low_value.priority,
            low_value_categories: self.low_value.categories.clone(),
        }
    }
}

fn default_session_ttl_hours() -> u64 {
    24
}

/// Thresholds for the low-value sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowValueConfig {
    /// Records accessed fewer times than this are candidates.
    #[serde(default = "default_max_access_count")]
    pub max_access_count: u64,
    #[serde(default = "default_low_value_priority")]
    pub priority: Priority,
    #[serde(default = "default_low_value_categories")]
    pub categories: Vec<Category>,
}

impl Default for LowValueConfig {
    fn default() -> Self {
        Self {
            max_access_count: default_max_access_count(),
            priority: default_low_value_priority(),
            categories: default_low_value_categories(),
        }
    }
}

fn default_max_access_count() -> u64 {
    2
}

fn default_low_value_priority() -> Priority {
    Priority::Low
}

fn default_low_value_categories() -> Vec<Category> {
    vec![Category::Development, Category::Sessions]
}

/// Vector-memory mirror settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MirrorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_mirror_categories")]
    pub categories: Vec<Category>,
    #[serde(default = "default_include_agent_configs")]
    pub include_agent_configs: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            user_id: default_user_id(),
            project: default_project(),
            timeout_secs: default_timeout_secs(),
            categories: default_mirror_categories(),
            include_agent_configs: default_include_agent_configs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.mem0.ai".to_string()
}

fn default_api_key_env() -> String {
    "MEM0_API_KEY".to_string()
}

fn default_user_id() -> String {
    "lct_project".to_string()
}

fn default_project() -> String {
    "lct-commit".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_mirror_categories() -> Vec<Category> {
    vec![Category::Project, Category::Development, Category::Shared]
}

fn default_include_agent_configs() -> bool {
    true
}
