//! Resolved configuration for one command run.

use anyhow::Context;
use log::{debug, info};
use mnemo_rs_config::{LayeredConfigOptions, MnemoConfig};
use mnemo_rs_memory::schema::KNOWN_TYPES;
use mnemo_rs_memory::{
    Clock, MemoryError, MemoryLayout, MemoryStore, RecordQuery, RetentionPolicy,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Effective config plus the directory relative paths resolve against.
#[derive(Clone)]
pub struct Settings {
    pub config: MnemoConfig,
    base_dir: PathBuf,
    clock: Option<Arc<dyn Clock>>,
}

impl Settings {
    pub fn new(config: MnemoConfig, base_dir: impl AsRef<Path>) -> Self {
        Self {
            config,
            base_dir: base_dir.as_ref().to_path_buf(),
            clock: None,
        }
    }

    /// Load the layered config for `cwd`, with `config_path` applied last.
    pub fn load(cwd: &Path, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut options = LayeredConfigOptions::new(cwd);
        if let Some(path) = config_path {
            info!("loading runtime config layer (path={})", path.display());
            options = options.with_runtime_path(path);
        }
        let layered = MnemoConfig::load_layered_with_options(options)
            .context("failed to load layered config")?;
        debug!("layered config loaded (layers={})", layered.layers.len());
        Ok(Self::new(layered.config, cwd))
    }

    /// Clock handed to every store opened from these settings.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `memory.root`, resolved against the base directory when relative.
    pub fn memory_root(&self) -> PathBuf {
        let root = Path::new(&self.config.memory.root);
        if root.is_absolute() {
            root.to_path_buf()
        } else {
            self.base_dir.join(root)
        }
    }

    pub fn layout(&self) -> MemoryLayout {
        MemoryLayout::new(self.memory_root())
    }

    /// Store configured from the `memory` section.
    ///
    /// With `enforce_types` on, allowed types come from `schema.json` when it
    /// exists and from the built-in catalog otherwise.
    pub fn store(&self) -> Result<MemoryStore, MemoryError> {
        let memory = &self.config.memory;
        let mut store = MemoryStore::open(self.memory_root())
            .with_malformed_policy(memory.malformed_records.into())
            .with_default_agent(memory.default_agent.as_str());
        if let Some(clock) = &self.clock {
            store = store.with_clock(clock.clone());
        }
        if memory.enforce_types {
            let types: Vec<String> = match self.layout().load_schema()? {
                Some(schema) => schema.type_names().map(str::to_string).collect(),
                None => KNOWN_TYPES.iter().map(|(name, _)| name.to_string()).collect(),
            };
            debug!("enforcing record types (count={})", types.len());
            store = store.with_allowed_types(types);
        }
        Ok(store)
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.config.retention.to_policy()
    }

    /// Empty query carrying the configured default limit.
    pub fn query(&self) -> RecordQuery {
        RecordQuery::new().limit(self.config.memory.default_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use mnemo_rs_config::{MemoryConfig, MnemoConfig};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn relative_root_resolves_against_base_dir() {
        let temp = tempdir().expect("tempdir");
        let settings = Settings::new(MnemoConfig::default(), temp.path());
        assert_eq!(settings.memory_root(), temp.path().join("memory"));
        assert_eq!(settings.query().limit, 10);
    }

    #[test]
    fn enforced_types_fall_back_to_builtin_catalog() {
        let temp = tempdir().expect("tempdir");
        let config = MnemoConfig::builder()
            .memory(MemoryConfig {
                root: temp.path().join("abs").display().to_string(),
                enforce_types: true,
                ..MemoryConfig::default()
            })
            .build();
        let settings = Settings::new(config, "/unused");
        assert_eq!(settings.memory_root(), temp.path().join("abs"));
        let store = settings.store().expect("store");
        assert!(
            store
                .create(
                    mnemo_rs_memory::Category::Shared,
                    "rumour",
                    mnemo_rs_memory::RecordDraft::new("t", "d"),
                    mnemo_rs_memory::Extensions::new(),
                    None,
                )
                .is_err()
        );
    }
}
