//! Tests for layered configuration loading.

use super::*;
use crate::{MalformedRecordMode, MemoryConfig, MirrorConfig};
use chrono::Duration;
use mnemo_rs_memory::{Category, MalformedRecordPolicy, Priority};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write JSON5 contents to a path, creating parent directories if needed.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Project with a `.git` marker and a nested working directory.
fn project_tree(root: &Path) -> (PathBuf, PathBuf) {
    let project_root = root.join("project");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    let cwd = project_root.join("subdir");
    fs::create_dir_all(&cwd).expect("cwd");
    (project_root, cwd)
}

#[test]
fn parse_minimal_config() {
    let config = MnemoConfig::load_from_str("{}").expect("config");
    assert_eq!(config, MnemoConfig::default());
    assert_eq!(config.memory.root, "memory");
    assert_eq!(config.memory.default_limit, 10);
    assert_eq!(config.retention.session_ttl_hours, 24);
    assert_eq!(config.retention.low_value.max_access_count, 2);
    assert_eq!(
        config.mirror.categories,
        vec![Category::Project, Category::Development, Category::Shared]
    );
    assert!(!config.mirror.enabled);
}

#[test]
fn default_retention_maps_to_policy() {
    let policy = MnemoConfig::default().retention.to_policy();
    assert_eq!(policy, mnemo_rs_memory::RetentionPolicy::default());
}

#[test]
fn parses_json5_with_comments_and_overrides() {
    let json5 = r#"
    {
        // store lives next to the repo
        memory: { root: "/var/lib/mnemo", malformed_records: "abort", enforce_types: true },
        retention: {
            session_ttl_hours: 48,
            low_value: { max_access_count: 5, priority: "medium", categories: ["shared"] },
        },
        mirror: { enabled: true, timeout_secs: 5 },
    }
    "#;
    let config = MnemoConfig::load_from_str(json5).expect("config");
    assert_eq!(config.memory.malformed_records, MalformedRecordMode::Abort);
    assert_eq!(
        MalformedRecordPolicy::from(config.memory.malformed_records),
        MalformedRecordPolicy::Abort
    );
    let policy = config.retention.to_policy();
    assert_eq!(policy.session_ttl, Duration::hours(48));
    assert_eq!(policy.low_value_max_access, 5);
    assert_eq!(policy.low_value_priority, Priority::Medium);
    assert_eq!(policy.low_value_categories, vec![Category::Shared]);
    assert_eq!(config.mirror.timeout_secs, 5);
}

#[test]
fn rejects_unknown_top_level_key() {
    let err = MnemoConfig::load_from_str(r#"{ unexpected: true }"#).unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

#[test]
fn rejects_reserved_agents_category() {
    let err = MnemoConfig::load_from_str(r#"{ mirror: { categories: ["project", "agents"] } }"#)
        .unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("mirror.categories[1]"), "{msg}");
    assert!(msg.contains("unknown category"), "{msg}");
}

#[test]
fn rejects_invalid_priority_and_types() {
    let err = MnemoConfig::load_from_str(r#"{ retention: { low_value: { priority: "urgent" } } }"#)
        .unwrap_err();
    assert!(format!("{err}").contains("retention.low_value.priority"));

    let err = MnemoConfig::load_from_str(r#"{ retention: { session_ttl_hours: -1 } }"#)
        .unwrap_err();
    assert!(format!("{err}").contains("retention.session_ttl_hours"));

    let err = MnemoConfig::load_from_str(r#"{ memory: { malformed_records: "ignore" } }"#)
        .unwrap_err();
    assert!(format!("{err}").contains("memory.malformed_records"));
}

#[test]
fn rejects_zero_limits() {
    let err = MnemoConfig::load_from_str(r#"{ memory: { default_limit: 0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    let err = MnemoConfig::load_from_str(r#"{ retention: { session_ttl_hours: 0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn layered_config_prefers_cwd_over_project_and_user() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let (project_root, cwd) = project_tree(root);

    let user_config = root.join("user.json5");
    write_json5(
        &user_config,
        r#"{ memory: { root: "user", default_agent: "sentinel" } }"#,
    );
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        r#"{ memory: { root: "project" }, retention: { session_ttl_hours: 12 } }"#,
    );
    write_json5(&cwd.join(DEFAULT_CONFIG_FILE), r#"{ memory: { root: "cwd" } }"#);

    let mut options = LayeredConfigOptions::new(&cwd);
    options.user_config_path = Some(user_config);

    let layered = MnemoConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.memory.root, "cwd");
    assert_eq!(layered.config.memory.default_agent, "sentinel");
    assert_eq!(layered.config.retention.session_ttl_hours, 12);
    let sources: Vec<ConfigLayerSource> = layered.layers.iter().map(|l| l.source).collect();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::User,
            ConfigLayerSource::Project,
            ConfigLayerSource::Cwd
        ]
    );
}

#[test]
fn runtime_layer_wins_and_must_exist() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project_tree(temp.path());
    let runtime = temp.path().join("runtime.json5");
    write_json5(&runtime, r#"{ mirror: { enabled: true, user_id: "ci" } }"#);

    let mut options = LayeredConfigOptions::new(&cwd).with_runtime_path(&runtime);
    options.user_config_path = None;
    let layered = MnemoConfig::load_layered_with_options(options).expect("layered");
    assert!(layered.config.mirror.enabled);
    assert_eq!(layered.config.mirror.user_id, "ci");

    let mut missing = LayeredConfigOptions::new(&cwd).with_runtime_path(temp.path().join("nope"));
    missing.user_config_path = None;
    let err = MnemoConfig::load_layered_with_options(missing).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn project_layer_in_cwd_is_loaded_once() {
    let temp = TempDir::new().expect("tmp");
    let project_root = temp.path().join("repo");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        r#"{ memory: { default_limit: 3 } }"#,
    );

    let mut options = LayeredConfigOptions::new(&project_root);
    options.user_config_path = None;
    let layered = MnemoConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.layers.len(), 1);
    assert_eq!(layered.config.memory.default_limit, 3);
}

#[test]
fn invalid_layer_error_names_the_layer() {
    let temp = TempDir::new().expect("tmp");
    let (_, cwd) = project_tree(temp.path());
    write_json5(&cwd.join(DEFAULT_CONFIG_FILE), r#"{ memory: { root: 7 } }"#);

    let mut options = LayeredConfigOptions::new(&cwd);
    options.user_config_path = None;
    let err = MnemoConfig::load_layered_with_options(options).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("cwd("), "{msg}");
    assert!(msg.contains("memory.root"), "{msg}");
}

#[test]
fn builder_replaces_sections() {
    let config = MnemoConfig::builder()
        .memory(MemoryConfig {
            root: "/tmp/mem".to_string(),
            ..MemoryConfig::default()
        })
        .mirror(MirrorConfig {
            enabled: true,
            ..MirrorConfig::default()
        })
        .build();
    assert_eq!(config.memory.root, "/tmp/mem");
    assert!(config.mirror.enabled);
    config.validate().expect("valid");
}
