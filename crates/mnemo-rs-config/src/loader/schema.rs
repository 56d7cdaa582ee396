//! Schema validation helpers for mnemo JSON5 configuration.

use crate::ConfigError;
use mnemo_rs_memory::{Category, Priority};
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(map, &["$schema", "memory", "retention", "mirror"], layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("memory") {
        validate_memory(value, layer, "memory")?;
    }
    if let Some(value) = map.get("retention") {
        validate_retention(value, layer, "retention")?;
    }
    if let Some(value) = map.get("mirror") {
        validate_mirror(value, layer, "mirror")?;
    }
    Ok(())
}

/// Validate the "memory" block.
fn validate_memory(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "root",
            "default_agent",
            "default_limit",
            "malformed_records",
            "enforce_types",
        ],
        layer,
        path,
    )?;

    if let Some(value) = map.get("root") {
        expect_string(value, layer, &join_path(path, "root"))?;
    }
    if let Some(value) = map.get("default_agent") {
        expect_string(value, layer, &join_path(path, "default_agent"))?;
    }
    if let Some(value) = map.get("default_limit") {
        expect_u64(value, layer, &join_path(path, "default_limit"))?;
    }
    if let Some(value) = map.get("malformed_records") {
        expect_one_of(
            value,
            &["skip", "abort"],
            layer,
            &join_path(path, "malformed_records"),
        )?;
    }
    if let Some(value) = map.get("enforce_types") {
        expect_bool(value, layer, &join_path(path, "enforce_types"))?;
    }
    Ok(())
}

/// Validate the "retention" block.
fn validate_retention(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["session_ttl_hours", "low_value"], layer, path)?;

    if let Some(value) = map.get("session_ttl_hours") {
        expect_u64(value, layer, &join_path(path, "session_ttl_hours"))?;
    }
    if let Some(value) = map.get("low_value") {
        validate_low_value(value, layer, &join_path(path, "low_value"))?;
    }
    Ok(())
}

/// Validate the low-value sweep thresholds.
fn validate_low_value(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["max_access_count", "priority", "categories"],
        layer,
        path,
    )?;

    if let Some(value) = map.get("max_access_count") {
        expect_u64(value, layer, &join_path(path, "max_access_count"))?;
    }
    if let Some(value) = map.get("priority") {
        let priority_path = join_path(path, "priority");
        let raw = value
            .as_str()
            .ok_or_else(|| invalid_field(layer, &priority_path, "expected string"))?;
        raw.parse::<Priority>()
            .map_err(|message| invalid_field(layer, &priority_path, &message))?;
    }
    if let Some(value) = map.get("categories") {
        validate_category_array(value, layer, &join_path(path, "categories"))?;
    }
    Ok(())
}

/// Validate the "mirror" block.
fn validate_mirror(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "enabled",
            "base_url",
            "api_key_env",
            "user_id",
            "project",
            "timeout_secs",
            "categories",
            "include_agent_configs",
        ],
        layer,
        path,
    )?;

    for key in ["enabled", "include_agent_configs"] {
        if let Some(value) = map.get(key) {
            expect_bool(value, layer, &join_path(path, key))?;
        }
    }
    for key in ["base_url", "api_key_env", "user_id", "project"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("timeout_secs") {
        expect_u64(value, layer, &join_path(path, "timeout_secs"))?;
    }
    if let Some(value) = map.get("categories") {
        validate_category_array(value, layer, &join_path(path, "categories"))?;
    }
    Ok(())
}

/// Validate an array of record category names.
fn validate_category_array(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let arr = expect_array(value, layer, path)?;
    for (idx, entry) in arr.iter().enumerate() {
        let entry_path = format!("{path}[{idx}]");
        let name = entry
            .as_str()
            .ok_or_else(|| invalid_field(layer, &entry_path, "expected string"))?;
        if name.parse::<Category>().is_err() {
            return Err(invalid_field(
                layer,
                &entry_path,
                &format!("unknown category '{name}'"),
            ));
        }
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON array or return a typed error.
fn expect_array<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Vec<Value>, ConfigError> {
    match value {
        Value::Array(arr) => Ok(arr),
        _ => Err(invalid_field(layer, path, "expected array")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a JSON boolean or return a typed error.
fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if matches!(value, Value::Bool(_)) {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected bool"))
    }
}

/// Expect a non-negative JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Expect one of a fixed set of strings.
fn expect_one_of(
    value: &Value,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match value.as_str() {
        Some(raw) if allowed.contains(&raw) => Ok(()),
        _ => Err(invalid_field(
            layer,
            path,
            &format!("expected one of: {}", allowed.join(", ")),
        )),
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
