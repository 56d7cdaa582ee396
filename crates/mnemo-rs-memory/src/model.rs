//! Memory record model persisted by backends.

use crate::error::MemoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Directory reserved for per-agent configuration; never a record category.
pub const RESERVED_AGENTS_DIR: &str = "agents";

/// Content fields maintained by the store itself.
const SYSTEM_CONTENT_FIELDS: [&str; 4] = ["created_at", "last_updated", "access_count", "last_accessed"];

/// Top-level record grouping; decides the storage directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Long-term project context and business requirements.
    Project,
    /// Mid-term development context and patterns.
    Development,
    /// Short-term session context.
    Sessions,
    /// Cross-agent shared knowledge.
    Shared,
}

impl Category {
    /// Every record category, in directory bootstrap order.
    pub const ALL: [Category; 4] = [
        Category::Project,
        Category::Development,
        Category::Sessions,
        Category::Shared,
    ];

    /// Directory and id prefix for the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Project => "project",
            Category::Development => "development",
            Category::Sessions => "sessions",
            Category::Shared => "shared",
        }
    }

    /// Declared persistence tier. Only the session expiry sweep acts on it.
    pub fn persistence(self) -> PersistenceTier {
        match self {
            Category::Project | Category::Shared => PersistenceTier::Permanent,
            Category::Development => PersistenceTier::SemiPermanent,
            Category::Sessions => PersistenceTier::Temporary,
        }
    }

    /// Human description used by the schema catalog.
    pub fn description(self) -> &'static str {
        match self {
            Category::Project => "Long-term project context and business requirements",
            Category::Development => "Mid-term development context and patterns",
            Category::Sessions => "Short-term session context",
            Category::Shared => "Cross-agent shared knowledge",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = MemoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| MemoryError::UnknownCategory(value.to_string()))
    }
}

/// Nominal retention of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceTier {
    Permanent,
    SemiPermanent,
    Temporary,
}

impl PersistenceTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PersistenceTier::Permanent => "permanent",
            PersistenceTier::SemiPermanent => "semi-permanent",
            PersistenceTier::Temporary => "temporary",
        }
    }
}

/// Record priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("invalid priority: {other}")),
        }
    }
}

/// Primitive value allowed in caller-supplied extension fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ExtensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionValue::Null => f.write_str("null"),
            ExtensionValue::Bool(value) => write!(f, "{value}"),
            ExtensionValue::Integer(value) => write!(f, "{value}"),
            ExtensionValue::Float(value) => write!(f, "{value}"),
            ExtensionValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for ExtensionValue {
    fn from(value: &str) -> Self {
        ExtensionValue::Text(value.to_string())
    }
}

impl From<String> for ExtensionValue {
    fn from(value: String) -> Self {
        ExtensionValue::Text(value)
    }
}

impl From<bool> for ExtensionValue {
    fn from(value: bool) -> Self {
        ExtensionValue::Bool(value)
    }
}

impl From<i64> for ExtensionValue {
    fn from(value: i64) -> Self {
        ExtensionValue::Integer(value)
    }
}

impl From<f64> for ExtensionValue {
    fn from(value: f64) -> Self {
        ExtensionValue::Float(value)
    }
}

impl<T: Into<ExtensionValue>> From<Option<T>> for ExtensionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ExtensionValue::Null, Into::into)
    }
}

/// Extension fields keyed by name.
pub type Extensions = BTreeMap<String, ExtensionValue>;

/// Record body: required fields, system-maintained fields and extensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Set once when the record is created.
    #[serde(
        default,
        with = "crate::timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "crate::timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<DateTime<Utc>>,
    /// Only ever incremented by access accounting.
    #[serde(default)]
    pub access_count: u64,
    #[serde(
        default,
        with = "crate::timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extensions,
}

impl RecordContent {
    /// Merge extension fields, routing typed keys to their fields.
    ///
    /// System fields and `tags` are rejected, as is a typed key whose value
    /// does not fit the field.
    pub fn merge_extensions(&mut self, extensions: Extensions) -> Result<(), MemoryError> {
        if let Some(key) = extensions.keys().find(|key| is_reserved_content_key(key)) {
            return Err(MemoryError::ReservedField(key.clone()));
        }
        for (key, value) in extensions {
            match key.as_str() {
                "title" => self.title = text_field(&key, value)?,
                "description" => self.description = text_field(&key, value)?,
                "context" => self.context = text_field(&key, value)?,
                "priority" => {
                    let priority = text_field(&key, value)?
                        .parse()
                        .map_err(|_| MemoryError::ReservedField(key.clone()))?;
                    self.priority = Some(priority);
                }
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
        Ok(())
    }
}

fn is_reserved_content_key(key: &str) -> bool {
    key == "tags" || SYSTEM_CONTENT_FIELDS.contains(&key)
}

fn text_field(key: &str, value: ExtensionValue) -> Result<String, MemoryError> {
    match value {
        ExtensionValue::Text(text) => Ok(text),
        _ => Err(MemoryError::ReservedField(key.to_string())),
    }
}

/// Provenance plus caller-supplied extension fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
    #[serde(flatten)]
    pub extra: Extensions,
}

impl RecordMetadata {
    /// Provenance for a new record, overlaid with caller metadata.
    ///
    /// Caller-supplied provenance keys win over the stamped agent.
    pub fn stamped(agent: &str, overlay: Extensions) -> Self {
        let mut metadata = Self {
            agent: Some(agent.to_string()),
            created_by: Some(agent.to_string()),
            last_updated_by: Some(agent.to_string()),
            extra: Extensions::new(),
        };
        metadata.overlay(overlay);
        metadata
    }

    /// Shallow-merge extension fields, routing provenance keys to their slots.
    pub fn overlay(&mut self, overlay: Extensions) {
        for (key, value) in overlay {
            let text = match &value {
                ExtensionValue::Null => None,
                other => Some(other.to_string()),
            };
            match key.as_str() {
                "agent" => self.agent = text,
                "created_by" => self.created_by = text,
                "last_updated_by" => self.last_updated_by = text,
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
    }
}

/// Persisted memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Record identifier; equals the storage file stem.
    pub memory_id: String,
    pub category: Category,
    /// Free-form record type such as `decision` or `learning`.
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: RecordContent,
    #[serde(default)]
    pub metadata: RecordMetadata,
}

impl MemoryRecord {
    /// Storage file name for the record.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.memory_id)
    }

    /// True when any requested tag is present on the record.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.content.tags.contains(tag))
    }
}

/// Caller-supplied content for a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub title: String,
    pub description: String,
    pub context: String,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub extra: Extensions,
}

impl RecordDraft {
    /// Start a draft with medium priority and no tags.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            context: String::new(),
            tags: Vec::new(),
            priority: Priority::Medium,
            extra: Extensions::new(),
        }
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Attach an extension field to the content.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<ExtensionValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Build stamped content for a record created at `now`.
    pub(crate) fn into_content(self, now: DateTime<Utc>) -> Result<RecordContent, MemoryError> {
        let mut content = RecordContent {
            title: self.title,
            description: self.description,
            context: self.context,
            tags: self.tags,
            priority: Some(self.priority),
            created_at: Some(now),
            last_updated: Some(now),
            access_count: 0,
            last_accessed: None,
            extra: Extensions::new(),
        };
        content.merge_extensions(self.extra)?;
        Ok(content)
    }
}

/// Partial content update; absent fields are preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub context: Option<String>,
    pub tags: Option<Vec<String>>,
    pub priority: Option<Priority>,
    pub extra: Extensions,
}

impl ContentPatch {
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<ExtensionValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub(crate) fn apply(self, content: &mut RecordContent) -> Result<(), MemoryError> {
        content.merge_extensions(self.extra)?;
        if let Some(title) = self.title {
            content.title = title;
        }
        if let Some(description) = self.description {
            content.description = description;
        }
        if let Some(context) = self.context {
            content.context = context;
        }
        if let Some(tags) = self.tags {
            content.tags = tags;
        }
        if let Some(priority) = self.priority {
            content.priority = Some(priority);
        }
        Ok(())
    }
}

/// Partial metadata update; provenance keys route to their slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataPatch {
    pub fields: Extensions,
}

impl MetadataPatch {
    pub fn field(mut self, key: impl Into<String>, value: impl Into<ExtensionValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Update request for an existing record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    pub content: Option<ContentPatch>,
    pub metadata: Option<MetadataPatch>,
}

impl RecordUpdate {
    /// Update touching only content fields.
    pub fn content(patch: ContentPatch) -> Self {
        Self {
            content: Some(patch),
            metadata: None,
        }
    }

    /// Update touching only metadata fields.
    pub fn metadata(patch: MetadataPatch) -> Self {
        Self {
            content: None,
            metadata: Some(patch),
        }
    }
}
