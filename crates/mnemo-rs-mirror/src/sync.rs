//! Push stored record documents into a vector-memory service.

use crate::error::MirrorError;
use crate::provider::{MirrorMetadata, VectorEntry, VectorMemory};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use mnemo_rs_config::MirrorConfig;
use mnemo_rs_memory::{Category, Clock, MemoryLayout, SystemClock};
use serde_json::{Value, json};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Counts from one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: usize,
    pub failed: usize,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Synced: {} memories", self.synced)?;
        write!(f, "Failed: {} memories", self.failed)
    }
}

/// A document selected for syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSource {
    /// `project`, `development`, ... or `agents/<name>`.
    pub category: String,
    pub path: PathBuf,
}

/// Text sent for a document: title, description and the content as JSON.
///
/// Documents without a `content` object send the whole document as data.
pub fn format_document(document: &Value) -> Result<String, MirrorError> {
    let mut parts = Vec::new();
    let content = document.get("content");
    if let Some(content) = content.and_then(Value::as_object) {
        if let Some(title) = content.get("title") {
            parts.push(format!("Title: {}", display_value(title)));
        }
        if let Some(description) = content.get("description") {
            parts.push(format!("Description: {}", display_value(description)));
        }
    }
    let data = serde_json::to_string_pretty(content.unwrap_or(document))?;
    parts.push(format!("Data: {data}"));
    Ok(parts.join("\n\n"))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Mirrors record files and agent configs under a memory root.
pub struct RecordSync {
    memory: Arc<dyn VectorMemory>,
    layout: MemoryLayout,
    user_id: String,
    project: String,
    categories: Vec<Category>,
    include_agent_configs: bool,
    clock: Arc<dyn Clock>,
}

impl RecordSync {
    /// Sync with the default mirror settings.
    pub fn new(memory: Arc<dyn VectorMemory>, root: impl AsRef<Path>) -> Self {
        Self::from_config(memory, root, &MirrorConfig::default())
    }

    pub fn from_config(
        memory: Arc<dyn VectorMemory>,
        root: impl AsRef<Path>,
        config: &MirrorConfig,
    ) -> Self {
        Self {
            memory,
            layout: MemoryLayout::new(root),
            user_id: config.user_id.clone(),
            project: config.project.clone(),
            categories: config.categories.clone(),
            include_agent_configs: config.include_agent_configs,
            clock: Arc::new(SystemClock),
        }
    }

    /// Clock used for documents without a timestamp.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// JSON documents to push, in category then file-name order.
    pub fn sources(&self) -> Vec<SyncSource> {
        let mut sources = Vec::new();
        for category in &self.categories {
            let dir = self.layout.root().join(category.as_str());
            for path in json_files(&dir, 1) {
                sources.push(SyncSource {
                    category: category.as_str().to_string(),
                    path,
                });
            }
        }
        if self.include_agent_configs {
            for path in json_files(&self.layout.agents_dir(), 2) {
                let agent = path
                    .parent()
                    .and_then(Path::file_name)
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                sources.push(SyncSource {
                    category: format!("agents/{agent}"),
                    path,
                });
            }
        }
        sources
    }

    /// Push every source; individual failures are counted, not returned.
    pub async fn run(&self) -> SyncReport {
        let mut report = SyncReport::default();
        let sources = self.sources();
        info!(
            "syncing memory documents (root={}, count={})",
            self.layout.root().display(),
            sources.len()
        );
        for source in &sources {
            match self.sync_source(source).await {
                Ok(_) => {
                    debug!("synced document (path={})", source.path.display());
                    report.synced += 1;
                }
                Err(err) => {
                    warn!("failed to sync document (path={}): {err}", source.path.display());
                    report.failed += 1;
                }
            }
        }
        info!(
            "memory sync finished (synced={}, failed={})",
            report.synced, report.failed
        );
        report
    }

    pub async fn sync_source(&self, source: &SyncSource) -> Result<Vec<VectorEntry>, MirrorError> {
        let document: Value = serde_json::from_str(&fs::read_to_string(&source.path)?)?;
        let text = format_document(&document)?;
        let metadata = self.document_metadata(&document, source);
        self.memory.add(&text, &self.user_id, metadata).await
    }

    /// Sync metadata overlaid with the document's own `metadata` object.
    pub fn document_metadata(&self, document: &Value, source: &SyncSource) -> MirrorMetadata {
        let stem = source
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = source
            .path
            .strip_prefix(self.layout.root())
            .unwrap_or(source.path.as_path())
            .to_string_lossy()
            .replace('\\', "/");

        let mut metadata = MirrorMetadata::new();
        metadata.insert("category".to_string(), json!(source.category));
        metadata.insert("file".to_string(), json!(file));
        metadata.insert(
            "memory_id".to_string(),
            document.get("memory_id").cloned().unwrap_or(json!(stem)),
        );
        metadata.insert(
            "type".to_string(),
            document.get("type").cloned().unwrap_or(json!("unknown")),
        );
        metadata.insert("timestamp".to_string(), self.timestamp(document));
        metadata.insert("project".to_string(), json!(self.project));
        if let Some(overlay) = document.get("metadata").and_then(Value::as_object) {
            for (key, value) in overlay {
                metadata.insert(key.clone(), value.clone());
            }
        }
        if let Some(tags) = document.pointer("/content/tags").and_then(Value::as_array) {
            let joined: Vec<String> = tags.iter().map(display_value).collect();
            metadata.insert("tags".to_string(), json!(joined.join(",")));
        }
        metadata
    }

    /// Document `timestamp`, then `content.created_at`, then the clock.
    fn timestamp(&self, document: &Value) -> Value {
        document
            .get("timestamp")
            .or_else(|| document.pointer("/content/created_at"))
            .filter(|value| !value.is_null())
            .cloned()
            .unwrap_or_else(|| json!(rfc3339(self.clock.now())))
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// `.json` files exactly `depth` levels below `dir`, sorted by path.
fn json_files(dir: &Path, depth: usize) -> Vec<PathBuf> {
    if !dir.is_dir() {
        debug!("sync source directory missing (path={})", dir.display());
        return Vec::new();
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(depth)
        .max_depth(depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable sync entry (dir={}): {err}", dir.display());
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    files
}
