//! Storage backends for memory records.
//!
//! The store talks to a narrow `RecordBackend` interface so the on-disk layout
//! can be swapped for an indexed or locked store without touching callers.
//! `FileBackend` keeps one JSON document per record under
//! `{root}/{category}/{id}.json`.

use crate::error::MemoryError;
use crate::id::{category_hint, validate_record_id};
use crate::model::{Category, MemoryRecord};
use log::{debug, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Outcome of decoding one stored record during a category scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScannedRecord {
    /// Record decoded and consistent with its location.
    Valid(MemoryRecord),
    /// Stored entry that could not be decoded.
    Malformed { location: String, reason: String },
}

/// How scans treat entries that fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedRecordPolicy {
    /// Log a warning and continue with the remaining records.
    #[default]
    Skip,
    /// Fail the whole operation with `MemoryError::Malformed`.
    Abort,
}

/// Storage interface used by `MemoryStore` and the maintenance sweeps.
pub trait RecordBackend: Send + Sync {
    /// Insert or replace a record.
    fn put(&self, record: &MemoryRecord) -> Result<(), MemoryError>;

    /// Load a record by id, searching every category.
    fn get(&self, id: &str) -> Result<Option<MemoryRecord>, MemoryError>;

    /// Decode every record stored in a category. A missing category is empty.
    fn scan(&self, category: Category) -> Result<Vec<ScannedRecord>, MemoryError>;

    /// Remove a record; returns false when nothing was stored under the id.
    fn delete(&self, category: Category, id: &str) -> Result<bool, MemoryError>;

    /// Records in a category matching `predicate`, applying the malformed policy.
    fn list(
        &self,
        category: Category,
        predicate: &dyn Fn(&MemoryRecord) -> bool,
        policy: MalformedRecordPolicy,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        let mut records = Vec::new();
        for entry in self.scan(category)? {
            match entry {
                ScannedRecord::Valid(record) => {
                    if predicate(&record) {
                        records.push(record);
                    }
                }
                ScannedRecord::Malformed { location, reason } => match policy {
                    MalformedRecordPolicy::Skip => {
                        warn!("skipping malformed record (location={location}): {reason}");
                    }
                    MalformedRecordPolicy::Abort => {
                        return Err(MemoryError::Malformed { location, reason });
                    }
                },
            }
        }
        Ok(records)
    }
}

/// Directory-per-category backend storing pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct FileBackend {
    /// Memory root containing the category directories.
    root: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `root`. Directories are created lazily on write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        debug!("file record backend (root={})", root.display());
        Self { root }
    }

    /// Memory root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a category's records.
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.as_str())
    }

    /// Path of the file holding record `id` in `category`.
    pub fn record_path(&self, category: Category, id: &str) -> PathBuf {
        self.category_dir(category).join(format!("{id}.json"))
    }

    /// Category whose directory holds `id`, preferring the id prefix.
    fn locate(&self, id: &str) -> Option<Category> {
        let hinted = category_hint(id);
        hinted
            .into_iter()
            .chain(Category::ALL.into_iter().filter(|c| Some(*c) != hinted))
            .find(|category| self.record_path(*category, id).is_file())
    }

    fn read_record(&self, category: Category, path: &Path) -> ScannedRecord {
        let location = path.display().to_string();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                return ScannedRecord::Malformed {
                    location,
                    reason: err.to_string(),
                };
            }
        };
        let record: MemoryRecord = match serde_json::from_str(&contents) {
            Ok(record) => record,
            Err(err) => {
                return ScannedRecord::Malformed {
                    location,
                    reason: err.to_string(),
                };
            }
        };
        let stem = path.file_stem().and_then(|stem| stem.to_str());
        if stem != Some(record.memory_id.as_str()) {
            return ScannedRecord::Malformed {
                location,
                reason: format!("memory_id {} does not match file name", record.memory_id),
            };
        }
        if record.category != category {
            return ScannedRecord::Malformed {
                location,
                reason: format!(
                    "category {} does not match directory {}",
                    record.category, category
                ),
            };
        }
        ScannedRecord::Valid(record)
    }
}

impl RecordBackend for FileBackend {
    /// Write through a temp file and rename so readers never see partial JSON.
    fn put(&self, record: &MemoryRecord) -> Result<(), MemoryError> {
        validate_record_id(&record.memory_id)?;
        let dir = self.category_dir(record.category);
        fs::create_dir_all(&dir)?;
        let path = dir.join(record.file_name());
        let temp_path = dir.join(format!("{}.json.tmp", record.memory_id));
        {
            let mut file = fs::File::create(&temp_path)?;
            serde_json::to_writer_pretty(&mut file, record)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;
        debug!(
            "wrote memory record (id={}, category={})",
            record.memory_id, record.category
        );
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<MemoryRecord>, MemoryError> {
        validate_record_id(id)?;
        let Some(category) = self.locate(id) else {
            return Ok(None);
        };
        match self.read_record(category, &self.record_path(category, id)) {
            ScannedRecord::Valid(record) => Ok(Some(record)),
            ScannedRecord::Malformed { location, reason } => {
                Err(MemoryError::Malformed { location, reason })
            }
        }
    }

    fn scan(&self, category: Category) -> Result<Vec<ScannedRecord>, MemoryError> {
        let dir = self.category_dir(category);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("category directory missing (path={})", dir.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(MemoryError::Io(err)),
        };
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths
            .iter()
            .map(|path| self.read_record(category, path))
            .collect())
    }

    fn delete(&self, category: Category, id: &str) -> Result<bool, MemoryError> {
        validate_record_id(id)?;
        match fs::remove_file(self.record_path(category, id)) {
            Ok(()) => {
                debug!("deleted memory record (id={id}, category={category})");
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(MemoryError::Io(err)),
        }
    }
}
