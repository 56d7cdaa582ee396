use mnemo_rs_memory::{Category, MemoryError, MemoryRecord, RecordBackend, ScannedRecord};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Map-backed `RecordBackend`; entries scan in id order.
#[derive(Default)]
pub struct InMemoryBackend {
    entries: Mutex<BTreeMap<(Category, String), ScannedRecord>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = MemoryRecord>) -> Self {
        let backend = Self::new();
        for record in records {
            backend.entries.lock().insert(
                (record.category, record.memory_id.clone()),
                ScannedRecord::Valid(record),
            );
        }
        backend
    }

    /// Store an entry that scans as malformed.
    pub fn insert_malformed(&self, category: Category, id: &str, reason: &str) {
        self.entries.lock().insert(
            (category, id.to_string()),
            ScannedRecord::Malformed {
                location: format!("{category}/{id}"),
                reason: reason.to_string(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl RecordBackend for InMemoryBackend {
    fn put(&self, record: &MemoryRecord) -> Result<(), MemoryError> {
        self.entries.lock().insert(
            (record.category, record.memory_id.clone()),
            ScannedRecord::Valid(record.clone()),
        );
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<MemoryRecord>, MemoryError> {
        let entries = self.entries.lock();
        for ((_, stored_id), entry) in entries.iter() {
            if stored_id != id {
                continue;
            }
            return match entry {
                ScannedRecord::Valid(record) => Ok(Some(record.clone())),
                ScannedRecord::Malformed { location, reason } => Err(MemoryError::Malformed {
                    location: location.clone(),
                    reason: reason.clone(),
                }),
            };
        }
        Ok(None)
    }

    fn scan(&self, category: Category) -> Result<Vec<ScannedRecord>, MemoryError> {
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|((stored, _), _)| *stored == category)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    fn delete(&self, category: Category, id: &str) -> Result<bool, MemoryError> {
        Ok(self
            .entries
            .lock()
            .remove(&(category, id.to_string()))
            .is_some())
    }
}
