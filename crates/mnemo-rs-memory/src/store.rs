//! Memory store: create, retrieve, update and access accounting.

use crate::backend::{FileBackend, MalformedRecordPolicy, RecordBackend};
use crate::error::MemoryError;
use crate::id::generate_record_id;
use crate::model::{Category, Extensions, MemoryRecord, RecordDraft, RecordMetadata, RecordUpdate};
use crate::query::{RecordQuery, newest_first};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Agent recorded when callers do not name one.
pub const DEFAULT_AGENT: &str = "system";

/// Source of the current time for record stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Record store over a pluggable backend.
///
/// No state is cached between calls; every operation reads the backend.
#[derive(Clone)]
pub struct MemoryStore {
    backend: Arc<dyn RecordBackend>,
    clock: Arc<dyn Clock>,
    malformed_policy: MalformedRecordPolicy,
    /// When set, `create` rejects types outside this set.
    allowed_types: Option<BTreeSet<String>>,
    /// Agent stamped when callers pass none.
    default_agent: String,
}

impl MemoryStore {
    /// Store over an arbitrary backend with the system clock.
    pub fn new(backend: Arc<dyn RecordBackend>) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            malformed_policy: MalformedRecordPolicy::default(),
            allowed_types: None,
            default_agent: DEFAULT_AGENT.to_string(),
        }
    }

    /// Store over the directory layout rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Self {
        info!("opening memory store (root={})", root.as_ref().display());
        Self::new(Arc::new(FileBackend::new(root)))
    }

    /// Replace the clock used for timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Choose how retrieval treats undecodable records.
    pub fn with_malformed_policy(mut self, policy: MalformedRecordPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    /// Reject record types outside `types` at create time.
    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Agent recorded by `create` and `update` when none is given.
    pub fn with_default_agent(mut self, agent: impl Into<String>) -> Self {
        self.default_agent = agent.into();
        self
    }

    /// Backend handle for maintenance sweeps.
    pub fn backend(&self) -> &dyn RecordBackend {
        self.backend.as_ref()
    }

    /// Current time according to the store clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Persist a new record and return its id.
    pub fn create(
        &self,
        category: Category,
        record_type: &str,
        draft: RecordDraft,
        metadata: Extensions,
        agent: Option<&str>,
    ) -> Result<String, MemoryError> {
        if let Some(allowed) = &self.allowed_types
            && !allowed.contains(record_type)
        {
            return Err(MemoryError::UnknownType(record_type.to_string()));
        }
        let now = self.clock.now();
        let agent = agent.unwrap_or(&self.default_agent);
        let record = MemoryRecord {
            memory_id: generate_record_id(category, record_type, now),
            category,
            record_type: record_type.to_string(),
            content: draft.into_content(now)?,
            metadata: RecordMetadata::stamped(agent, metadata),
        };
        self.backend.put(&record)?;
        info!(
            "created memory record (id={}, category={}, type={}, agent={})",
            record.memory_id, category, record_type, agent
        );
        Ok(record.memory_id)
    }

    /// Records matching `query`, newest first, capped at `query.limit`.
    pub fn retrieve(&self, query: &RecordQuery) -> Result<Vec<MemoryRecord>, MemoryError> {
        let mut records = Vec::new();
        for category in query.categories() {
            let matched = self.backend.list(
                category,
                &|record| query.matches(record),
                self.malformed_policy,
            )?;
            records.extend(matched);
        }
        records.sort_by(newest_first);
        records.truncate(query.limit);
        debug!(
            "retrieved memory records (category={:?}, type={:?}, tags={}, agent={:?}, returned={})",
            query.category,
            query.record_type,
            query.tags.len(),
            query.agent,
            records.len()
        );
        Ok(records)
    }

    /// Load a single record by id.
    ///
    /// A malformed file reads as absent under the skip policy.
    pub fn get(&self, id: &str) -> Result<Option<MemoryRecord>, MemoryError> {
        match self.backend.get(id) {
            Err(MemoryError::Malformed { location, reason })
                if self.malformed_policy == MalformedRecordPolicy::Skip =>
            {
                warn!("treating malformed record as missing (id={id}, location={location}): {reason}");
                Ok(None)
            }
            other => other,
        }
    }

    /// Shallow-merge `update` into a record. Returns false when the id is unknown.
    pub fn update(
        &self,
        id: &str,
        update: RecordUpdate,
        agent: Option<&str>,
    ) -> Result<bool, MemoryError> {
        let Some(mut record) = self.get(id)? else {
            debug!("update skipped, record not found (id={id})");
            return Ok(false);
        };
        if let Some(patch) = update.content {
            patch.apply(&mut record.content)?;
        }
        if let Some(patch) = update.metadata {
            record.metadata.overlay(patch.fields);
        }
        let agent = agent.unwrap_or(&self.default_agent);
        record.content.last_updated = Some(self.clock.now());
        record.metadata.last_updated_by = Some(agent.to_string());
        self.backend.put(&record)?;
        info!("updated memory record (id={id}, agent={agent})");
        Ok(true)
    }

    /// Count one read-for-use of a record. Returns false when the id is unknown.
    pub fn increment_access(&self, id: &str) -> Result<bool, MemoryError> {
        let Some(mut record) = self.get(id)? else {
            debug!("access increment skipped, record not found (id={id})");
            return Ok(false);
        };
        record.content.access_count = record.content.access_count.saturating_add(1);
        record.content.last_accessed = Some(self.clock.now());
        self.backend.put(&record)?;
        debug!(
            "incremented access (id={id}, access_count={})",
            record.content.access_count
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, MemoryStore};
    use crate::backend::MalformedRecordPolicy;
    use crate::error::MemoryError;
    use crate::model::{Category, ContentPatch, Extensions, Priority, RecordDraft, RecordUpdate};
    use crate::query::RecordQuery;
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Clock that advances one second per reading.
    struct SteppingClock(Mutex<DateTime<Utc>>);

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut current = self.0.lock().expect("clock");
            *current += Duration::seconds(1);
            *current
        }
    }

    fn store(root: &std::path::Path) -> MemoryStore {
        MemoryStore::open(root).with_clock(Arc::new(SteppingClock(Mutex::new(Utc::now()))))
    }

    fn draft(title: &str) -> RecordDraft {
        RecordDraft::new(title, "description")
            .context("context")
            .tags(["invoice", "validation"])
            .priority(Priority::High)
            .extra("code_example", "fn main() {}")
    }

    #[test]
    fn create_then_retrieve_returns_input_content() {
        let temp = tempdir().expect("tempdir");
        let store = store(temp.path());
        let mut metadata = Extensions::new();
        metadata.insert("lct_criteria".to_string(), "4".into());
        let id = store
            .create(Category::Development, "pattern", draft("Invoice"), metadata, Some("sentinel"))
            .expect("create");
        assert!(id.starts_with("development_pattern_"));

        let records = store
            .retrieve(&RecordQuery::new().category(Category::Development).record_type("pattern"))
            .expect("retrieve");
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.memory_id, id);
        assert_eq!(record.content.title, "Invoice");
        assert_eq!(record.content.context, "context");
        assert_eq!(record.content.tags, vec!["invoice", "validation"]);
        assert_eq!(record.content.priority, Some(Priority::High));
        assert_eq!(record.content.access_count, 0);
        assert_eq!(record.content.created_at, record.content.last_updated);
        assert_eq!(record.metadata.agent.as_deref(), Some("sentinel"));
        assert_eq!(record.metadata.created_by.as_deref(), Some("sentinel"));
        assert!(record.metadata.extra.contains_key("lct_criteria"));
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let temp = tempdir().expect("tempdir");
        let store = store(temp.path());
        let id = store
            .create(Category::Shared, "insight", draft("Shared"), Extensions::new(), None)
            .expect("create");
        let before = store.get(&id).expect("get").expect("record");

        let updated = store
            .update(
                &id,
                RecordUpdate::content(ContentPatch::default().priority(Priority::Low)),
                Some("documentation_writer"),
            )
            .expect("update");
        assert!(updated);

        let after = store.get(&id).expect("get").expect("record");
        assert_eq!(after.content.priority, Some(Priority::Low));
        assert_eq!(after.content.title, before.content.title);
        assert_eq!(after.content.description, before.content.description);
        assert_eq!(after.content.tags, before.content.tags);
        assert_eq!(after.content.extra, before.content.extra);
        assert_eq!(after.content.created_at, before.content.created_at);
        assert!(after.content.last_updated > before.content.last_updated);
        assert_eq!(after.metadata.created_by.as_deref(), Some("system"));
        assert_eq!(
            after.metadata.last_updated_by.as_deref(),
            Some("documentation_writer")
        );
    }

    #[test]
    fn unknown_ids_report_false() {
        let temp = tempdir().expect("tempdir");
        let store = store(temp.path());
        assert!(!store.update("shared_missing", RecordUpdate::default(), None).expect("update"));
        assert!(!store.increment_access("shared_missing").expect("increment"));
    }

    #[test]
    fn access_count_is_monotonic() {
        let temp = tempdir().expect("tempdir");
        let store = store(temp.path());
        let id = store
            .create(Category::Sessions, "preference", draft("Pref"), Extensions::new(), None)
            .expect("create");

        let mut last_seen = None;
        for expected in 1..=3 {
            assert!(store.increment_access(&id).expect("increment"));
            let record = store.get(&id).expect("get").expect("record");
            assert_eq!(record.content.access_count, expected);
            assert!(record.content.last_accessed > last_seen);
            last_seen = record.content.last_accessed;
        }
    }

    #[test]
    fn retrieve_orders_newest_first_and_limits() {
        let temp = tempdir().expect("tempdir");
        let store = store(temp.path());
        let first = store
            .create(Category::Project, "decision", draft("t1"), Extensions::new(), None)
            .expect("t1");
        let second = store
            .create(Category::Project, "decision", draft("t2"), Extensions::new(), None)
            .expect("t2");
        let third = store
            .create(Category::Project, "decision", draft("t3"), Extensions::new(), None)
            .expect("t3");

        let records = store
            .retrieve(&RecordQuery::new().record_type("decision").limit(2))
            .expect("retrieve");
        let ids: Vec<&str> = records.iter().map(|r| r.memory_id.as_str()).collect();
        assert_eq!(ids, vec![third.as_str(), second.as_str()]);
        assert!(!ids.contains(&first.as_str()));
    }

    #[test]
    fn allowed_types_reject_unknown_type() {
        let temp = tempdir().expect("tempdir");
        let store = store(temp.path()).with_allowed_types(["decision"]);
        let err = store
            .create(Category::Shared, "rumour", draft("x"), Extensions::new(), None)
            .unwrap_err();
        assert!(format!("{err}").contains("rumour"));
    }

    #[test]
    fn default_agent_stamps_unattributed_writes() {
        let temp = tempdir().expect("tempdir");
        let store = store(temp.path()).with_default_agent("maintenance");
        let id = store
            .create(Category::Shared, "insight", draft("x"), Extensions::new(), None)
            .expect("create");
        let record = store.get(&id).expect("get").expect("record");
        assert_eq!(record.metadata.agent.as_deref(), Some("maintenance"));
        assert_eq!(record.metadata.created_by.as_deref(), Some("maintenance"));
    }

    #[test]
    fn create_rejects_system_fields_as_extensions() {
        let temp = tempdir().expect("tempdir");
        let store = store(temp.path());
        let err = store
            .create(
                Category::Shared,
                "insight",
                draft("x").extra("created_at", "2000-01-01T00:00:00Z"),
                Extensions::new(),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, MemoryError::ReservedField(field) if field == "created_at"));
        assert!(store.retrieve(&RecordQuery::new()).expect("retrieve").is_empty());

        let id = store
            .create(
                Category::Shared,
                "insight",
                draft("x").extra("title", "From extension"),
                Extensions::new(),
                None,
            )
            .expect("create");
        let record = store.get(&id).expect("get").expect("record");
        assert_eq!(record.content.title, "From extension");
        assert!(record.content.extra.get("title").is_none());
    }

    #[test]
    fn update_cannot_overwrite_access_count() {
        let temp = tempdir().expect("tempdir");
        let store = store(temp.path());
        let id = store
            .create(Category::Shared, "insight", draft("Shared"), Extensions::new(), None)
            .expect("create");

        let err = store
            .update(
                &id,
                RecordUpdate::content(ContentPatch::default().extra("access_count", 99i64)),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, MemoryError::ReservedField(field) if field == "access_count"));

        let record = store.get(&id).expect("get").expect("record");
        assert_eq!(record.content.access_count, 0);
        assert_eq!(store.retrieve(&RecordQuery::new()).expect("retrieve").len(), 1);

        assert!(
            store
                .update(
                    &id,
                    RecordUpdate::content(ContentPatch::default().extra("context", "Routed")),
                    None,
                )
                .expect("update")
        );
        let record = store.get(&id).expect("get").expect("record");
        assert_eq!(record.content.context, "Routed");
        assert!(record.content.extra.get("context").is_none());
    }

    #[test]
    fn malformed_lookup_follows_policy() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path().join("shared");
        std::fs::create_dir_all(&dir).expect("dir");
        std::fs::write(dir.join("shared_broken_1.json"), "[]").expect("write");

        let lenient = store(temp.path());
        assert!(lenient.get("shared_broken_1").expect("get").is_none());
        assert!(!lenient.update("shared_broken_1", RecordUpdate::default(), None).expect("update"));
        assert!(!lenient.increment_access("shared_broken_1").expect("increment"));

        let strict = lenient.with_malformed_policy(MalformedRecordPolicy::Abort);
        assert!(matches!(
            strict.increment_access("shared_broken_1").unwrap_err(),
            MemoryError::Malformed { .. }
        ));
    }
}
