//! Maintenance sweeps: session expiry and low-value pruning.
//!
//! Sweeps scan the backend directly and never stop on a single bad record:
//! undecodable files and failed deletions are logged and skipped.

use crate::backend::ScannedRecord;
use crate::error::MemoryError;
use crate::model::{Category, MemoryRecord};
use crate::policy::RetentionPolicy;
use crate::store::MemoryStore;
use crate::timestamp::legacy_epoch;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Deletion counts from one maintenance pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Expired session records.
    pub expired: usize,
    /// Low-value records removed, per scanned category.
    pub low_value: BTreeMap<Category, usize>,
}

impl SweepReport {
    /// Total records deleted by the pass.
    pub fn total(&self) -> usize {
        self.expired + self.low_value.values().sum::<usize>()
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cleaned up {} expired session memories", self.expired)?;
        for (category, count) in &self.low_value {
            writeln!(f, "Cleaned up {count} low-value {category} memories")?;
        }
        Ok(())
    }
}

/// Delete session records older than the policy TTL.
pub fn expire_sessions(store: &MemoryStore, policy: &RetentionPolicy) -> Result<usize, MemoryError> {
    let now = store.now();
    let expired = sweep_category(store, Category::Sessions, |record| {
        let created_at = record.content.created_at.unwrap_or_else(legacy_epoch);
        now.signed_duration_since(created_at) > policy.session_ttl
    })?;
    info!("expired session records (count={expired})");
    Ok(expired)
}

/// Delete rarely used, low-priority records in the policy categories.
pub fn sweep_low_value(
    store: &MemoryStore,
    policy: &RetentionPolicy,
) -> Result<BTreeMap<Category, usize>, MemoryError> {
    let mut removed = BTreeMap::new();
    for category in &policy.low_value_categories {
        let count = sweep_category(store, *category, |record| {
            record.content.access_count < policy.low_value_max_access
                && record.content.priority == Some(policy.low_value_priority)
        })?;
        info!("removed low-value records (category={category}, count={count})");
        removed.insert(*category, count);
    }
    Ok(removed)
}

/// Run the expiry sweep followed by the low-value sweep.
pub fn run_maintenance(
    store: &MemoryStore,
    policy: &RetentionPolicy,
) -> Result<SweepReport, MemoryError> {
    let expired = expire_sessions(store, policy)?;
    let low_value = sweep_low_value(store, policy)?;
    Ok(SweepReport { expired, low_value })
}

fn sweep_category(
    store: &MemoryStore,
    category: Category,
    should_delete: impl Fn(&MemoryRecord) -> bool,
) -> Result<usize, MemoryError> {
    let backend = store.backend();
    let mut deleted = 0;
    for entry in backend.scan(category)? {
        let record = match entry {
            ScannedRecord::Valid(record) => record,
            ScannedRecord::Malformed { location, reason } => {
                warn!("sweep skipped malformed record (location={location}): {reason}");
                continue;
            }
        };
        if !should_delete(&record) {
            continue;
        }
        match backend.delete(category, &record.memory_id) {
            Ok(true) => deleted += 1,
            Ok(false) => {}
            Err(err) => {
                warn!(
                    "sweep failed to delete record (id={}, category={category}): {err}",
                    record.memory_id
                );
            }
        }
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::{expire_sessions, run_maintenance, sweep_low_value};
    use crate::backend::RecordBackend;
    use crate::model::{Category, MemoryRecord, Priority, RecordContent, RecordMetadata};
    use crate::policy::RetentionPolicy;
    use crate::store::{Clock, MemoryStore};
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn record(
        id: &str,
        category: Category,
        created_at: Option<DateTime<Utc>>,
        access_count: u64,
        priority: Option<Priority>,
    ) -> MemoryRecord {
        MemoryRecord {
            memory_id: id.to_string(),
            category,
            record_type: "note".to_string(),
            content: RecordContent {
                created_at,
                access_count,
                priority,
                ..RecordContent::default()
            },
            metadata: RecordMetadata::default(),
        }
    }

    #[test]
    fn expiry_boundary_is_twenty_four_hours() {
        let temp = tempdir().expect("tempdir");
        let now = Utc::now();
        let store = MemoryStore::open(temp.path()).with_clock(Arc::new(FixedClock(now)));
        let backend = store.backend();
        let fresh = now - Duration::hours(23) - Duration::minutes(59);
        let stale = now - Duration::hours(24) - Duration::minutes(1);
        backend
            .put(&record("sessions_fresh", Category::Sessions, Some(fresh), 5, Some(Priority::High)))
            .expect("put");
        backend
            .put(&record("sessions_stale", Category::Sessions, Some(stale), 5, Some(Priority::High)))
            .expect("put");
        backend
            .put(&record("sessions_undated", Category::Sessions, None, 5, Some(Priority::High)))
            .expect("put");

        let expired = expire_sessions(&store, &RetentionPolicy::default()).expect("expire");
        assert_eq!(expired, 2);
        assert!(backend.get("sessions_fresh").expect("get").is_some());
        assert!(backend.get("sessions_stale").expect("get").is_none());
        assert!(backend.get("sessions_undated").expect("get").is_none());
    }

    #[test]
    fn low_value_boundary() {
        let temp = tempdir().expect("tempdir");
        let store = MemoryStore::open(temp.path());
        let backend = store.backend();
        let now = Some(Utc::now());
        backend
            .put(&record("development_once", Category::Development, now, 1, Some(Priority::Low)))
            .expect("put");
        backend
            .put(&record("development_twice", Category::Development, now, 2, Some(Priority::Low)))
            .expect("put");
        backend
            .put(&record("sessions_high", Category::Sessions, now, 0, Some(Priority::High)))
            .expect("put");
        backend
            .put(&record("sessions_unset", Category::Sessions, now, 0, None))
            .expect("put");
        backend
            .put(&record("project_low", Category::Project, now, 0, Some(Priority::Low)))
            .expect("put");

        let removed = sweep_low_value(&store, &RetentionPolicy::default()).expect("sweep");
        assert_eq!(removed[&Category::Development], 1);
        assert_eq!(removed[&Category::Sessions], 0);
        assert!(backend.get("development_once").expect("get").is_none());
        assert!(backend.get("development_twice").expect("get").is_some());
        assert!(backend.get("sessions_high").expect("get").is_some());
        assert!(backend.get("sessions_unset").expect("get").is_some());
        assert!(backend.get("project_low").expect("get").is_some());
    }

    #[test]
    fn sweeps_skip_malformed_files() {
        let temp = tempdir().expect("tempdir");
        let store = MemoryStore::open(temp.path());
        let stale = Some(Utc::now() - Duration::days(3));
        store
            .backend()
            .put(&record("sessions_old", Category::Sessions, stale, 0, Some(Priority::Low)))
            .expect("put");
        let dir = temp.path().join("sessions");
        fs::write(dir.join("corrupt.json"), "[]").expect("write");

        let report = run_maintenance(&store, &RetentionPolicy::default()).expect("maintenance");
        assert_eq!(report.expired, 1);
        assert_eq!(report.total(), 1);
        assert!(dir.join("corrupt.json").exists());
        assert!(format!("{report}").contains("1 expired session memories"));
    }
}
