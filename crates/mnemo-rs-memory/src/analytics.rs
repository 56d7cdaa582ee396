//! Read-only usage statistics over the record set.

use crate::backend::ScannedRecord;
use crate::error::MemoryError;
use crate::model::Category;
use crate::store::MemoryStore;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Bucket for records missing the tallied field.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// Record counts broken down by category, type, priority and agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub total_memories: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_agent: BTreeMap<String, usize>,
}

/// Tally every decodable record. Malformed files are logged and skipped.
pub fn collect_stats(store: &MemoryStore) -> Result<MemoryStats, MemoryError> {
    let mut stats = MemoryStats::default();
    for category in Category::ALL {
        for entry in store.backend().scan(category)? {
            let record = match entry {
                ScannedRecord::Valid(record) => record,
                ScannedRecord::Malformed { location, reason } => {
                    warn!("analytics skipped malformed record (location={location}): {reason}");
                    continue;
                }
            };
            stats.total_memories += 1;
            bump(&mut stats.by_category, category.as_str());
            bump(&mut stats.by_type, non_empty(&record.record_type));
            bump(
                &mut stats.by_priority,
                record.content.priority.map_or(UNKNOWN_BUCKET, |p| p.as_str()),
            );
            bump(
                &mut stats.by_agent,
                record.metadata.agent.as_deref().map_or(UNKNOWN_BUCKET, non_empty),
            );
        }
    }
    debug!("collected memory stats (total={})", stats.total_memories);
    Ok(stats)
}

fn bump(counts: &mut BTreeMap<String, usize>, key: &str) {
    *counts.entry(key.to_string()).or_default() += 1;
}

fn non_empty(value: &str) -> &str {
    if value.is_empty() { UNKNOWN_BUCKET } else { value }
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory System Analytics")?;
        writeln!(f, "{}", "=".repeat(40))?;
        writeln!(f, "Total Memories: {}", self.total_memories)?;
        for (label, counts) in [
            ("By Category", &self.by_category),
            ("By Type", &self.by_type),
            ("By Priority", &self.by_priority),
            ("By Agent", &self.by_agent),
        ] {
            writeln!(f)?;
            writeln!(f, "{label}:")?;
            for (key, count) in counts {
                writeln!(f, "  {key}: {count}")?;
            }
        }
        Ok(())
    }
}
