//! Retrieval filters for memory records.

use crate::model::{Category, MemoryRecord};
use std::cmp::Ordering;

/// Default cap on retrieved records.
pub const DEFAULT_LIMIT: usize = 10;

/// Filter set for `MemoryStore::retrieve`. Every filter is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Restrict the scan to one category; otherwise every record category.
    pub category: Option<Category>,
    /// Exact record type match.
    pub record_type: Option<String>,
    /// Keep records carrying at least one of these tags. Empty means no tag filter.
    pub tags: Vec<String>,
    /// Exact match on `metadata.agent`.
    pub agent: Option<String>,
    /// Maximum number of records returned after sorting.
    pub limit: usize,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            category: None,
            record_type: None,
            tags: Vec::new(),
            agent: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
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

    pub fn agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Categories the query has to scan.
    pub fn categories(&self) -> Vec<Category> {
        match self.category {
            Some(category) => vec![category],
            None => Category::ALL.to_vec(),
        }
    }

    /// True when the record passes every filter.
    pub fn matches(&self, record: &MemoryRecord) -> bool {
        if self.category.is_some_and(|category| record.category != category) {
            return false;
        }
        if self
            .record_type
            .as_ref()
            .is_some_and(|record_type| &record.record_type != record_type)
        {
            return false;
        }
        if self
            .agent
            .as_ref()
            .is_some_and(|agent| record.metadata.agent.as_ref() != Some(agent))
        {
            return false;
        }
        self.tags.is_empty() || record.has_any_tag(&self.tags)
    }
}

/// Newest first; records without `created_at` sort last, ties break on id.
pub fn newest_first(left: &MemoryRecord, right: &MemoryRecord) -> Ordering {
    match (left.content.created_at, right.content.created_at) {
        (Some(left_ts), Some(right_ts)) => right_ts.cmp(&left_ts),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| right.memory_id.cmp(&left.memory_id))
}

#[cfg(test)]
mod tests {
    use super::{RecordQuery, newest_first};
    use crate::model::{Category, MemoryRecord, RecordContent, RecordMetadata};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn tagged(id: &str, tags: &[&str], agent: Option<&str>) -> MemoryRecord {
        MemoryRecord {
            memory_id: id.to_string(),
            category: Category::Development,
            record_type: "pattern".to_string(),
            content: RecordContent {
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
                ..RecordContent::default()
            },
            metadata: RecordMetadata {
                agent: agent.map(str::to_string),
                ..RecordMetadata::default()
            },
        }
    }

    #[test]
    fn tag_filter_uses_or_semantics() {
        let query = RecordQuery::new().tags(["invoice", "security"]);
        assert!(query.matches(&tagged("a", &["invoice"], None)));
        assert!(query.matches(&tagged("b", &["security", "other"], None)));
        assert!(!query.matches(&tagged("c", &["teaching"], None)));
        assert!(!query.matches(&tagged("d", &[], None)));
    }

    #[test]
    fn filters_combine_with_and() {
        let query = RecordQuery::new()
            .category(Category::Development)
            .record_type("pattern")
            .agent("sentinel");
        assert!(query.matches(&tagged("a", &[], Some("sentinel"))));
        assert!(!query.matches(&tagged("b", &[], Some("primary_developer"))));
        assert!(!query.matches(&tagged("c", &[], None)));
        assert!(!RecordQuery::new().record_type("decision").matches(&tagged("d", &[], None)));
        assert!(!RecordQuery::new().category(Category::Shared).matches(&tagged("e", &[], None)));
    }

    #[test]
    fn undated_records_sort_after_dated_ones() {
        let now = Utc::now();
        let mut older = tagged("older", &[], None);
        older.content.created_at = Some(now - Duration::hours(1));
        let mut newer = tagged("newer", &[], None);
        newer.content.created_at = Some(now);
        let undated = tagged("undated", &[], None);

        let mut records = vec![undated, older, newer];
        records.sort_by(newest_first);
        let ids: Vec<&str> = records.iter().map(|r| r.memory_id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older", "undated"]);
    }
}
