//! Retention policies applied by maintenance sweeps.

use crate::model::{Category, Priority};
use chrono::Duration;

/// Policy for expiring and pruning records.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionPolicy {
    /// Session records older than this are expired.
    pub session_ttl: Duration,
    /// Records accessed fewer times than this are low-value candidates.
    pub low_value_max_access: u64,
    /// Priority a record must have to be pruned as low-value.
    pub low_value_priority: Priority,
    /// Categories the low-value sweep scans.
    pub low_value_categories: Vec<Category>,
}

impl Default for RetentionPolicy {
    /// Default retention settings.
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24),
            low_value_max_access: 2,
            low_value_priority: Priority::Low,
            low_value_categories: vec![Category::Development, Category::Sessions],
        }
    }
}
