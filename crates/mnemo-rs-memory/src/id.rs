//! Record identifier generation and validation.

use crate::error::MemoryError;
use crate::model::Category;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

/// Length of the random suffix appended to generated ids.
const SUFFIX_LEN: usize = 8;

fn safe_stem() -> &'static Regex {
    static SAFE_STEM: OnceLock<Regex> = OnceLock::new();
    SAFE_STEM.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("static regex"))
}

/// Build a collision-resistant id: `{category}_{type}_{YYYYMMDD_HHMMSS_micros}_{suffix}`.
pub fn generate_record_id(category: Category, record_type: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}_{}",
        category.as_str(),
        sanitize_type(record_type),
        now.format("%Y%m%d_%H%M%S_%6f"),
        &suffix[..SUFFIX_LEN]
    )
}

/// Reject ids that cannot be used as a file stem inside a category directory.
pub fn validate_record_id(id: &str) -> Result<(), MemoryError> {
    if safe_stem().is_match(id) && !id.contains("..") {
        Ok(())
    } else {
        Err(MemoryError::InvalidId(id.to_string()))
    }
}

/// Category named by the id prefix, if any.
pub fn category_hint(id: &str) -> Option<Category> {
    let (prefix, _) = id.split_once('_')?;
    prefix.parse().ok()
}

/// Replace characters that would make the id an unsafe file stem.
fn sanitize_type(record_type: &str) -> String {
    let cleaned: String = record_type
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' {
                ch
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "record".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::{category_hint, generate_record_id, validate_record_id};
    use crate::model::Category;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn generated_ids_share_second_but_differ() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 45).single().expect("time");
        let first = generate_record_id(Category::Development, "decision", now);
        let second = generate_record_id(Category::Development, "decision", now);
        assert!(first.starts_with("development_decision_20260301_123045_000000_"));
        assert_ne!(first, second);
        validate_record_id(&first).expect("valid id");
    }

    #[test]
    fn type_is_sanitized_into_stem() {
        let now = Utc::now();
        let id = generate_record_id(Category::Shared, "../escape me", now);
        validate_record_id(&id).expect("valid id");
        assert!(id.starts_with("shared_---escape-me_"));
    }

    #[test]
    fn rejects_path_like_ids() {
        assert!(validate_record_id("../project/secret").is_err());
        assert!(validate_record_id("a/b").is_err());
        assert!(validate_record_id("").is_err());
        assert!(validate_record_id("project_lct_context_001").is_ok());
    }

    #[test]
    fn hint_reads_category_prefix() {
        assert_eq!(
            category_hint("sessions_test_20260101"),
            Some(Category::Sessions)
        );
        assert_eq!(category_hint("agents_config"), None);
        assert_eq!(category_hint("nounderscore"), None);
    }
}
