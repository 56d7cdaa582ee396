//! Informational schema catalog written to `schema.json`.
//!
//! The catalog documents categories, record types and metadata fields. It is
//! only enforced when a store is built with `with_allowed_types`.

use crate::model::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema document version.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Record types documented by the catalog.
pub const KNOWN_TYPES: [(&str, &str); 6] = [
    ("decision", "A decision made by an agent"),
    ("learning", "Knowledge gained from experience"),
    ("pattern", "A recurring pattern or best practice"),
    ("preference", "User or system preference"),
    ("issue", "A problem or blocker"),
    ("insight", "A valuable insight or observation"),
];

const METADATA_FIELDS: [(&str, &str); 4] = [
    ("lct_criteria", "Related LCT success criteria number"),
    ("business_impact", "Impact on business goals (high/medium/low)"),
    ("technical_complexity", "Technical complexity (high/medium/low)"),
    (
        "user_skill_level",
        "Target user skill level (beginner/intermediate/advanced)",
    ),
];

/// Catalog entry describing one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySchema {
    pub description: String,
    pub persistence: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Contents of `schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub version: String,
    pub created_at: String,
    pub description: String,
    pub categories: BTreeMap<String, CategorySchema>,
    pub memory_types: BTreeMap<String, String>,
    #[serde(default)]
    pub metadata_fields: BTreeMap<String, String>,
}

impl SchemaDocument {
    /// Built-in catalog stamped with `now`.
    pub fn builtin(now: DateTime<Utc>) -> Self {
        let categories = Category::ALL
            .into_iter()
            .map(|category| {
                let examples = match category {
                    Category::Project => ["business_context", "technical_decisions", "success_criteria"],
                    Category::Development => ["code_patterns", "feature_history", "bug_resolutions"],
                    Category::Sessions => ["current_work", "active_issues", "user_preferences"],
                    Category::Shared => {
                        ["agent_interactions", "cross_agent_learnings", "system_insights"]
                    }
                };
                (
                    category.as_str().to_string(),
                    CategorySchema {
                        description: category.description().to_string(),
                        persistence: category.persistence().as_str().to_string(),
                        examples: examples.iter().map(|e| e.to_string()).collect(),
                    },
                )
            })
            .collect();
        Self {
            version: SCHEMA_VERSION.to_string(),
            created_at: crate::timestamp::format_timestamp(&now),
            description: "Memory System Schema".to_string(),
            categories,
            memory_types: to_map(&KNOWN_TYPES),
            metadata_fields: to_map(&METADATA_FIELDS),
        }
    }

    /// Record type names declared by the catalog.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.memory_types.keys().map(String::as_str)
    }
}

fn to_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
