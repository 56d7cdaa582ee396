//! On-disk layout bootstrap and verification.
//!
//! ```text
//! memory/
//!   schema.json
//!   project/ development/ sessions/ shared/   one <id>.json per record
//!   agents/<agent_name>/config.json
//! ```

use crate::error::MemoryError;
use crate::model::{
    Category, Extensions, MemoryRecord, Priority, RESERVED_AGENTS_DIR, RecordDraft, RecordMetadata,
};
use crate::schema::SchemaDocument;
use crate::store::{DEFAULT_AGENT, MemoryStore};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Schema file name under the memory root.
pub const SCHEMA_FILE: &str = "schema.json";
/// Agent config file name under `agents/<name>/`.
pub const AGENT_CONFIG_FILE: &str = "config.json";

/// Ids of the records written by `seed_initial_records`.
pub const INITIAL_RECORD_IDS: [&str; 4] = [
    "project_lct_context_001",
    "project_success_criteria_001",
    "development_invoice_precedence_001",
    "development_teaching_approach_001",
];

/// Result of checking a memory root against the expected layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutReport {
    /// Expected directories that do not exist.
    pub missing_dirs: Vec<String>,
    pub schema_present: bool,
}

impl LayoutReport {
    pub fn is_complete(&self) -> bool {
        self.missing_dirs.is_empty() && self.schema_present
    }
}

/// Paths and bootstrap helpers for a memory root.
#[derive(Debug, Clone)]
pub struct MemoryLayout {
    root: PathBuf,
}

impl MemoryLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schema_path(&self) -> PathBuf {
        self.root.join(SCHEMA_FILE)
    }

    pub fn agents_dir(&self) -> PathBuf {
        self.root.join(RESERVED_AGENTS_DIR)
    }

    pub fn agent_config_path(&self, agent: &str) -> PathBuf {
        self.agents_dir().join(agent).join(AGENT_CONFIG_FILE)
    }

    /// Directories every initialized root must contain.
    fn required_dirs(&self) -> Vec<PathBuf> {
        Category::ALL
            .iter()
            .map(|category| self.root.join(category.as_str()))
            .chain(std::iter::once(self.agents_dir()))
            .collect()
    }

    /// Create category and agent directories. Existing directories are kept.
    pub fn initialize(&self, agent_names: &[&str]) -> Result<Vec<PathBuf>, MemoryError> {
        let mut created = self.required_dirs();
        created.extend(agent_names.iter().map(|agent| self.agents_dir().join(agent)));
        for dir in &created {
            fs::create_dir_all(dir)?;
            debug!("ensured memory directory (path={})", dir.display());
        }
        info!(
            "memory layout initialized (root={}, agents={})",
            self.root.display(),
            agent_names.len()
        );
        Ok(created)
    }

    /// Write the schema catalog, replacing any existing one.
    pub fn write_schema(&self, schema: &SchemaDocument) -> Result<PathBuf, MemoryError> {
        fs::create_dir_all(&self.root)?;
        let path = self.schema_path();
        fs::write(&path, serde_json::to_string_pretty(schema)?)?;
        Ok(path)
    }

    /// Read the schema catalog if one was written.
    pub fn load_schema(&self) -> Result<Option<SchemaDocument>, MemoryError> {
        match fs::read_to_string(self.schema_path()) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(MemoryError::Io(err)),
        }
    }

    /// Write the initial project records that are not already present.
    pub fn seed_initial_records(&self, store: &MemoryStore) -> Result<Vec<String>, MemoryError> {
        let now = store.now();
        let mut written = Vec::new();
        for (id, category, record_type, draft, criteria, impact, complexity) in initial_records() {
            if store.backend().get(id)?.is_some() {
                debug!("initial record already present (id={id})");
                continue;
            }
            let mut metadata = Extensions::new();
            metadata.insert("lct_criteria".to_string(), criteria.into());
            metadata.insert("business_impact".to_string(), impact.into());
            metadata.insert("technical_complexity".to_string(), complexity.into());
            metadata.insert("user_skill_level".to_string(), "beginner".into());
            let record = MemoryRecord {
                memory_id: id.to_string(),
                category,
                record_type: record_type.to_string(),
                content: draft.into_content(now)?,
                metadata: RecordMetadata::stamped(DEFAULT_AGENT, metadata),
            };
            store.backend().put(&record)?;
            written.push(id.to_string());
        }
        info!("seeded initial records (written={})", written.len());
        Ok(written)
    }

    /// Check which expected directories exist and whether the schema is present.
    pub fn verify(&self) -> LayoutReport {
        let missing_dirs = self
            .required_dirs()
            .into_iter()
            .filter(|dir| !dir.is_dir())
            .map(|dir| dir.display().to_string())
            .collect();
        LayoutReport {
            missing_dirs,
            schema_present: self.schema_path().is_file(),
        }
    }
}

type InitialRecord = (
    &'static str,
    Category,
    &'static str,
    RecordDraft,
    &'static str,
    &'static str,
    &'static str,
);

fn initial_records() -> Vec<InitialRecord> {
    vec![
        (
            INITIAL_RECORD_IDS[0],
            Category::Project,
            "decision",
            RecordDraft::new(
                "LCT-Vitraya Partnership Context",
                "Healthcare claims adjudication system for Kenya. Goal: 90%+ accuracy by October 7, 2025. Market: 1B KES immediate, 4.5B KES potential.",
            )
            .context("Critical business context for all agents")
            .tags(["business", "partnership", "goals"])
            .priority(Priority::High),
            "all",
            "high",
            "high",
        ),
        (
            INITIAL_RECORD_IDS[1],
            Category::Project,
            "decision",
            RecordDraft::new(
                "31 Success Criteria Framework",
                "31 evaluation criteria across 5 categories: 4 CRITICAL, 17 HIGH, 10 MEDIUM/LOW. Priority order: CRITICAL -> High -> Medium -> Low.",
            )
            .context("Core success framework for all agents")
            .tags(["criteria", "priority", "framework"])
            .priority(Priority::High),
            "all",
            "high",
            "medium",
        ),
        (
            INITIAL_RECORD_IDS[2],
            Category::Development,
            "pattern",
            RecordDraft::new(
                "Invoice Amount Precedence Pattern",
                "Invoice amount precedence: LCT -> ETIMS -> Document. LCT amount always takes precedence (Criteria #4 - CRITICAL).",
            )
            .context("Financial validation logic")
            .tags(["invoice", "validation", "precedence"])
            .priority(Priority::High),
            "4",
            "high",
            "medium",
        ),
        (
            INITIAL_RECORD_IDS[3],
            Category::Development,
            "pattern",
            RecordDraft::new(
                "Beginner-Friendly Teaching Pattern",
                "Small incremental steps, extensive comments, one feature at a time, test after each step. Explain in 3 levels: what it does, how it works, why it matters.",
            )
            .context("Teaching approach for beginner users")
            .tags(["teaching", "beginner", "methodology"])
            .priority(Priority::High),
            "all",
            "medium",
            "low",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{INITIAL_RECORD_IDS, MemoryLayout};
    use crate::model::Category;
    use crate::schema::SchemaDocument;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn initialize_creates_layout_and_verify_passes() {
        let temp = tempdir().expect("tempdir");
        let layout = MemoryLayout::new(temp.path().join("memory"));
        assert!(!layout.verify().is_complete());

        layout.initialize(&["sentinel"]).expect("initialize");
        assert!(layout.agents_dir().join("sentinel").is_dir());
        assert!(!layout.verify().schema_present);

        let schema = SchemaDocument::builtin(Utc::now());
        layout.write_schema(&schema).expect("schema");
        let report = layout.verify();
        assert!(report.is_complete(), "{report:?}");
        assert_eq!(layout.load_schema().expect("load"), Some(schema));
    }

    #[test]
    fn seeding_places_records_in_declared_categories_once() {
        let temp = tempdir().expect("tempdir");
        let layout = MemoryLayout::new(temp.path());
        let store = MemoryStore::open(temp.path());

        let written = layout.seed_initial_records(&store).expect("seed");
        assert_eq!(written.len(), 4);
        assert!(
            temp.path()
                .join(Category::Development.as_str())
                .join("development_invoice_precedence_001.json")
                .is_file()
        );
        store.increment_access(INITIAL_RECORD_IDS[0]).expect("access");

        let again = layout.seed_initial_records(&store).expect("seed again");
        assert!(again.is_empty());
        let kept = store.get(INITIAL_RECORD_IDS[0]).expect("get").expect("record");
        assert_eq!(kept.content.access_count, 1);
    }
}
