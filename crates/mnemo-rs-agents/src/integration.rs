//! Per-agent memory wrapper over the shared store.

use log::debug;
use mnemo_rs_memory::{
    Category, ExtensionValue, Extensions, MemoryError, MemoryRecord, MemoryStore, Priority,
    RecordDraft, RecordQuery,
};

/// Keywords that map a free-text query onto record tags.
const RELEVANCE_KEYWORDS: [&str; 4] = ["invoice", "validation", "security", "teaching"];

/// Tags whose keyword appears in `query`, case-insensitively.
pub fn extract_relevance_tags(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    RELEVANCE_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .map(|keyword| keyword.to_string())
        .collect()
}

/// Memory operations performed on behalf of one agent.
///
/// Every record is attributed to the agent and tagged with its lowercase name.
#[derive(Clone)]
pub struct AgentMemory {
    agent: String,
    store: MemoryStore,
}

impl AgentMemory {
    pub fn new(store: MemoryStore, agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            store,
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    fn agent_tag(&self) -> String {
        self.agent.to_lowercase()
    }

    fn metadata<const N: usize>(&self, fields: [(&str, ExtensionValue); N]) -> Extensions {
        let mut metadata = Extensions::new();
        metadata.insert("agent".to_string(), self.agent.as_str().into());
        for (key, value) in fields {
            metadata.insert(key.to_string(), value);
        }
        metadata
    }

    fn create(
        &self,
        category: Category,
        record_type: &str,
        draft: RecordDraft,
        metadata: Extensions,
    ) -> Result<String, MemoryError> {
        self.store
            .create(category, record_type, draft, metadata, Some(&self.agent))
    }

    /// Record a decision made by the agent.
    pub fn store_decision(
        &self,
        decision: &str,
        context: &str,
        impact: Priority,
        lct_criteria: Option<&str>,
    ) -> Result<String, MemoryError> {
        let draft = RecordDraft::new(
            format!("Decision: {decision}"),
            format!("Agent {} made decision: {decision}", self.agent),
        )
        .context(context)
        .tags(["decision".to_string(), self.agent_tag()])
        .priority(Priority::Medium);
        let metadata = self.metadata([
            ("impact", impact.as_str().into()),
            ("lct_criteria", lct_criteria.into()),
        ]);
        self.create(Category::Development, "decision", draft, metadata)
    }

    /// Record something the agent learned, with an observed success rate.
    pub fn store_learning(
        &self,
        learning: &str,
        pattern: &str,
        success_rate: f64,
        lct_criteria: Option<&str>,
    ) -> Result<String, MemoryError> {
        let draft = RecordDraft::new(
            format!("Learning: {learning}"),
            format!("Agent {} learned: {learning}", self.agent),
        )
        .context(format!("Pattern: {pattern}"))
        .tags(["learning".to_string(), self.agent_tag()])
        .priority(Priority::High);
        let metadata = self.metadata([
            ("pattern", pattern.into()),
            ("success_rate", success_rate.into()),
            ("lct_criteria", lct_criteria.into()),
        ]);
        self.create(Category::Development, "learning", draft, metadata)
    }

    /// Record a code pattern or best practice.
    pub fn store_pattern(
        &self,
        pattern_name: &str,
        description: &str,
        code_example: Option<&str>,
    ) -> Result<String, MemoryError> {
        self.store_pattern_with(pattern_name, description, code_example, Extensions::new())
    }

    /// `store_pattern` with additional metadata fields.
    pub(crate) fn store_pattern_with(
        &self,
        pattern_name: &str,
        description: &str,
        code_example: Option<&str>,
        extra_metadata: Extensions,
    ) -> Result<String, MemoryError> {
        let draft = RecordDraft::new(format!("Pattern: {pattern_name}"), description)
            .context("Code pattern or best practice")
            .tags(["pattern".to_string(), self.agent_tag()])
            .priority(Priority::High)
            .extra("code_example", code_example);
        let mut metadata = self.metadata([("pattern_name", pattern_name.into())]);
        metadata.extend(extra_metadata);
        self.create(Category::Development, "pattern", draft, metadata)
    }

    /// Record a user preference as a session-scoped record tagged with the user id.
    pub fn store_user_preference(
        &self,
        user_id: &str,
        preference: &str,
        value: &str,
        context: &str,
    ) -> Result<String, MemoryError> {
        let draft = RecordDraft::new(
            format!("User Preference: {preference}"),
            format!("User {user_id} prefers: {preference} = {value}"),
        )
        .context(context)
        .tags(["preference", "user", user_id])
        .priority(Priority::Medium);
        let metadata = self.metadata([
            ("user_id", user_id.into()),
            ("preference", preference.into()),
            ("value", value.into()),
        ]);
        self.create(Category::Sessions, "preference", draft, metadata)
    }

    /// This agent's records tagged with keywords found in `query`.
    ///
    /// When the query names no keyword the tag filter is dropped and the
    /// agent's newest records are returned.
    pub fn relevant_memories(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        let tags = extract_relevance_tags(query);
        debug!(
            "relevant memory lookup (agent={}, tags={:?}, limit={limit})",
            self.agent, tags
        );
        self.store.retrieve(
            &RecordQuery::new()
                .tags(tags)
                .agent(self.agent.as_str())
                .limit(limit),
        )
    }

    /// Preferences recorded for `user_id` by any agent.
    pub fn user_context(&self, user_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.store.retrieve(
            &RecordQuery::new()
                .category(Category::Sessions)
                .record_type("preference")
                .tags([user_id]),
        )
    }

    pub fn learning_memories(&self, limit: usize) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.own_development_records("learning", limit)
    }

    pub fn pattern_memories(&self, limit: usize) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.own_development_records("pattern", limit)
    }

    fn own_development_records(
        &self,
        record_type: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.store.retrieve(
            &RecordQuery::new()
                .category(Category::Development)
                .record_type(record_type)
                .agent(self.agent.as_str())
                .limit(limit),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentMemory, extract_relevance_tags};
    use mnemo_rs_memory::{Category, ExtensionValue, MemoryStore, Priority};
    use mnemo_rs_test_utils::FixedClock;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn memory(root: &std::path::Path, agent: &str) -> AgentMemory {
        let store = MemoryStore::open(root).with_clock(Arc::new(FixedClock::stepping()));
        AgentMemory::new(store, agent)
    }

    #[test]
    fn keyword_extraction_is_case_insensitive() {
        assert_eq!(
            extract_relevance_tags("Invoice VALIDATION flow"),
            vec!["invoice", "validation"]
        );
        assert!(extract_relevance_tags("deploy pipeline").is_empty());
    }

    #[test]
    fn decision_record_carries_agent_tags_and_metadata() {
        let temp = tempdir().expect("tempdir");
        let agent = memory(temp.path(), "Sentinel");
        let id = agent
            .store_decision("Block merge", "Secrets found", Priority::High, Some("7"))
            .expect("decision");
        let record = agent.store().get(&id).expect("get").expect("record");

        assert_eq!(record.category, Category::Development);
        assert_eq!(record.record_type, "decision");
        assert_eq!(record.content.title, "Decision: Block merge");
        assert_eq!(record.content.description, "Agent Sentinel made decision: Block merge");
        assert_eq!(record.content.tags, vec!["decision", "sentinel"]);
        assert_eq!(record.content.priority, Some(Priority::Medium));
        assert_eq!(record.metadata.agent.as_deref(), Some("Sentinel"));
        assert_eq!(
            record.metadata.extra.get("impact"),
            Some(&ExtensionValue::Text("high".to_string()))
        );
        assert_eq!(
            record.metadata.extra.get("lct_criteria"),
            Some(&ExtensionValue::Text("7".to_string()))
        );
    }

    #[test]
    fn relevant_memories_filters_by_agent_and_keyword() {
        let temp = tempdir().expect("tempdir");
        let developer = memory(temp.path(), "primary_developer");
        let sentinel = memory(temp.path(), "sentinel");

        developer
            .store_pattern("Invoice check", "validate invoice totals", None)
            .expect("pattern");
        sentinel
            .store_pattern("Secret scan", "look for keys", None)
            .expect("pattern");

        // Pattern tags are ["pattern", agent]; keyword tags only match explicit tags.
        assert!(
            developer
                .relevant_memories("invoice work", 5)
                .expect("relevant")
                .is_empty()
        );
        let any = developer.relevant_memories("general", 5).expect("relevant");
        assert_eq!(any.len(), 1);
        assert_eq!(any[0].metadata.agent.as_deref(), Some("primary_developer"));
    }

    #[test]
    fn user_context_finds_preferences_from_any_agent() {
        let temp = tempdir().expect("tempdir");
        let developer = memory(temp.path(), "primary_developer");
        let writer = memory(temp.path(), "documentation_writer");
        developer
            .store_user_preference("alice", "skill_level", "beginner", "first session")
            .expect("pref");
        writer
            .store_user_preference("alice", "doc_style", "examples", "")
            .expect("pref");
        writer
            .store_user_preference("bob", "doc_style", "terse", "")
            .expect("pref");

        let context = developer.user_context("alice").expect("context");
        assert_eq!(context.len(), 2);
        assert!(context.iter().all(|r| r.content.tags.contains(&"alice".to_string())));
    }

    #[test]
    fn learning_and_pattern_queries_stay_with_the_agent() {
        let temp = tempdir().expect("tempdir");
        let developer = memory(temp.path(), "primary_developer");
        let sentinel = memory(temp.path(), "sentinel");
        developer
            .store_learning("Small steps", "incremental", 0.9, None)
            .expect("learning");
        sentinel
            .store_learning("False alarm", "regex too wide", 0.0, None)
            .expect("learning");
        developer
            .store_pattern("Guard clause", "return early", Some("if x { return; }"))
            .expect("pattern");

        let learnings = developer.learning_memories(10).expect("learnings");
        assert_eq!(learnings.len(), 1);
        assert_eq!(
            learnings[0].metadata.extra.get("success_rate"),
            Some(&ExtensionValue::Float(0.9))
        );
        let patterns = developer.pattern_memories(10).expect("patterns");
        assert_eq!(patterns.len(), 1);
        assert_eq!(
            patterns[0].content.extra.get("code_example"),
            Some(&ExtensionValue::Text("if x { return; }".to_string()))
        );
    }
}
