//! Sessions that record their start and end in the shared store.

use crate::integration::AgentMemory;
use log::info;
use mnemo_rs_memory::{MemoryError, MemoryRecord, Priority};

/// Records returned to the caller when a session starts.
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub session_id: String,
    pub agent_name: String,
    pub relevant_memories: Vec<MemoryRecord>,
    /// Id of the session-start decision record.
    pub session_memory_id: String,
}

/// A working session for one agent.
#[derive(Clone)]
pub struct MemoryAwareSession {
    memory: AgentMemory,
    session_id: String,
}

impl MemoryAwareSession {
    /// Number of relevant records collected at session start.
    pub const CONTEXT_LIMIT: usize = 5;

    /// New session with id `session_{YYYYMMDD_HHMMSS}` taken from the store clock.
    pub fn new(memory: AgentMemory) -> Self {
        let session_id = format!("session_{}", memory.store().now().format("%Y%m%d_%H%M%S"));
        Self { memory, session_id }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn memory(&self) -> &AgentMemory {
        &self.memory
    }

    /// Collect relevant records and store a low-impact session-start decision.
    pub fn start(&self, user_context: &str) -> Result<SessionStart, MemoryError> {
        info!(
            "starting memory-aware session (agent={}, session={})",
            self.memory.agent(),
            self.session_id
        );
        let relevant_memories = self.memory.relevant_memories(
            &format!("LCT project healthcare claims adjudication {user_context}"),
            Self::CONTEXT_LIMIT,
        )?;
        let session_memory_id = self.memory.store_decision(
            &format!("Started new session: {user_context}"),
            &format!("User context: {user_context}"),
            Priority::Low,
            None,
        )?;
        Ok(SessionStart {
            session_id: self.session_id.clone(),
            agent_name: self.memory.agent().to_string(),
            relevant_memories,
            session_memory_id,
        })
    }

    /// Store an implementation decision made during the session.
    pub fn store_implementation_decision(
        &self,
        decision: &str,
        context: &str,
        criteria: Option<&str>,
        priority: Priority,
    ) -> Result<String, MemoryError> {
        self.memory.store_decision(decision, context, priority, criteria)
    }

    /// Store the session summary as a low-impact decision.
    pub fn end(&self, summary: &str) -> Result<String, MemoryError> {
        info!(
            "ending memory-aware session (agent={}, session={})",
            self.memory.agent(),
            self.session_id
        );
        self.memory.store_decision(
            &format!("Session ended: {summary}"),
            &format!("Session ID: {}", self.session_id),
            Priority::Low,
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryAwareSession;
    use crate::integration::AgentMemory;
    use chrono::{TimeZone, Utc};
    use mnemo_rs_memory::{ExtensionValue, MemoryStore, Priority};
    use mnemo_rs_test_utils::FixedClock;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn session_brackets_work_with_decisions() {
        let temp = tempdir().expect("tempdir");
        let now = Utc
            .with_ymd_and_hms(2026, 2, 3, 4, 5, 6)
            .single()
            .expect("time");
        let store = MemoryStore::open(temp.path()).with_clock(Arc::new(FixedClock::new(now)));
        let memory = AgentMemory::new(store.clone(), "primary_developer");
        memory
            .store_pattern("Earlier", "from a previous session", None)
            .expect("pattern");

        let session = MemoryAwareSession::new(memory);
        assert_eq!(session.session_id(), "session_20260203_040506");

        let started = session.start("Testing invoice validation").expect("start");
        assert_eq!(started.agent_name, "primary_developer");
        assert!(started.relevant_memories.is_empty());
        let start_record = store
            .get(&started.session_memory_id)
            .expect("get")
            .expect("record");
        assert_eq!(
            start_record.content.title,
            "Decision: Started new session: Testing invoice validation"
        );
        assert_eq!(
            start_record.metadata.extra.get("impact"),
            Some(&ExtensionValue::Text("low".to_string()))
        );

        session
            .store_implementation_decision(
                "Implemented invoice amount precedence validation",
                "Server-side validation for LCT amounts",
                Some("Criteria #4"),
                Priority::High,
            )
            .expect("decision");

        let ended = session.end("Successfully tested").expect("end");
        let end_record = store.get(&ended).expect("get").expect("record");
        assert_eq!(end_record.content.context, "Session ID: session_20260203_040506");
    }
}
