//! Agent-facing helpers that format memories as text for a vector store.

use crate::error::MirrorError;
use crate::provider::{MirrorMetadata, VectorEntry, VectorMemory};
use log::warn;
use mnemo_rs_memory::Priority;
use serde_json::{Value, json};
use std::sync::Arc;

/// Reply used when the service cannot answer a chat message.
pub const CHAT_FALLBACK: &str = "Sorry, I couldn't process that request.";

/// Mirrors one agent's decisions, learnings and patterns.
#[derive(Clone)]
pub struct MirroredAgent {
    agent: String,
    user_id: String,
    memory: Arc<dyn VectorMemory>,
}

impl MirroredAgent {
    /// Entries are stored under the user id `{agent}_user`.
    pub fn new(memory: Arc<dyn VectorMemory>, agent: impl Into<String>) -> Self {
        let agent = agent.into();
        let user_id = format!("{agent}_user");
        Self {
            agent,
            user_id,
            memory,
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn metadata(&self, record_type: &str, fields: Vec<(&str, Value)>) -> MirrorMetadata {
        let mut metadata = MirrorMetadata::new();
        metadata.insert("agent".to_string(), json!(self.agent));
        metadata.insert("type".to_string(), json!(record_type));
        for (key, value) in fields {
            metadata.insert(key.to_string(), value);
        }
        metadata
    }

    pub async fn store_decision(
        &self,
        decision: &str,
        context: &str,
        impact: Priority,
        lct_criteria: Option<&str>,
    ) -> Result<Vec<VectorEntry>, MirrorError> {
        let text = format!(
            "Agent {} made decision: {decision}. Context: {context}",
            self.agent
        );
        let metadata = self.metadata(
            "decision",
            vec![
                ("impact", json!(impact.as_str())),
                ("lct_criteria", json!(lct_criteria)),
                ("context", json!(context)),
            ],
        );
        self.memory.add(&text, &self.user_id, metadata).await
    }

    pub async fn store_learning(
        &self,
        learning: &str,
        pattern: &str,
        success_rate: f64,
        lct_criteria: Option<&str>,
    ) -> Result<Vec<VectorEntry>, MirrorError> {
        let text = format!(
            "Agent {} learned: {learning}. Pattern: {pattern}. Success rate: {success_rate}",
            self.agent
        );
        let metadata = self.metadata(
            "learning",
            vec![
                ("pattern", json!(pattern)),
                ("success_rate", json!(success_rate)),
                ("lct_criteria", json!(lct_criteria)),
            ],
        );
        self.memory.add(&text, &self.user_id, metadata).await
    }

    pub async fn store_pattern(
        &self,
        pattern_name: &str,
        description: &str,
        code_example: Option<&str>,
    ) -> Result<Vec<VectorEntry>, MirrorError> {
        let mut text = format!("Pattern: {pattern_name}. Description: {description}");
        if let Some(code) = code_example {
            text.push_str(&format!(" Code example: {code}"));
        }
        let metadata = self.metadata(
            "pattern",
            vec![
                ("pattern_name", json!(pattern_name)),
                ("code_example", json!(code_example)),
            ],
        );
        self.memory.add(&text, &self.user_id, metadata).await
    }

    pub async fn relevant_memories(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<VectorEntry>, MirrorError> {
        self.memory.search(query, &self.user_id, limit).await
    }

    /// Chat against the agent's memories, falling back to `CHAT_FALLBACK`.
    pub async fn chat_with_memory(&self, message: &str) -> String {
        match self.memory.chat(message, &self.user_id).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!("vector memory chat failed (agent={}): {err}", self.agent);
                CHAT_FALLBACK.to_string()
            }
        }
    }
}
