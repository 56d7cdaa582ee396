//! Provider interface for searchable vector-memory services.

use crate::error::MirrorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form metadata attached to a mirrored entry.
pub type MirrorMetadata = serde_json::Map<String, Value>;

/// One entry as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    pub id: String,
    /// Text the service stored or extracted for the entry.
    #[serde(default)]
    pub memory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub metadata: MirrorMetadata,
    /// Similarity score, present on search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Add/search/update/delete surface keyed by text, metadata and a user id.
#[async_trait]
pub trait VectorMemory: Send + Sync {
    /// Store `text` for `user_id`; returns the entries the service created.
    async fn add(
        &self,
        text: &str,
        user_id: &str,
        metadata: MirrorMetadata,
    ) -> Result<Vec<VectorEntry>, MirrorError>;

    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<VectorEntry>, MirrorError>;

    async fn get_all(&self, user_id: &str) -> Result<Vec<VectorEntry>, MirrorError>;

    async fn update(&self, id: &str, text: &str) -> Result<(), MirrorError>;

    async fn delete(&self, id: &str) -> Result<(), MirrorError>;

    /// Answer `message` using the user's stored memories.
    async fn chat(&self, _message: &str, _user_id: &str) -> Result<String, MirrorError> {
        Err(MirrorError::Unsupported("chat"))
    }
}
