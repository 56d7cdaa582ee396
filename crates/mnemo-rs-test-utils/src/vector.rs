use async_trait::async_trait;
use mnemo_rs_mirror::{MirrorError, MirrorMetadata, VectorEntry, VectorMemory};
use parking_lot::Mutex;

/// One `add` call seen by `StubVectorMemory`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedEntry {
    pub text: String,
    pub user_id: String,
    pub metadata: MirrorMetadata,
}

/// Records adds in memory and answers searches from them.
#[derive(Default)]
pub struct StubVectorMemory {
    added: Mutex<Vec<AddedEntry>>,
    fail_when: Option<String>,
    chat_reply: Option<String>,
}

impl StubVectorMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail adds whose text contains `needle`.
    pub fn failing_on(needle: impl Into<String>) -> Self {
        Self {
            fail_when: Some(needle.into()),
            ..Self::default()
        }
    }

    pub fn with_chat_reply(reply: impl Into<String>) -> Self {
        Self {
            chat_reply: Some(reply.into()),
            ..Self::default()
        }
    }

    pub fn added(&self) -> Vec<AddedEntry> {
        self.added.lock().clone()
    }

    fn entry(index: usize, added: &AddedEntry) -> VectorEntry {
        VectorEntry {
            id: format!("stub-{index}"),
            memory: added.text.clone(),
            user_id: Some(added.user_id.clone()),
            metadata: added.metadata.clone(),
            score: None,
        }
    }
}

#[async_trait]
impl VectorMemory for StubVectorMemory {
    async fn add(
        &self,
        text: &str,
        user_id: &str,
        metadata: MirrorMetadata,
    ) -> Result<Vec<VectorEntry>, MirrorError> {
        if let Some(needle) = &self.fail_when
            && text.contains(needle.as_str())
        {
            return Err(MirrorError::Status {
                status: 500,
                body: "stub failure".to_string(),
            });
        }
        let mut added = self.added.lock();
        added.push(AddedEntry {
            text: text.to_string(),
            user_id: user_id.to_string(),
            metadata,
        });
        let index = added.len() - 1;
        Ok(vec![Self::entry(index, &added[index])])
    }

    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<VectorEntry>, MirrorError> {
        let needle = query.to_lowercase();
        Ok(self
            .added
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, added)| added.user_id == user_id)
            .filter(|(_, added)| added.text.to_lowercase().contains(&needle))
            .take(limit)
            .map(|(index, added)| Self::entry(index, added))
            .collect())
    }

    async fn get_all(&self, user_id: &str) -> Result<Vec<VectorEntry>, MirrorError> {
        Ok(self
            .added
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, added)| added.user_id == user_id)
            .map(|(index, added)| Self::entry(index, added))
            .collect())
    }

    async fn update(&self, _id: &str, _text: &str) -> Result<(), MirrorError> {
        Ok(())
    }

    async fn delete(&self, _id: &str) -> Result<(), MirrorError> {
        Ok(())
    }

    async fn chat(&self, message: &str, _user_id: &str) -> Result<String, MirrorError> {
        match &self.chat_reply {
            Some(reply) => Ok(format!("{reply}: {message}")),
            None => Err(MirrorError::Unsupported("chat")),
        }
    }
}
