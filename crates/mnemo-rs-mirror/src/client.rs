//! HTTP client for the mem0 REST API.

use crate::error::MirrorError;
use crate::provider::{MirrorMetadata, VectorEntry, VectorMemory};
use async_trait::async_trait;
use log::{debug, info};
use mnemo_rs_config::MirrorConfig;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Entry lists come back either bare or wrapped in `results`.
#[derive(Deserialize)]
#[serde(untagged)]
enum EntryList {
    Wrapped { results: Vec<VectorEntry> },
    Bare(Vec<VectorEntry>),
}

impl EntryList {
    fn into_entries(self) -> Vec<VectorEntry> {
        match self {
            EntryList::Wrapped { results } => results,
            EntryList::Bare(entries) => entries,
        }
    }
}

/// Client for a mem0-compatible service.
#[derive(Clone)]
pub struct Mem0Client {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl Mem0Client {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MirrorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Build a client whose API key is read from `env_var`.
    pub fn from_env(base_url: &str, env_var: &str, timeout: Duration) -> Result<Self, MirrorError> {
        let api_key = std::env::var(env_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| MirrorError::MissingApiKey {
                env_var: env_var.to_string(),
                hint: format!("export {env_var}=<api key> or set mirror.api_key_env"),
            })?;
        info!("vector memory client configured (base_url={base_url}, key_env={env_var})");
        Self::new(base_url, api_key, timeout)
    }

    pub fn from_config(config: &MirrorConfig) -> Result<Self, MirrorError> {
        Self::from_env(
            &config.base_url,
            &config.api_key_env,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, MirrorError> {
        let response = request
            .header("Authorization", format!("Token {}", self.api_key))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MirrorError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn entries(&self, request: reqwest::RequestBuilder) -> Result<Vec<VectorEntry>, MirrorError> {
        let list: EntryList = self.send(request).await?.json().await?;
        Ok(list.into_entries())
    }
}

#[async_trait]
impl VectorMemory for Mem0Client {
    async fn add(
        &self,
        text: &str,
        user_id: &str,
        metadata: MirrorMetadata,
    ) -> Result<Vec<VectorEntry>, MirrorError> {
        debug!("adding vector memory (user_id={user_id}, chars={})", text.len());
        let body = json!({
            "messages": [{ "role": "user", "content": text }],
            "user_id": user_id,
            "metadata": metadata,
        });
        self.entries(self.client.post(self.url("/v1/memories/")).json(&body))
            .await
    }

    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<VectorEntry>, MirrorError> {
        debug!("searching vector memory (user_id={user_id}, limit={limit})");
        let body = json!({ "query": query, "user_id": user_id, "limit": limit });
        self.entries(self.client.post(self.url("/v1/memories/search/")).json(&body))
            .await
    }

    async fn get_all(&self, user_id: &str) -> Result<Vec<VectorEntry>, MirrorError> {
        self.entries(
            self.client
                .get(self.url("/v1/memories/"))
                .query(&[("user_id", user_id)]),
        )
        .await
    }

    async fn update(&self, id: &str, text: &str) -> Result<(), MirrorError> {
        let request = self
            .client
            .put(self.url(&format!("/v1/memories/{id}/")))
            .json(&json!({ "text": text }));
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), MirrorError> {
        self.send(self.client.delete(self.url(&format!("/v1/memories/{id}/"))))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Mem0Client;
    use crate::error::MirrorError;
    use std::time::Duration;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client =
            Mem0Client::new("http://localhost:8000/", "key", Duration::from_secs(1)).expect("client");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn missing_key_names_the_variable() {
        let err = Mem0Client::from_env(
            "http://localhost",
            "MNEMO_TEST_KEY_THAT_IS_NEVER_SET",
            Duration::from_secs(1),
        )
        .err()
        .expect("error");
        match err {
            MirrorError::MissingApiKey { env_var, hint } => {
                assert_eq!(env_var, "MNEMO_TEST_KEY_THAT_IS_NEVER_SET");
                assert!(hint.contains("export MNEMO_TEST_KEY_THAT_IS_NEVER_SET"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
