use shared::constants::MAX_WORD_CANDIDATES;
use tracing::debug;

use super::{WordEntry, WordSource};
use crate::error::ClientError;

/// Word service speaking the datamuse `/words?sp=` query shape.
#[derive(Debug, Clone)]
pub struct HttpWordSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpWordSource {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

impl WordSource for HttpWordSource {
    async fn candidates(&self, length: usize) -> Result<Vec<String>, ClientError> {
        let url = format!("{}/words", self.base_url);
        let pattern = "?".repeat(length);
        let max = MAX_WORD_CANDIDATES.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("sp", pattern.as_str()), ("max", max.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status(),
                url,
            });
        }

        let entries: Vec<WordEntry> = serde_json::from_slice(&response.bytes().await?)?;
        debug!("Word service returned {} candidates for length {}", entries.len(), length);
        Ok(entries.into_iter().map(|entry| entry.word).collect())
    }
}
