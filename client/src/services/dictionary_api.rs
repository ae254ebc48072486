use reqwest::StatusCode;

use super::{Dictionary, WordEntry};
use crate::error::ClientError;

/// Dictionary lookup: a word is valid when the service echoes it back.
#[derive(Debug, Clone)]
pub struct HttpDictionary {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDictionary {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

impl Dictionary for HttpDictionary {
    async fn is_word(&self, word: &str) -> Result<bool, ClientError> {
        let url = format!("{}/words", self.base_url);
        let lowered = word.to_lowercase();

        let response = self
            .client
            .get(&url)
            .query(&[("sp", lowered.as_str()), ("max", "1")])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => {
                let entries: Vec<WordEntry> = serde_json::from_slice(&response.bytes().await?)?;
                Ok(entries.iter().any(|entry| entry.word.eq_ignore_ascii_case(word)))
            }
            status => Err(ClientError::Status { status, url }),
        }
    }
}
