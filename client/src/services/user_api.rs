use serde::de::DeserializeOwned;
use shared::shared_jumble_game::{NewUser, UserExistsResponse, UserRecord, UserUpdate};

use super::UserStore;
use crate::error::ClientError;

/// The Tonmics user service.
#[derive(Debug, Clone)]
pub struct HttpUserStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpUserStore {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn check(response: reqwest::Response, url: String) -> Result<reqwest::Response, ClientError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ClientError::Status {
                status: response.status(),
                url,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ClientError> {
        let response = self.client.get(&url).send().await?;
        let response = Self::check(response, url).await?;
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }
}

impl UserStore for HttpUserStore {
    async fn user_exists(&self, user_id: i64) -> Result<bool, ClientError> {
        let body: UserExistsResponse = self
            .get_json(format!("{}/user-exists/{}", self.base_url, user_id))
            .await?;
        Ok(body.exists)
    }

    async fn get_user(&self, user_id: i64) -> Result<UserRecord, ClientError> {
        self.get_json(format!("{}/getUser/{}", self.base_url, user_id)).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<(), ClientError> {
        let url = format!("{}/createUser", self.base_url);
        let response = self.client.post(&url).json(user).send().await?;
        Self::check(response, url).await?;
        Ok(())
    }

    async fn update_user(&self, user_id: i64, update: &UserUpdate) -> Result<(), ClientError> {
        let url = format!("{}/updateUser/{}", self.base_url, user_id);
        let response = self.client.put(&url).json(update).send().await?;
        Self::check(response, url).await?;
        Ok(())
    }
}
