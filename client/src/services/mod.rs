//! Collaborators the session controller talks to. Each has an HTTP (or
//! simulated) implementation here and an in-memory fake in the tests.

pub mod ads;
pub mod dictionary_api;
pub mod user_api;
pub mod word_api;

use std::future::Future;

use serde::Deserialize;
use shared::shared_jumble_game::{NewUser, UserRecord, UserUpdate};

use crate::error::ClientError;

pub use ads::SimulatedAdService;
pub use dictionary_api::HttpDictionary;
pub use user_api::HttpUserStore;
pub use word_api::HttpWordSource;

/// One entry of a word-service response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WordEntry {
    pub word: String,
}

pub trait WordSource: Send + Sync {
    /// Raw candidate words of `length` letters, unfiltered.
    fn candidates(&self, length: usize) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;
}

pub trait Dictionary: Send + Sync {
    fn is_word(&self, word: &str) -> impl Future<Output = Result<bool, ClientError>> + Send;
}

pub trait UserStore: Send + Sync + 'static {
    fn user_exists(&self, user_id: i64) -> impl Future<Output = Result<bool, ClientError>> + Send;

    fn get_user(&self, user_id: i64) -> impl Future<Output = Result<UserRecord, ClientError>> + Send;

    fn create_user(&self, user: &NewUser) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn update_user(
        &self,
        user_id: i64,
        update: &UserUpdate,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdOutcome {
    pub done: bool,
}

pub trait AdService: Send + Sync {
    fn show(&self) -> impl Future<Output = Result<AdOutcome, ClientError>> + Send;
}
