//! Identity-provider profile store client (Clerk-compatible API).
//!
//! The provider owns authentication and per-user profile metadata; this
//! client only reads and replaces the `private_metadata` document, which is
//! where the favorites set lives.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

use super::{ProviderError, check_status};

const PROVIDER: &str = "identity";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub private_metadata: serde_json::Value,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Profile, ProviderError>;

    /// Replaces the whole private-metadata document. The store offers no
    /// conditional write, so concurrent updates can lose one another.
    async fn update_metadata(
        &self,
        user_id: &str,
        private_metadata: serde_json::Value,
    ) -> Result<(), ProviderError>;
}

#[derive(Debug)]
pub struct ProfileStoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProfileStoreClient {
    pub fn new(base_url: &str, secret_key: &str) -> Result<Self, ProviderError> {
        if secret_key.is_empty() {
            return Err(ProviderError::Config("identity secret key is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&format!("Bearer {secret_key}"))
            .map_err(|_| ProviderError::Config("Invalid identity secret key format".into()))?;
        headers.insert(AUTHORIZATION, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserObject {
    #[serde(default)]
    private_metadata: serde_json::Value,
}

#[async_trait]
impl IdentityProvider for ProfileStoreClient {
    async fn get_profile(&self, user_id: &str) -> Result<Profile, ProviderError> {
        let url = format!("{}/v1/users/{user_id}", self.base_url);
        let resp = self.http.get(&url).send().await?;
        check_status(PROVIDER, &resp)?;
        let user: UserObject = resp.json().await?;
        Ok(Profile {
            private_metadata: user.private_metadata,
        })
    }

    async fn update_metadata(
        &self,
        user_id: &str,
        private_metadata: serde_json::Value,
    ) -> Result<(), ProviderError> {
        let url = format!("{}/v1/users/{user_id}/metadata", self.base_url);
        let body = serde_json::json!({ "private_metadata": private_metadata });
        let resp = self.http.patch(&url).json(&body).send().await?;
        check_status(PROVIDER, &resp)?;
        Ok(())
    }
}
