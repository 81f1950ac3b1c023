//! Platform auth verification
//!
//! Authentication is owned by the hosted platform; the server only resolves
//! the caller's bearer token to a user id. The seam is a trait so tests can
//! substitute a canned verifier without network access.

use async_trait::async_trait;
use serde::Deserialize;

/// The authenticated caller, installed into the request extensions by the
/// auth middleware. Its id is the opaque owner id the pipeline stamps onto
/// every record.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

/// Resolve a bearer token to a user.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// `Ok(None)` means the platform rejected the token; `Err` means the
    /// lookup itself failed. Both are treated as unauthenticated.
    async fn verify(&self, token: &str) -> anyhow::Result<Option<AuthUser>>;
}

/// Verifier backed by the platform's auth endpoint.
pub struct PlatformVerifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlatformVerifier {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl AuthVerifier for PlatformVerifier {
    async fn verify(&self, token: &str) -> anyhow::Result<Option<AuthUser>> {
        #[derive(Deserialize)]
        struct UserResponse {
            id: String,
        }

        let url = format!("{}/auth/v1/user", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let user: UserResponse = response.json().await?;
        Ok(Some(AuthUser { id: user.id }))
    }
}
