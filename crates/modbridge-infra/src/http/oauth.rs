//! Upstream OAuth client.
//!
//! Two distinct exchanges live here: the data-plane's refresh-token rotation
//! (long-lived refresh credential -> short-lived access credential, §2), and
//! the worker's per-connect exchange of the access credential for an even
//! shorter-lived chat-session credential (§4.1.1 step 3).

use std::time::Duration;

use serde::Deserialize;

#[derive(Clone)]
pub struct UpstreamAuthClient {
    client: reqwest::Client,
    auth_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
}

impl UpstreamAuthClient {
    pub fn new(auth_url: impl Into<String>, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build oauth http client");
        Self {
            client,
            auth_url: auth_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Data-plane side: rotate the access credential using the bot's
    /// long-lived refresh credential.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, OAuthError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let resp = self
            .client
            .post(format!("{}/oauth/token", self.auth_url))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::UnexpectedStatus(resp.status().as_u16()));
        }

        let token: TokenResponse = resp.json().await.map_err(|e| OAuthError::RequestFailed(e.to_string()))?;
        Ok(token.access_token)
    }

    /// Worker side: exchange the access credential for a short-lived
    /// chat-session credential used in the SASL-PLAIN handshake.
    pub async fn exchange_chat_token(&self, access_token: &str) -> Result<String, OAuthError> {
        #[derive(Deserialize)]
        struct ChatTokenResponse {
            chat_token: String,
        }

        let resp = self
            .client
            .post(format!("{}/chat-session", self.auth_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::UnexpectedStatus(resp.status().as_u16()));
        }

        let token: ChatTokenResponse = resp.json().await.map_err(|e| OAuthError::RequestFailed(e.to_string()))?;
        Ok(token.chat_token)
    }
}
