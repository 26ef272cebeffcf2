//! Upstream admin HTTP API client: message retraction and member muting
//! (§4.4). Isolates the "HTTP 500 means success" quirk to this one client
//! (§9) -- it must never leak into the generic data-plane client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use modbridge_types::error::AdminApiError;
use modbridge_types::ids::{EntityGuid, UserGuid};

#[derive(Clone)]
pub struct AdminApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl AdminApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build admin api http client");
        Self { client, base_url: base_url.into() }
    }

    /// Retract a message. Waits `predelay` before issuing the request to
    /// avoid racing the upstream's own commit of the message (§4.4).
    ///
    /// The upstream returns HTTP 500 on a successful retraction; 2xx and 500
    /// both count as success here, and only here.
    pub async fn delete_message(
        &self,
        access_token: &str,
        message_id: &str,
        author_jid: &str,
        muc_jid: &str,
        predelay: Duration,
    ) -> Result<(), AdminApiError> {
        tokio::time::sleep(predelay).await;

        let url = format!(
            "{}/messages/retract/{}?from={}&muc={}",
            self.base_url, message_id, author_jid, muc_jid
        );
        let resp = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AdminApiError::RequestFailed(e.to_string()))?;

        let status = resp.status();
        if status.is_success() || status.as_u16() == 500 {
            return Ok(());
        }
        if status.as_u16() == 403 {
            return Err(AdminApiError::PermissionDenied);
        }
        Err(AdminApiError::RequestFailed(format!("unexpected status {status}")))
    }

    /// Mute a member. `club_id` is the parent guid for chat/ihl entities, the
    /// entity guid itself for community entities (`Entity::club_guid`).
    pub async fn mute_member(
        &self,
        access_token: &str,
        club_id: &EntityGuid,
        user_guid: &UserGuid,
        until: DateTime<Utc>,
    ) -> Result<(), AdminApiError> {
        let url = format!("{}/club/{}/member/{}:mute", self.base_url, club_id, user_guid);
        let resp = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "until": until.to_rfc3339() }))
            .send()
            .await
            .map_err(|e| AdminApiError::RequestFailed(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        if status.as_u16() == 403 {
            return Err(AdminApiError::PermissionDenied);
        }
        Err(AdminApiError::RequestFailed(format!("unexpected status {status}")))
    }
}
