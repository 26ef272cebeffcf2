//! Data-plane's client for a worker's control surface
//! (`127.0.0.1:(4000 + bot_id)`, §6).
//!
//! Used by the data-plane to fan out `/assign`, `/unassign`, `/update`, and
//! `/refresh-preset` notifications. A worker that cannot be reached is not a
//! data-plane error -- it just means the worker will pick the change up on
//! its next periodic reconciliation (§4.5).

use std::time::Duration;

use modbridge_types::ids::{BotId, EntityGuid, PresetId};

#[derive(Clone)]
pub struct WorkerControlClient {
    client: reqwest::Client,
}

/// Whether the fan-out reached the worker. Maps directly to the data-plane's
/// 200-vs-202 response (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutOutcome {
    Delivered,
    WorkerUnreachable,
}

impl Default for WorkerControlClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerControlClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build worker-control http client");
        Self { client }
    }

    fn base_url(bot_id: BotId) -> Option<String> {
        bot_id.worker_port().map(|port| format!("http://127.0.0.1:{port}"))
    }

    async fn post(&self, bot_id: BotId, path: &str) -> FanOutOutcome {
        let Some(base) = Self::base_url(bot_id) else {
            tracing::error!(%bot_id, "worker control port overflow, cannot fan out");
            return FanOutOutcome::WorkerUnreachable;
        };
        match self.client.post(format!("{base}{path}")).send().await {
            Ok(resp) if resp.status().is_success() => FanOutOutcome::Delivered,
            Ok(resp) => {
                tracing::warn!(%bot_id, status = %resp.status(), path, "worker control endpoint returned non-success");
                FanOutOutcome::WorkerUnreachable
            }
            Err(err) => {
                tracing::warn!(%bot_id, %err, path, "worker unreachable for fan-out");
                FanOutOutcome::WorkerUnreachable
            }
        }
    }

    pub async fn assign(&self, bot_id: BotId, entity_guid: &EntityGuid) -> FanOutOutcome {
        self.post(bot_id, &format!("/assign/{entity_guid}")).await
    }

    pub async fn unassign(&self, bot_id: BotId, entity_guid: &EntityGuid) -> FanOutOutcome {
        self.post(bot_id, &format!("/unassign/{entity_guid}")).await
    }

    pub async fn update(&self, bot_id: BotId, entity_guid: &EntityGuid) -> FanOutOutcome {
        self.post(bot_id, &format!("/update/{entity_guid}")).await
    }

    pub async fn refresh_preset(&self, bot_id: BotId, preset_id: PresetId) -> FanOutOutcome {
        self.post(bot_id, &format!("/refresh-preset/{preset_id}")).await
    }
}
