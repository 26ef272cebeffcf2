//! Worker/manager-side client for the data-plane's HTTP surface (§4.5, §6).

use std::collections::HashMap;
use std::time::Duration;

use modbridge_types::bot::BotConfig;
use modbridge_types::entity::Entity;
use modbridge_types::error::DataPlaneError;
use modbridge_types::ids::{BotId, EntityGuid, PresetId};
use modbridge_types::profanity::{Preset, ProfanityConfigExtended};
use serde::Deserialize;

#[derive(Clone)]
pub struct DataPlaneClient {
    client: reqwest::Client,
    base_url: String,
}

impl DataPlaneClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build data-plane http client");
        Self { client, base_url: base_url.into() }
    }

    fn map_status(status: reqwest::StatusCode) -> DataPlaneError {
        if status == reqwest::StatusCode::NOT_FOUND {
            DataPlaneError::NotFound
        } else {
            DataPlaneError::UnexpectedStatus(status.as_u16())
        }
    }

    pub async fn health(&self) -> bool {
        matches!(
            self.client.get(format!("{}/health", self.base_url)).send().await,
            Ok(resp) if resp.status().is_success()
        )
    }

    pub async fn bots_active(&self) -> Result<Vec<BotId>, DataPlaneError> {
        let resp = self
            .client
            .get(format!("{}/bots/active", self.base_url))
            .send()
            .await
            .map_err(|e| DataPlaneError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::map_status(resp.status()));
        }
        #[derive(Deserialize)]
        struct Row {
            bot_id: i64,
        }
        let rows: Vec<Row> = resp.json().await.map_err(|e| DataPlaneError::Malformed(e.to_string()))?;
        Ok(rows.into_iter().map(|r| BotId(r.bot_id)).collect())
    }

    pub async fn bot_config(&self, bot_id: BotId, force: bool) -> Result<BotConfig, DataPlaneError> {
        let mut url = format!("{}/bots/{}/config", self.base_url, bot_id);
        if force {
            url.push_str("?force=1");
        }
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataPlaneError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::map_status(resp.status()));
        }
        resp.json().await.map_err(|e| DataPlaneError::Malformed(e.to_string()))
    }

    pub async fn bot_entities(&self, bot_id: BotId) -> Result<HashMap<EntityGuid, Entity>, DataPlaneError> {
        let resp = self
            .client
            .get(format!("{}/bots/{}/entities", self.base_url, bot_id))
            .send()
            .await
            .map_err(|e| DataPlaneError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::map_status(resp.status()));
        }
        resp.json().await.map_err(|e| DataPlaneError::Malformed(e.to_string()))
    }

    pub async fn entity_data(&self, guid: &EntityGuid) -> Result<Entity, DataPlaneError> {
        let resp = self
            .client
            .get(format!("{}/entities/{}/data", self.base_url, guid))
            .send()
            .await
            .map_err(|e| DataPlaneError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::map_status(resp.status()));
        }
        resp.json().await.map_err(|e| DataPlaneError::Malformed(e.to_string()))
    }

    /// §4.1.5: notify the data-plane of an upstream 404 against a known entity.
    pub async fn mark_entity_status(&self, guid: &EntityGuid, active: bool) -> Result<(), DataPlaneError> {
        let status = if active { "active" } else { "inactive" };
        let resp = self
            .client
            .post(format!("{}/entities/{}/status", self.base_url, guid))
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .map_err(|e| DataPlaneError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::map_status(resp.status()));
        }
        Ok(())
    }

    pub async fn preset(&self, id: PresetId) -> Result<Preset, DataPlaneError> {
        let resp = self
            .client
            .get(format!("{}/profanity-filter-presets/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| DataPlaneError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::map_status(resp.status()));
        }
        resp.json().await.map_err(|e| DataPlaneError::Malformed(e.to_string()))
    }

    pub async fn profanity_config(&self, entity_guid: &EntityGuid) -> Result<ProfanityConfigExtended, DataPlaneError> {
        let resp = self
            .client
            .get(format!("{}/profanity-filter-config/{}", self.base_url, entity_guid))
            .send()
            .await
            .map_err(|e| DataPlaneError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::map_status(resp.status()));
        }
        resp.json().await.map_err(|e| DataPlaneError::Malformed(e.to_string()))
    }
}
