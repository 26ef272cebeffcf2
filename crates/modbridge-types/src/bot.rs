//! A bot identity: the (account guid, refresh credential) pair a worker
//! authenticates under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::BotId;

/// Lifecycle status of a bot identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    Active,
    Inactive,
}

/// A bot row as stored by the data-plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub id: BotId,
    pub status: BotStatus,
    pub account_guid: String,
    pub display_name: String,
    /// Long-lived OAuth refresh credential.
    pub refresh_token: String,
    /// Short-lived OAuth access credential, rotated by the data-plane.
    pub access_token: String,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// Response shape for `GET /bots/:id/config`: the bits a worker needs to
/// open an upstream session. Deliberately excludes the refresh credential --
/// the worker never sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub bot_guid: String,
    pub bot_token: String,
    pub nickname: String,
}

impl From<&Bot> for BotConfig {
    fn from(bot: &Bot) -> Self {
        Self {
            bot_guid: bot.account_guid.clone(),
            bot_token: bot.access_token.clone(),
            nickname: bot.display_name.clone(),
        }
    }
}
