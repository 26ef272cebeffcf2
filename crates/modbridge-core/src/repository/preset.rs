//! Banned-word preset repository port.

use std::future::Future;

use modbridge_types::error::RepositoryError;
use modbridge_types::ids::{BotId, PresetId};
use modbridge_types::profanity::Preset;

pub trait PresetRepository: Send + Sync {
    fn get(
        &self,
        id: PresetId,
    ) -> impl Future<Output = Result<Option<Preset>, RepositoryError>> + Send;

    /// Active bots, for the refresh-preset fan-out (§4.5).
    fn active_bot_ids(&self) -> impl Future<Output = Result<Vec<BotId>, RepositoryError>> + Send;
}
