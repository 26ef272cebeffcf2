//! Entity (room) repository port.

use std::collections::HashMap;
use std::future::Future;

use modbridge_types::entity::Entity;
use modbridge_types::error::RepositoryError;
use modbridge_types::ids::EntityGuid;

pub trait EntityRepository: Send + Sync {
    fn get(
        &self,
        guid: &EntityGuid,
    ) -> impl Future<Output = Result<Option<Entity>, RepositoryError>> + Send;

    /// Active entities owned by a bot (`GET /bots/:id/entities`), keyed by guid (I5).
    fn active_for_bot(
        &self,
        bot_id: modbridge_types::ids::BotId,
    ) -> impl Future<Output = Result<HashMap<EntityGuid, Entity>, RepositoryError>> + Send;

    fn set_status(
        &self,
        guid: &EntityGuid,
        status: modbridge_types::entity::EntityStatus,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
