//! Bot-entity ownership repository port.

use std::future::Future;

use modbridge_types::error::RepositoryError;
use modbridge_types::ids::{BotId, EntityGuid};
use modbridge_types::relation::BotEntityRelation;

pub trait BotEntityRelationRepository: Send + Sync {
    fn for_bot(
        &self,
        bot_id: BotId,
    ) -> impl Future<Output = Result<Vec<BotEntityRelation>, RepositoryError>> + Send;

    fn owner_of(
        &self,
        entity_guid: &EntityGuid,
    ) -> impl Future<Output = Result<Option<BotId>, RepositoryError>> + Send;
}
