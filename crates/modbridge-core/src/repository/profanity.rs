//! Per-entity moderation configuration repository port.

use std::future::Future;

use modbridge_types::error::RepositoryError;
use modbridge_types::ids::EntityGuid;
use modbridge_types::profanity::ProfanityConfigExtended;

pub trait ProfanityConfigRepository: Send + Sync {
    fn get(
        &self,
        entity_guid: &EntityGuid,
    ) -> impl Future<Output = Result<Option<ProfanityConfigExtended>, RepositoryError>> + Send;
}
