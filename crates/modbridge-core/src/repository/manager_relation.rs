//! Manager-exemption repository port.

use std::future::Future;

use modbridge_types::error::RepositoryError;
use modbridge_types::ids::{EntityGuid, UserGuid};

pub trait ManagerRelationRepository: Send + Sync {
    fn for_entity(
        &self,
        entity_guid: &EntityGuid,
    ) -> impl Future<Output = Result<Vec<UserGuid>, RepositoryError>> + Send;
}
