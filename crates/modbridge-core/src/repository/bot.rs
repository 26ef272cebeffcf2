//! Bot repository port.

use std::future::Future;

use modbridge_types::bot::Bot;
use modbridge_types::error::RepositoryError;
use modbridge_types::ids::BotId;

pub trait BotRepository: Send + Sync {
    /// Ordered list of active bot ids (`GET /bots/active`).
    fn list_active_ids(&self) -> impl Future<Output = Result<Vec<BotId>, RepositoryError>> + Send;

    fn get(&self, id: BotId) -> impl Future<Output = Result<Option<Bot>, RepositoryError>> + Send;

    /// Record a fresh access-token exchange.
    fn update_tokens(
        &self,
        id: BotId,
        access_token: &str,
        refreshed_at: chrono::DateTime<chrono::Utc>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
