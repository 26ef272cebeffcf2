//! SQLite bot-entity ownership repository implementation.

use modbridge_core::repository::relation::BotEntityRelationRepository;
use modbridge_types::error::RepositoryError;
use modbridge_types::ids::{BotId, EntityGuid};
use modbridge_types::relation::BotEntityRelation;
use sqlx::Row;

use super::pool::DatabasePool;

pub struct SqliteBotEntityRelationRepository {
    pool: DatabasePool,
}

impl SqliteBotEntityRelationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl BotEntityRelationRepository for SqliteBotEntityRelationRepository {
    async fn for_bot(&self, bot_id: BotId) -> Result<Vec<BotEntityRelation>, RepositoryError> {
        let rows = sqlx::query("SELECT entity_guid, bot_id FROM bot_entity_relations WHERE bot_id = ?")
            .bind(bot_id.0)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let guid: String = row.try_get("entity_guid").map_err(|e| RepositoryError::Query(e.to_string()))?;
                let bot_id: i64 = row.try_get("bot_id").map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(BotEntityRelation {
                    entity_guid: EntityGuid::from(guid),
                    bot_id: BotId(bot_id),
                })
            })
            .collect()
    }

    async fn owner_of(&self, entity_guid: &EntityGuid) -> Result<Option<BotId>, RepositoryError> {
        let row = sqlx::query("SELECT bot_id FROM bot_entity_relations WHERE entity_guid = ?")
            .bind(&entity_guid.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|r| r.try_get::<i64, _>("bot_id").map(BotId))
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn seed(pool: &DatabasePool) {
        sqlx::query("INSERT INTO bots (id, status, account_guid, display_name, refresh_token, access_token, last_refreshed_at) VALUES (1, 'active', 'a', 'b', 'r', 'a', '2024-01-01T00:00:00Z')")
            .execute(&pool.writer).await.unwrap();
        sqlx::query("INSERT INTO entities (guid, entity_type, parent_guid, status, name, commands, timers, timer_counter_max, read_only, welcome_message) VALUES ('e1', 'community', NULL, 'active', 'room', '{}', '[]', 10, 0, NULL)")
            .execute(&pool.writer).await.unwrap();
        sqlx::query("INSERT INTO bot_entity_relations (entity_guid, bot_id) VALUES ('e1', 1)")
            .execute(&pool.writer).await.unwrap();
    }

    #[tokio::test]
    async fn for_bot_lists_owned_entities() {
        let pool = test_pool().await;
        seed(&pool).await;
        let repo = SqliteBotEntityRelationRepository::new(pool);
        let rels = repo.for_bot(BotId(1)).await.unwrap();
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].entity_guid, EntityGuid::from("e1"));
    }

    #[tokio::test]
    async fn owner_of_missing_entity_is_none() {
        let pool = test_pool().await;
        let repo = SqliteBotEntityRelationRepository::new(pool);
        assert!(repo.owner_of(&EntityGuid::from("gone")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn owner_of_known_entity() {
        let pool = test_pool().await;
        seed(&pool).await;
        let repo = SqliteBotEntityRelationRepository::new(pool);
        assert_eq!(repo.owner_of(&EntityGuid::from("e1")).await.unwrap(), Some(BotId(1)));
    }
}
