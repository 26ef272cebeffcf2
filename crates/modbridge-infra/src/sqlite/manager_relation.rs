//! SQLite manager-exemption repository implementation.

use modbridge_core::repository::manager_relation::ManagerRelationRepository;
use modbridge_types::error::RepositoryError;
use modbridge_types::ids::{EntityGuid, UserGuid};
use sqlx::Row;

use super::pool::DatabasePool;

pub struct SqliteManagerRelationRepository {
    pool: DatabasePool,
}

impl SqliteManagerRelationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl ManagerRelationRepository for SqliteManagerRelationRepository {
    async fn for_entity(&self, entity_guid: &EntityGuid) -> Result<Vec<UserGuid>, RepositoryError> {
        let rows = sqlx::query("SELECT user_guid FROM manager_relations WHERE entity_guid = ?")
            .bind(&entity_guid.0)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|r| r.try_get::<String, _>("user_guid").map(UserGuid::from))
            .collect::<Result<Vec<_>, _>>()
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

    #[tokio::test]
    async fn for_entity_lists_exemptions() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO entities (guid, entity_type, parent_guid, status, name, commands, timers, timer_counter_max, read_only, welcome_message) VALUES ('e1', 'community', NULL, 'active', 'room', '{}', '[]', 10, 0, NULL)")
            .execute(&pool.writer).await.unwrap();
        sqlx::query("INSERT INTO manager_relations (entity_guid, user_guid) VALUES ('e1', 'u1'), ('e1', 'u2')")
            .execute(&pool.writer).await.unwrap();

        let repo = SqliteManagerRelationRepository::new(pool);
        let mut guids = repo.for_entity(&EntityGuid::from("e1")).await.unwrap();
        guids.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(guids, vec![UserGuid::from("u1"), UserGuid::from("u2")]);
    }

    #[tokio::test]
    async fn for_entity_empty_when_none() {
        let pool = test_pool().await;
        let repo = SqliteManagerRelationRepository::new(pool);
        assert!(repo.for_entity(&EntityGuid::from("e1")).await.unwrap().is_empty());
    }
}
