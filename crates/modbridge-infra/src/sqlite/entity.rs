//! SQLite entity (room) repository implementation.

use std::collections::HashMap;

use modbridge_core::repository::entity::EntityRepository;
use modbridge_types::command_timer::{Command, Timer};
use modbridge_types::entity::{Entity, EntityStatus, EntityType};
use modbridge_types::error::RepositoryError;
use modbridge_types::ids::{BotId, EntityGuid};
use sqlx::Row;

use super::pool::DatabasePool;

pub struct SqliteEntityRepository {
    pool: DatabasePool,
}

impl SqliteEntityRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn parse_entity_type(s: &str) -> Result<EntityType, RepositoryError> {
    match s {
        "community" => Ok(EntityType::Community),
        "chat" => Ok(EntityType::Chat),
        "ihl" => Ok(EntityType::Ihl),
        other => Err(RepositoryError::Query(format!("invalid entity type: {other}"))),
    }
}

fn status_str(s: EntityStatus) -> &'static str {
    match s {
        EntityStatus::Active => "active",
        EntityStatus::Inactive => "inactive",
    }
}

fn row_to_entity(row: &sqlx::sqlite::SqliteRow) -> Result<Entity, RepositoryError> {
    let guid: String = row.try_get("guid").map_err(|e| RepositoryError::Query(e.to_string()))?;
    let entity_type: String = row.try_get("entity_type").map_err(|e| RepositoryError::Query(e.to_string()))?;
    let parent_guid: Option<String> = row.try_get("parent_guid").map_err(|e| RepositoryError::Query(e.to_string()))?;
    let status: String = row.try_get("status").map_err(|e| RepositoryError::Query(e.to_string()))?;
    let commands_json: String = row.try_get("commands").map_err(|e| RepositoryError::Query(e.to_string()))?;
    let timers_json: String = row.try_get("timers").map_err(|e| RepositoryError::Query(e.to_string()))?;
    let timer_counter_max: i64 = row.try_get("timer_counter_max").map_err(|e| RepositoryError::Query(e.to_string()))?;
    let read_only: i64 = row.try_get("read_only").map_err(|e| RepositoryError::Query(e.to_string()))?;
    let welcome_message: Option<String> = row.try_get("welcome_message").map_err(|e| RepositoryError::Query(e.to_string()))?;

    let commands: HashMap<String, Command> = serde_json::from_str(&commands_json).unwrap_or_default();
    let timers: Vec<Timer> = serde_json::from_str(&timers_json).unwrap_or_default();

    Ok(Entity {
        guid: EntityGuid::from(guid),
        entity_type: parse_entity_type(&entity_type)?,
        parent_guid: parent_guid.map(EntityGuid::from),
        status: match status.as_str() {
            "active" => EntityStatus::Active,
            "inactive" => EntityStatus::Inactive,
            other => return Err(RepositoryError::Query(format!("invalid entity status: {other}"))),
        },
        name: row.try_get("name").map_err(|e| RepositoryError::Query(e.to_string()))?,
        commands,
        timers,
        timer_counter_max: timer_counter_max as u32,
        read_only: read_only != 0,
        welcome_message,
    })
}

impl EntityRepository for SqliteEntityRepository {
    async fn get(&self, guid: &EntityGuid) -> Result<Option<Entity>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM entities WHERE guid = ?")
            .bind(&guid.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        row.as_ref().map(row_to_entity).transpose()
    }

    async fn active_for_bot(&self, bot_id: BotId) -> Result<HashMap<EntityGuid, Entity>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT e.* FROM entities e
             JOIN bot_entity_relations r ON r.entity_guid = e.guid
             WHERE r.bot_id = ? AND e.status = 'active'",
        )
        .bind(bot_id.0)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut out = HashMap::with_capacity(rows.len());
        for row in &rows {
            let entity = row_to_entity(row)?;
            out.insert(entity.guid.clone(), entity);
        }
        Ok(out)
    }

    async fn set_status(&self, guid: &EntityGuid, status: EntityStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE entities SET status = ? WHERE guid = ?")
            .bind(status_str(status))
            .bind(&guid.0)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
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

    async fn insert_entity(pool: &DatabasePool, guid: &str, status: &str) {
        sqlx::query(
            "INSERT INTO entities (guid, entity_type, parent_guid, status, name, commands, timers, timer_counter_max, read_only, welcome_message)
             VALUES (?, 'community', NULL, ?, 'room', '{}', '[]', 10, 0, NULL)",
        )
        .bind(guid)
        .bind(status)
        .execute(&pool.writer)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn get_roundtrips_entity() {
        let pool = test_pool().await;
        insert_entity(&pool, "e1", "active").await;
        let repo = SqliteEntityRepository::new(pool);
        let entity = repo.get(&EntityGuid::from("e1")).await.unwrap().unwrap();
        assert_eq!(entity.name, "room");
        assert!(entity.commands.is_empty());
    }

    #[tokio::test]
    async fn active_for_bot_excludes_inactive() {
        let pool = test_pool().await;
        insert_entity(&pool, "e1", "active").await;
        insert_entity(&pool, "e2", "inactive").await;
        sqlx::query("INSERT INTO bots (id, status, account_guid, display_name, refresh_token, access_token, last_refreshed_at) VALUES (1, 'active', 'a', 'b', 'r', 'a', '2024-01-01T00:00:00Z')")
            .execute(&pool.writer).await.unwrap();
        sqlx::query("INSERT INTO bot_entity_relations (entity_guid, bot_id) VALUES ('e1', 1), ('e2', 1)")
            .execute(&pool.writer).await.unwrap();

        let repo = SqliteEntityRepository::new(pool);
        let active = repo.active_for_bot(BotId(1)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert!(active.contains_key(&EntityGuid::from("e1")));
    }

    #[tokio::test]
    async fn set_status_updates_row() {
        let pool = test_pool().await;
        insert_entity(&pool, "e1", "active").await;
        let repo = SqliteEntityRepository::new(pool);
        repo.set_status(&EntityGuid::from("e1"), EntityStatus::Inactive).await.unwrap();
        let entity = repo.get(&EntityGuid::from("e1")).await.unwrap().unwrap();
        assert_eq!(entity.status, EntityStatus::Inactive);
    }
}
