//! SQLite per-entity moderation configuration repository implementation.

use modbridge_core::repository::profanity::ProfanityConfigRepository;
use modbridge_types::error::RepositoryError;
use modbridge_types::ids::{EntityGuid, PresetId, UserGuid};
use modbridge_types::profanity::{ProfanityConfig, ProfanityConfigExtended};
use sqlx::Row;

use super::pool::DatabasePool;

pub struct SqliteProfanityConfigRepository {
    pool: DatabasePool,
}

impl SqliteProfanityConfigRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl ProfanityConfigRepository for SqliteProfanityConfigRepository {
    async fn get(&self, entity_guid: &EntityGuid) -> Result<Option<ProfanityConfigExtended>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM profanity_configs WHERE entity_guid = ?")
            .bind(&entity_guid.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else { return Ok(None) };

        let preset_id: Option<i64> = row.try_get("preset_id").map_err(|e| RepositoryError::Query(e.to_string()))?;
        let custom_words_json: String = row.try_get("custom_words").map_err(|e| RepositoryError::Query(e.to_string()))?;
        let custom_words: Vec<String> = serde_json::from_str(&custom_words_json).unwrap_or_default();
        let mute_duration_seconds: i64 = row.try_get("mute_duration_seconds").map_err(|e| RepositoryError::Query(e.to_string()))?;
        let active: i64 = row.try_get("active").map_err(|e| RepositoryError::Query(e.to_string()))?;

        let config = ProfanityConfig {
            entity_guid: entity_guid.clone(),
            preset_id: preset_id.map(PresetId),
            custom_words,
            discord_webhook_url: row.try_get("discord_webhook_url").map_err(|e| RepositoryError::Query(e.to_string()))?,
            custom_webhook_message: row.try_get("custom_webhook_message").map_err(|e| RepositoryError::Query(e.to_string()))?,
            reply_message: row.try_get("reply_message").map_err(|e| RepositoryError::Query(e.to_string()))?,
            mute_duration_seconds: mute_duration_seconds.max(0) as u64,
            active: active != 0,
        };

        let manager_rows = sqlx::query("SELECT user_guid FROM manager_relations WHERE entity_guid = ?")
            .bind(&entity_guid.0)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let manager_guids = manager_rows
            .iter()
            .map(|r| r.try_get::<String, _>("user_guid").map(UserGuid::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Some(ProfanityConfigExtended { config, manager_guids }))
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

    async fn seed_entity(pool: &DatabasePool, guid: &str) {
        sqlx::query("INSERT INTO entities (guid, entity_type, parent_guid, status, name, commands, timers, timer_counter_max, read_only, welcome_message) VALUES (?, 'community', NULL, 'active', 'room', '{}', '[]', 10, 0, NULL)")
            .bind(guid)
            .execute(&pool.writer).await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_config_is_none() {
        let pool = test_pool().await;
        let repo = SqliteProfanityConfigRepository::new(pool);
        assert!(repo.get(&EntityGuid::from("e1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_includes_manager_guids() {
        let pool = test_pool().await;
        seed_entity(&pool, "e1").await;
        sqlx::query("INSERT INTO profanity_configs (entity_guid, preset_id, custom_words, discord_webhook_url, custom_webhook_message, reply_message, mute_duration_seconds, active) VALUES ('e1', NULL, '[\"x\"]', NULL, NULL, NULL, 30, 1)")
            .execute(&pool.writer).await.unwrap();
        sqlx::query("INSERT INTO manager_relations (entity_guid, user_guid) VALUES ('e1', 'u1')")
            .execute(&pool.writer).await.unwrap();

        let repo = SqliteProfanityConfigRepository::new(pool);
        let cfg = repo.get(&EntityGuid::from("e1")).await.unwrap().unwrap();
        assert_eq!(cfg.config.custom_words, vec!["x".to_string()]);
        assert_eq!(cfg.config.mute_duration_seconds, 30);
        assert_eq!(cfg.manager_guids, vec![UserGuid::from("u1")]);
    }
}
