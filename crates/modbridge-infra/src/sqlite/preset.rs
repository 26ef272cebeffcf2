//! SQLite banned-word preset repository implementation.

use modbridge_core::repository::preset::PresetRepository;
use modbridge_types::error::RepositoryError;
use modbridge_types::ids::{BotId, PresetId};
use modbridge_types::profanity::Preset;
use sqlx::Row;

use super::pool::DatabasePool;

pub struct SqlitePresetRepository {
    pool: DatabasePool,
}

impl SqlitePresetRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl PresetRepository for SqlitePresetRepository {
    async fn get(&self, id: PresetId) -> Result<Option<Preset>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM presets WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else { return Ok(None) };
        let words_json: String = row.try_get("words").map_err(|e| RepositoryError::Query(e.to_string()))?;
        let words: Vec<String> = serde_json::from_str(&words_json).unwrap_or_default();

        Ok(Some(Preset {
            id: PresetId(row.try_get("id").map_err(|e| RepositoryError::Query(e.to_string()))?),
            name: row.try_get("name").map_err(|e| RepositoryError::Query(e.to_string()))?,
            language: row.try_get("language").map_err(|e| RepositoryError::Query(e.to_string()))?,
            words,
        }))
    }

    async fn active_bot_ids(&self) -> Result<Vec<BotId>, RepositoryError> {
        let rows = sqlx::query("SELECT id FROM bots WHERE status = 'active' ORDER BY id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        rows.iter()
            .map(|r| r.try_get::<i64, _>("id").map(BotId).map_err(|e| RepositoryError::Query(e.to_string())))
            .collect()
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
    async fn get_missing_preset_is_none() {
        let pool = test_pool().await;
        let repo = SqlitePresetRepository::new(pool);
        assert!(repo.get(PresetId(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_roundtrips_words() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO presets (id, name, language, words) VALUES (1, 'basic', 'en', '[\"bad\",\"word\"]')")
            .execute(&pool.writer).await.unwrap();
        let repo = SqlitePresetRepository::new(pool);
        let preset = repo.get(PresetId(1)).await.unwrap().unwrap();
        assert_eq!(preset.words, vec!["bad".to_string(), "word".to_string()]);
    }

    #[tokio::test]
    async fn active_bot_ids_only_active() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO bots (id, status, account_guid, display_name, refresh_token, access_token, last_refreshed_at) VALUES (1, 'active', 'a', 'b', 'r', 'a', '2024-01-01T00:00:00Z')")
            .execute(&pool.writer).await.unwrap();
        sqlx::query("INSERT INTO bots (id, status, account_guid, display_name, refresh_token, access_token, last_refreshed_at) VALUES (2, 'inactive', 'a', 'b', 'r', 'a', '2024-01-01T00:00:00Z')")
            .execute(&pool.writer).await.unwrap();
        let repo = SqlitePresetRepository::new(pool);
        assert_eq!(repo.active_bot_ids().await.unwrap(), vec![BotId(1)]);
    }
}
