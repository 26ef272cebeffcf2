//! SQLite bot repository implementation.

use chrono::{DateTime, Utc};
use modbridge_core::repository::bot::BotRepository;
use modbridge_types::bot::{Bot, BotStatus};
use modbridge_types::error::RepositoryError;
use modbridge_types::ids::BotId;
use sqlx::Row;

use super::pool::DatabasePool;

pub struct SqliteBotRepository {
    pool: DatabasePool,
}

impl SqliteBotRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn parse_status(s: &str) -> Result<BotStatus, RepositoryError> {
    match s {
        "active" => Ok(BotStatus::Active),
        "inactive" => Ok(BotStatus::Inactive),
        other => Err(RepositoryError::Query(format!("invalid bot status: {other}"))),
    }
}

fn row_to_bot(row: &sqlx::sqlite::SqliteRow) -> Result<Bot, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Query(e.to_string()))?;
    let status: String = row.try_get("status").map_err(|e| RepositoryError::Query(e.to_string()))?;
    let last_refreshed_at: Option<String> = row
        .try_get("last_refreshed_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(Bot {
        id: BotId(id),
        status: parse_status(&status)?,
        account_guid: row.try_get("account_guid").map_err(|e| RepositoryError::Query(e.to_string()))?,
        display_name: row.try_get("display_name").map_err(|e| RepositoryError::Query(e.to_string()))?,
        refresh_token: row.try_get("refresh_token").map_err(|e| RepositoryError::Query(e.to_string()))?,
        access_token: row.try_get("access_token").map_err(|e| RepositoryError::Query(e.to_string()))?,
        last_refreshed_at: last_refreshed_at
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| RepositoryError::Query(e.to_string()))
            })
            .transpose()?,
    })
}

impl BotRepository for SqliteBotRepository {
    async fn list_active_ids(&self) -> Result<Vec<BotId>, RepositoryError> {
        let rows = sqlx::query("SELECT id FROM bots WHERE status = 'active' ORDER BY id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(rows
            .iter()
            .map(|r| r.try_get::<i64, _>("id").map(BotId))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::Query(e.to_string()))?)
    }

    async fn get(&self, id: BotId) -> Result<Option<Bot>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM bots WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(row_to_bot).transpose()
    }

    async fn update_tokens(
        &self,
        id: BotId,
        access_token: &str,
        refreshed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE bots SET access_token = ?, last_refreshed_at = ? WHERE id = ?",
        )
        .bind(access_token)
        .bind(refreshed_at.to_rfc3339())
        .bind(id.0)
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

    async fn insert_bot(pool: &DatabasePool, id: i64, status: &str) {
        sqlx::query(
            "INSERT INTO bots (id, status, account_guid, display_name, refresh_token, access_token, last_refreshed_at)
             VALUES (?, ?, 'acct', 'Bot', 'refresh', 'access', ?)",
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now().to_rfc3339())
        .execute(&pool.writer)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn list_active_ids_excludes_inactive() {
        let pool = test_pool().await;
        insert_bot(&pool, 1, "active").await;
        insert_bot(&pool, 2, "inactive").await;
        let repo = SqliteBotRepository::new(pool);
        assert_eq!(repo.list_active_ids().await.unwrap(), vec![BotId(1)]);
    }

    #[tokio::test]
    async fn get_missing_bot_is_none() {
        let pool = test_pool().await;
        let repo = SqliteBotRepository::new(pool);
        assert!(repo.get(BotId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_tokens_writes_through() {
        let pool = test_pool().await;
        insert_bot(&pool, 1, "active").await;
        let repo = SqliteBotRepository::new(pool);
        let now = Utc::now();
        repo.update_tokens(BotId(1), "new-token", now).await.unwrap();
        let bot = repo.get(BotId(1)).await.unwrap().unwrap();
        assert_eq!(bot.access_token, "new-token");
    }

    #[tokio::test]
    async fn update_tokens_missing_bot_not_found() {
        let pool = test_pool().await;
        let repo = SqliteBotRepository::new(pool);
        let err = repo.update_tokens(BotId(1), "x", Utc::now()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
