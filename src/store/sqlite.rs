use super::UserStore;
use crate::{
    data::{CoinReason, CoinsEntry, FortuneEntry, History, UserRecord, UserUpdate},
    error::StoreError,
};
use chrono::{DateTime, Utc};
use serenity::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    SqliteExecutor,
};
use std::str::FromStr;
use tracing::info;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS sign_data (
        user_id TEXT PRIMARY KEY,
        total_days INTEGER NOT NULL DEFAULT 0,
        last_sign TEXT,
        continuous_days INTEGER NOT NULL DEFAULT 0,
        coins INTEGER NOT NULL DEFAULT 0,
        total_coins_gift INTEGER NOT NULL DEFAULT 0,
        last_fortune_result TEXT NOT NULL DEFAULT '',
        last_fortune_value INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS coins_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        amount INTEGER NOT NULL,
        reason TEXT NOT NULL,
        timestamp TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fortune_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        result TEXT NOT NULL,
        value INTEGER NOT NULL,
        timestamp TEXT NOT NULL
    )
    "#,
];

const SELECT_RECORD: &str = "SELECT user_id, total_days, last_sign, continuous_days, coins, \
     total_coins_gift, last_fortune_result, last_fortune_value FROM sign_data";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        info!("Connected to sign database at {}", url);
        Self::with_pool(pool).await
    }

    /// Single-connection in-memory database. Each call gets its own data.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }
}

async fn insert_coins<'e>(executor: impl SqliteExecutor<'e>, entry: &CoinsEntry) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO coins_history (user_id, amount, reason, timestamp) VALUES (?, ?, ?, ?)")
        .bind(&entry.user_id)
        .bind(entry.amount)
        .bind(entry.reason.as_str())
        .bind(entry.timestamp)
        .execute(executor)
        .await?;
    Ok(())
}

async fn insert_fortune<'e>(executor: impl SqliteExecutor<'e>, entry: &FortuneEntry) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO fortune_history (user_id, result, value, timestamp) VALUES (?, ?, ?, ?)")
        .bind(&entry.user_id)
        .bind(&entry.result)
        .bind(entry.value)
        .bind(entry.timestamp)
        .execute(executor)
        .await?;
    Ok(())
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(&format!("{SELECT_RECORD} WHERE user_id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn apply(&self, user_id: &str, update: UserUpdate, history: History) -> Result<UserRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO sign_data (user_id) VALUES (?) ON CONFLICT(user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE sign_data SET
                total_days = COALESCE(?, total_days),
                last_sign = COALESCE(?, last_sign),
                continuous_days = COALESCE(?, continuous_days),
                coins = COALESCE(?, coins),
                total_coins_gift = COALESCE(?, total_coins_gift),
                last_fortune_result = COALESCE(?, last_fortune_result),
                last_fortune_value = COALESCE(?, last_fortune_value)
            WHERE user_id = ?
            "#,
        )
        .bind(update.total_days)
        .bind(update.last_sign)
        .bind(update.continuous_days)
        .bind(update.coins)
        .bind(update.total_coins_gift)
        .bind(update.last_fortune_result)
        .bind(update.last_fortune_value)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let record = sqlx::query_as::<_, UserRecord>(&format!("{SELECT_RECORD} WHERE user_id = ?"))
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        for entry in &history.coins {
            insert_coins(&mut *tx, entry).await?;
        }
        for entry in &history.fortunes {
            insert_fortune(&mut *tx, entry).await?;
        }

        tx.commit().await?;
        Ok(record)
    }

    async fn top_n(&self, n: usize) -> Result<Vec<UserRecord>, StoreError> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "{SELECT_RECORD} ORDER BY coins DESC, total_days DESC, user_id ASC LIMIT ?"
        ))
        .bind(i64::try_from(n).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn delete(&self, user_id: &str) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM sign_data WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM coins_history WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM fortune_history WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(removed > 0)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM sign_data")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM coins_history").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM fortune_history").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn log_coins(&self, entry: CoinsEntry) -> Result<(), StoreError> {
        insert_coins(&self.pool, &entry).await?;
        Ok(())
    }

    async fn log_fortune(&self, entry: FortuneEntry) -> Result<(), StoreError> {
        insert_fortune(&self.pool, &entry).await?;
        Ok(())
    }

    async fn coins_history(&self, user_id: &str, limit: usize) -> Result<Vec<CoinsEntry>, StoreError> {
        let rows: Vec<(i64, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT amount, reason, timestamp FROM coins_history WHERE user_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(amount, reason, timestamp)| -> Result<CoinsEntry, StoreError> {
                let reason = match CoinReason::parse(&reason) {
                    Some(parsed) => parsed,
                    None => return Err(StoreError::UnknownReason(reason)),
                };
                Ok(CoinsEntry {
                    user_id: user_id.to_string(),
                    amount,
                    reason,
                    timestamp,
                })
            })
            .collect()
    }

    async fn fortune_history(&self, user_id: &str, limit: usize) -> Result<Vec<FortuneEntry>, StoreError> {
        let rows: Vec<(String, u8, DateTime<Utc>)> = sqlx::query_as(
            "SELECT result, value, timestamp FROM fortune_history WHERE user_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(result, value, timestamp)| FortuneEntry {
                user_id: user_id.to_string(),
                result,
                value,
                timestamp,
            })
            .collect())
    }
}
