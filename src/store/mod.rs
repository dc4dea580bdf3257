pub mod json;
pub mod sqlite;

use crate::{
    config::StorageBackend,
    data::{CoinsEntry, FortuneEntry, History, UserRecord, UserUpdate},
    error::StoreError,
};
use serenity::async_trait;
use std::{cmp::Ordering, sync::Arc};

pub use json::JsonStore;
pub use sqlite::SqliteStore;

pub type SharedStore = Arc<dyn UserStore>;

pub async fn open(backend: &StorageBackend) -> Result<SharedStore, StoreError> {
    let store: SharedStore = match backend {
        StorageBackend::Json { path } => Arc::new(JsonStore::open(path.clone()).await?),
        StorageBackend::Sqlite { url } => Arc::new(SqliteStore::connect(url).await?),
    };
    Ok(store)
}

/// Keyed persistence for per-user sign records and their history logs.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Create a default record if none exists, then apply `update` to it.
    async fn upsert(&self, user_id: &str, update: UserUpdate) -> Result<UserRecord, StoreError> {
        self.apply(user_id, update, History::default()).await
    }

    /// `upsert` plus appending `history`, all or nothing.
    async fn apply(&self, user_id: &str, update: UserUpdate, history: History) -> Result<UserRecord, StoreError>;

    /// Records ordered by coins, then total days, both descending.
    async fn top_n(&self, n: usize) -> Result<Vec<UserRecord>, StoreError>;

    /// Removes the record and its history. Returns whether a record existed.
    async fn delete(&self, user_id: &str) -> Result<bool, StoreError>;

    async fn delete_all(&self) -> Result<u64, StoreError>;

    async fn log_coins(&self, entry: CoinsEntry) -> Result<(), StoreError>;

    async fn log_fortune(&self, entry: FortuneEntry) -> Result<(), StoreError>;

    /// Newest entries first.
    async fn coins_history(&self, user_id: &str, limit: usize) -> Result<Vec<CoinsEntry>, StoreError>;

    async fn fortune_history(&self, user_id: &str, limit: usize) -> Result<Vec<FortuneEntry>, StoreError>;
}

pub(crate) fn ranking_order(a: &UserRecord, b: &UserRecord) -> Ordering {
    b.coins
        .cmp(&a.coins)
        .then_with(|| b.total_days.cmp(&a.total_days))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Shared behaviour checks run against every backend.
#[cfg(test)]
pub(crate) mod contract {
    use super::*;
    use crate::data::CoinReason;
    use chrono::NaiveDate;

    fn coins(amount: i64) -> UserUpdate {
        UserUpdate {
            coins: Some(amount),
            ..Default::default()
        }
    }

    pub async fn upsert_creates_then_updates(store: &dyn UserStore) {
        assert!(store.get("alice").await.unwrap().is_none());

        let created = store
            .upsert(
                "alice",
                UserUpdate {
                    total_days: Some(1),
                    last_sign: NaiveDate::from_ymd_opt(2024, 1, 1),
                    continuous_days: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.total_days, 1);
        assert_eq!(created.coins, 0);

        let updated = store.upsert("alice", coins(-5)).await.unwrap();
        assert_eq!(updated.coins, -5);
        assert_eq!(updated.total_days, 1);
        assert_eq!(updated.last_sign, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(store.get("alice").await.unwrap(), Some(updated));
    }

    pub async fn apply_writes_record_and_history_together(store: &dyn UserStore) {
        let history = History {
            coins: vec![
                CoinsEntry::new("a", 40, CoinReason::Daily),
                CoinsEntry::new("a", 20, CoinReason::StreakBonus),
            ],
            fortunes: vec![FortuneEntry::new("a", "Blessing", 80)],
        };
        let record = store.apply("a", coins(60), history).await.unwrap();
        assert_eq!(record.coins, 60);

        let logged: i64 = store
            .coins_history("a", 10)
            .await
            .unwrap()
            .iter()
            .map(|e| e.amount)
            .sum();
        assert_eq!(logged, record.coins);
        assert_eq!(store.fortune_history("a", 10).await.unwrap().len(), 1);
    }

    pub async fn ranking_orders_by_coins_then_days(store: &dyn UserStore) {
        store.upsert("a", UserUpdate { coins: Some(50), total_days: Some(1), ..Default::default() }).await.unwrap();
        store.upsert("b", UserUpdate { coins: Some(80), total_days: Some(1), ..Default::default() }).await.unwrap();
        store.upsert("c", UserUpdate { coins: Some(50), total_days: Some(9), ..Default::default() }).await.unwrap();
        store.upsert("d", UserUpdate { coins: Some(10), total_days: Some(30), ..Default::default() }).await.unwrap();

        let ranking: Vec<String> = store
            .top_n(3)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        assert_eq!(ranking, vec!["b", "c", "a"]);
    }

    pub async fn delete_removes_record_and_history(store: &dyn UserStore) {
        store.upsert("a", coins(1)).await.unwrap();
        store.upsert("b", coins(2)).await.unwrap();
        store.log_coins(CoinsEntry::new("a", 1, CoinReason::Daily)).await.unwrap();
        store.log_fortune(FortuneEntry::new("a", "Blessing", 80)).await.unwrap();

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert!(store.get("a").await.unwrap().is_none());
        assert!(store.coins_history("a", 10).await.unwrap().is_empty());
        assert!(store.fortune_history("a", 10).await.unwrap().is_empty());
        assert_eq!(store.top_n(10).await.unwrap().len(), 1);

        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert!(store.top_n(10).await.unwrap().is_empty());
    }

    pub async fn history_is_newest_first_and_limited(store: &dyn UserStore) {
        for amount in 1..=4 {
            let mut entry = CoinsEntry::new("a", amount, CoinReason::Daily);
            entry.timestamp += chrono::Duration::seconds(amount);
            store.log_coins(entry).await.unwrap();
        }
        store.log_coins(CoinsEntry::new("other", 99, CoinReason::AdminSet)).await.unwrap();
        store.log_fortune(FortuneEntry::new("a", "Average", 50)).await.unwrap();

        let amounts: Vec<i64> = store
            .coins_history("a", 3)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.amount)
            .collect();
        assert_eq!(amounts, vec![4, 3, 2]);

        let fortunes = store.fortune_history("a", 10).await.unwrap();
        assert_eq!(fortunes.len(), 1);
        assert_eq!(fortunes[0].result, "Average");
        assert_eq!(fortunes[0].value, 50);
    }
}
