use super::{ranking_order, UserStore};
use crate::{
    data::{CoinsEntry, FortuneEntry, History, UserRecord, UserUpdate},
    error::StoreError,
};
use serde::{Deserialize, Serialize};
use serenity::async_trait;
use std::{collections::HashMap, path::PathBuf};
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SignBook {
    users: HashMap<String, UserRecord>,
    #[serde(default)]
    coins_history: Vec<CoinsEntry>,
    #[serde(default)]
    fortune_history: Vec<FortuneEntry>,
}

/// Whole-document JSON storage. Every commit rewrites the file through a
/// `.part` sibling and a rename.
pub struct JsonStore {
    path: PathBuf,
    book: RwLock<SignBook>,
}

impl JsonStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let book = match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No data file at {}, starting fresh", path.display());
                SignBook::default()
            }
            Err(e) => return Err(e.into()),
        };
        debug!("Loaded {} sign records from {}", book.users.len(), path.display());

        Ok(Self {
            path,
            book: RwLock::new(book),
        })
    }

    /// Run `change` on a copy of the book and keep the copy only once it is on disk.
    async fn commit<F, T>(&self, change: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut SignBook) -> T + Send,
        T: Send,
    {
        let mut book = self.book.write().await;
        let mut next = book.clone();
        let out = change(&mut next);
        self.save(&next).await?;
        *book = next;
        Ok(out)
    }

    async fn save(&self, book: &SignBook) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(book)?;
        let partial = self.path.with_extension("json.part");
        fs::write(&partial, content).await?;
        fs::rename(&partial, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for JsonStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.book.read().await.users.get(user_id).cloned())
    }

    async fn apply(&self, user_id: &str, update: UserUpdate, history: History) -> Result<UserRecord, StoreError> {
        self.commit(move |book| {
            let record = book
                .users
                .entry(user_id.to_string())
                .or_insert_with(|| UserRecord::new(user_id));
            record.apply(&update);
            let record = record.clone();
            book.coins_history.extend(history.coins);
            book.fortune_history.extend(history.fortunes);
            record
        })
        .await
    }

    async fn top_n(&self, n: usize) -> Result<Vec<UserRecord>, StoreError> {
        let book = self.book.read().await;
        let mut records: Vec<UserRecord> = book.users.values().cloned().collect();
        records.sort_by(ranking_order);
        records.truncate(n);
        Ok(records)
    }

    async fn delete(&self, user_id: &str) -> Result<bool, StoreError> {
        self.commit(|book| {
            book.coins_history.retain(|e| e.user_id != user_id);
            book.fortune_history.retain(|e| e.user_id != user_id);
            book.users.remove(user_id).is_some()
        })
        .await
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        self.commit(|book| {
            let removed = book.users.len() as u64;
            *book = SignBook::default();
            removed
        })
        .await
    }

    async fn log_coins(&self, entry: CoinsEntry) -> Result<(), StoreError> {
        self.commit(move |book| book.coins_history.push(entry)).await
    }

    async fn log_fortune(&self, entry: FortuneEntry) -> Result<(), StoreError> {
        self.commit(move |book| book.fortune_history.push(entry)).await
    }

    async fn coins_history(&self, user_id: &str, limit: usize) -> Result<Vec<CoinsEntry>, StoreError> {
        let book = self.book.read().await;
        Ok(book
            .coins_history
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fortune_history(&self, user_id: &str, limit: usize) -> Result<Vec<FortuneEntry>, StoreError> {
        let book = self.book.read().await;
        Ok(book
            .fortune_history
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("sign-store-{}.json", uuid::Uuid::new_v4()))
    }

    async fn fresh() -> (JsonStore, PathBuf) {
        let path = temp_path();
        (JsonStore::open(&path).await.unwrap(), path)
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let (store, path) = fresh().await;
        contract::upsert_creates_then_updates(&store).await;
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn apply_writes_record_and_history_together() {
        let (store, path) = fresh().await;
        contract::apply_writes_record_and_history_together(&store).await;
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn failed_write_leaves_state_untouched() {
        let missing_dir = std::env::temp_dir().join(format!("sign-missing-{}", uuid::Uuid::new_v4()));
        let store = JsonStore::open(missing_dir.join("d.json")).await.unwrap();

        let update = UserUpdate {
            coins: Some(50),
            ..Default::default()
        };
        let history = History {
            coins: vec![CoinsEntry::new("u1", 50, crate::data::CoinReason::Daily)],
            fortunes: Vec::new(),
        };
        assert!(matches!(store.apply("u1", update, history).await, Err(StoreError::Io(_))));
        assert_eq!(store.get("u1").await.unwrap(), None);
        assert!(store.coins_history("u1", 10).await.unwrap().is_empty());

        assert!(store.log_fortune(FortuneEntry::new("u1", "Average", 50)).await.is_err());
        assert!(store.fortune_history("u1", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_keeps_record() {
        let (store, path) = fresh().await;
        store
            .upsert("u1", UserUpdate { coins: Some(3), ..Default::default() })
            .await
            .unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(path.with_extension("json.part")).unwrap();
        assert!(store.delete("u1").await.is_err());
        assert!(store.get("u1").await.unwrap().is_some());
        std::fs::remove_dir(path.with_extension("json.part")).unwrap();
    }

    #[tokio::test]
    async fn save_leaves_no_partial_file() {
        let (store, path) = fresh().await;
        store
            .upsert("u1", UserUpdate { coins: Some(3), ..Default::default() })
            .await
            .unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.part").exists());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn ranking_orders_by_coins_then_days() {
        let (store, path) = fresh().await;
        contract::ranking_orders_by_coins_then_days(&store).await;
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn delete_removes_record_and_history() {
        let (store, path) = fresh().await;
        contract::delete_removes_record_and_history(&store).await;
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_limited() {
        let (store, path) = fresh().await;
        contract::history_is_newest_first_and_limited(&store).await;
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let (store, path) = fresh().await;
        let update = UserUpdate {
            coins: Some(120),
            total_days: Some(4),
            ..Default::default()
        };
        let saved = store.upsert("bob", update).await.unwrap();
        drop(store);

        let reopened = JsonStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("bob").await.unwrap(), Some(saved));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let path = temp_path();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonStore::open(&path).await, Err(StoreError::Json(_))));
        let _ = std::fs::remove_file(path);
    }
}
