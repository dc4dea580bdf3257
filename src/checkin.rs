use crate::{
    data::{CoinReason, CoinsEntry, FortuneEntry, History, UserRecord, UserUpdate},
    error::{SignError, StoreError},
    rewards::{self, BonusPolicy, DailyDraw, Reward},
    store::SharedStore,
};
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinOutcome {
    pub record: UserRecord,
    pub reward: Reward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceChange {
    pub previous: i64,
    pub record: UserRecord,
}

/// Check-in and balance operations on top of a `UserStore`.
pub struct SignService {
    store: SharedStore,
    policy: BonusPolicy,
    // Held across read-modify-write so concurrent commands can't double-sign.
    write_lock: Mutex<()>,
}

impl SignService {
    pub fn new(store: SharedStore, policy: BonusPolicy) -> Self {
        Self {
            store,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &BonusPolicy {
        &self.policy
    }

    pub async fn check_in(
        &self,
        user_id: &str,
        today: NaiveDate,
        draw: DailyDraw,
    ) -> Result<CheckinOutcome, SignError> {
        let _guard = self.write_lock.lock().await;

        let current = self
            .store
            .get(user_id)
            .await?
            .unwrap_or_else(|| UserRecord::new(user_id));

        let reward = match rewards::calculate(current.last_sign, current.continuous_days, today, draw, &self.policy) {
            Ok(reward) => reward,
            Err(e) => {
                debug!("User {} already checked in on {}", user_id, today);
                return Err(e);
            }
        };

        let update = UserUpdate {
            total_days: Some(current.total_days + 1),
            last_sign: Some(today),
            continuous_days: Some(reward.streak),
            coins: Some(current.coins + reward.total()),
            total_coins_gift: Some(current.total_coins_gift + reward.bonus),
            last_fortune_result: Some(reward.fortune.label().to_string()),
            last_fortune_value: Some(reward.fortune.score),
        };
        let mut coins = vec![CoinsEntry::new(user_id, reward.base, CoinReason::Daily)];
        if reward.bonus > 0 {
            coins.push(CoinsEntry::new(user_id, reward.bonus, CoinReason::StreakBonus));
        }
        let history = History {
            coins,
            fortunes: vec![FortuneEntry::new(user_id, reward.fortune.label(), reward.fortune.score)],
        };
        let record = self.store.apply(user_id, update, history).await?;

        info!(
            "User {} checked in on {}: streak {}, +{} coins (+{} bonus), fortune {}",
            user_id,
            today,
            reward.streak,
            reward.base,
            reward.bonus,
            reward.fortune.label()
        );

        Ok(CheckinOutcome { record, reward })
    }

    pub async fn status(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        self.store.get(user_id).await
    }

    pub async fn ranking(&self, n: usize) -> Result<Vec<UserRecord>, StoreError> {
        self.store.top_n(n).await
    }

    pub async fn coins_history(&self, user_id: &str, limit: usize) -> Result<Vec<CoinsEntry>, StoreError> {
        self.store.coins_history(user_id, limit).await
    }

    pub async fn fortune_history(&self, user_id: &str, limit: usize) -> Result<Vec<FortuneEntry>, StoreError> {
        self.store.fortune_history(user_id, limit).await
    }

    /// Overwrite a user's balance, creating the record if needed.
    pub async fn set_balance(&self, user_id: &str, amount: i64) -> Result<BalanceChange, StoreError> {
        let _guard = self.write_lock.lock().await;

        let previous = self.store.get(user_id).await?.map(|r| r.coins).unwrap_or(0);
        let update = UserUpdate {
            coins: Some(amount),
            ..Default::default()
        };
        let history = History {
            coins: vec![CoinsEntry::new(user_id, amount - previous, CoinReason::AdminSet)],
            ..Default::default()
        };
        let record = self.store.apply(user_id, update, history).await?;

        info!("Balance of user {} set from {} to {}", user_id, previous, amount);
        Ok(BalanceChange { previous, record })
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let removed = self.store.delete(user_id).await?;
        info!("Deleted sign record for user {} (existed: {})", user_id, removed);
        Ok(removed)
    }

    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        let removed = self.store.delete_all().await?;
        info!("Deleted all {} sign records", removed);
        Ok(removed)
    }
}
