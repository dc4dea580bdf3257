use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc, NaiveDate};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub user_id: String,
    pub total_days: u32,
    pub last_sign: Option<NaiveDate>,
    pub continuous_days: u32,
    pub coins: i64,
    pub total_coins_gift: i64,
    pub last_fortune_result: String,
    pub last_fortune_value: u8,
}

impl UserRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_days: 0,
            last_sign: None,
            continuous_days: 0,
            coins: 0,
            total_coins_gift: 0,
            last_fortune_result: String::new(),
            last_fortune_value: 0,
        }
    }

    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(total_days) = update.total_days {
            self.total_days = total_days;
        }
        if let Some(last_sign) = update.last_sign {
            self.last_sign = Some(last_sign);
        }
        if let Some(continuous_days) = update.continuous_days {
            self.continuous_days = continuous_days;
        }
        if let Some(coins) = update.coins {
            self.coins = coins;
        }
        if let Some(total_coins_gift) = update.total_coins_gift {
            self.total_coins_gift = total_coins_gift;
        }
        if let Some(result) = &update.last_fortune_result {
            self.last_fortune_result = result.clone();
        }
        if let Some(value) = update.last_fortune_value {
            self.last_fortune_value = value;
        }
    }
}

/// Partial set of fields written by `UserStore::upsert`. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub total_days: Option<u32>,
    pub last_sign: Option<NaiveDate>,
    pub continuous_days: Option<u32>,
    pub coins: Option<i64>,
    pub total_coins_gift: Option<i64>,
    pub last_fortune_result: Option<String>,
    pub last_fortune_value: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinReason {
    Daily,
    StreakBonus,
    AdminSet,
}

impl CoinReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoinReason::Daily => "daily",
            CoinReason::StreakBonus => "streak_bonus",
            CoinReason::AdminSet => "admin_set",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(CoinReason::Daily),
            "streak_bonus" => Some(CoinReason::StreakBonus),
            "admin_set" => Some(CoinReason::AdminSet),
            _ => None,
        }
    }
}

impl fmt::Display for CoinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CoinReason::Daily => "daily check-in",
            CoinReason::StreakBonus => "streak bonus",
            CoinReason::AdminSet => "admin balance override",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinsEntry {
    pub user_id: String,
    pub amount: i64,
    pub reason: CoinReason,
    pub timestamp: DateTime<Utc>,
}

impl CoinsEntry {
    pub fn new(user_id: impl Into<String>, amount: i64, reason: CoinReason) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            reason,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneEntry {
    pub user_id: String,
    pub result: String,
    pub value: u8,
    pub timestamp: DateTime<Utc>,
}

impl FortuneEntry {
    pub fn new(user_id: impl Into<String>, result: impl Into<String>, value: u8) -> Self {
        Self {
            user_id: user_id.into(),
            result: result.into(),
            value,
            timestamp: Utc::now(),
        }
    }
}

/// History rows written in the same commit as a record update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    pub coins: Vec<CoinsEntry>,
    pub fortunes: Vec<FortuneEntry>,
}
