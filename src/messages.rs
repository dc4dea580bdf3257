use crate::{
    checkin::{BalanceChange, CheckinOutcome},
    data::{CoinsEntry, FortuneEntry, UserRecord},
    rewards::BonusPolicy,
};
use chrono::NaiveDate;

pub const SIGN_FAILED: &str = "Check-in failed, please ask an admin to check the logs.";
pub const LOOKUP_FAILED: &str = "Couldn't read sign data right now, please try again later.";
pub const NO_RECORD: &str = "You haven't checked in yet. Use `/sign` to start your streak!";

pub fn sign_success(outcome: &CheckinOutcome) -> String {
    let record = &outcome.record;
    let reward = &outcome.reward;

    let mut lines = vec![
        "Check-in successful!".to_string(),
        format!("Streak: {} | Total days: {}", plural_days(reward.streak), plural_days(record.total_days)),
    ];
    if reward.bonus > 0 {
        lines.push(format!("Coins: +{} (streak bonus +{})", reward.base, reward.bonus));
    } else {
        lines.push(format!("Coins: +{}", reward.base));
    }
    lines.push(format!("Balance: {}", record.coins));
    lines.push(format!(
        "Today's fortune: {} ({}/100)",
        reward.fortune.label(),
        reward.fortune.score
    ));
    lines.join("\n")
}

pub fn already_signed(today: NaiveDate) -> String {
    format!("You've already checked in today ({}). Come back tomorrow!", today)
}

pub fn status(record: &UserRecord) -> String {
    let last_sign = record
        .last_sign
        .map(|d| d.to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut lines = vec![
        "Sign status".to_string(),
        format!("Last check-in: {}", last_sign),
        format!("Streak: {} | Total days: {}", plural_days(record.continuous_days), plural_days(record.total_days)),
        format!("Balance: {} (streak bonuses earned: {})", record.coins, record.total_coins_gift),
    ];
    if !record.last_fortune_result.is_empty() {
        lines.push(format!(
            "Last fortune: {} ({}/100)",
            record.last_fortune_result, record.last_fortune_value
        ));
    }
    lines.join("\n")
}

pub fn ranking(records: &[UserRecord]) -> String {
    if records.is_empty() {
        return "Nobody has checked in yet.".to_string();
    }

    let mut message = String::from("**Coin ranking**\n");
    for (i, record) in records.iter().enumerate() {
        message.push_str(&format!(
            "{}. <@{}> - {} coins, {}\n",
            i + 1,
            record.user_id,
            record.coins,
            plural_days(record.total_days)
        ));
    }
    message
}

pub fn coins_history(entries: &[CoinsEntry]) -> String {
    if entries.is_empty() {
        return "No coin history yet.".to_string();
    }

    let mut message = String::from("**Recent coin changes**\n");
    for entry in entries {
        message.push_str(&format!(
            "{} {:+} ({})\n",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.amount,
            entry.reason
        ));
    }
    message
}

pub fn fortune_history(entries: &[FortuneEntry]) -> String {
    if entries.is_empty() {
        return "No fortune history yet.".to_string();
    }

    let mut message = String::from("**Recent fortunes**\n");
    for entry in entries {
        message.push_str(&format!(
            "{} {} ({}/100)\n",
            entry.timestamp.format("%Y-%m-%d"),
            entry.result,
            entry.value
        ));
    }
    message
}

pub fn balance_set(user_id: &str, change: &BalanceChange) -> String {
    format!(
        "Balance of <@{}> set to {} (was {}).",
        user_id, change.record.coins, change.previous
    )
}

pub fn record_deleted(user_id: &str, existed: bool) -> String {
    if existed {
        format!("Deleted the sign record of <@{}>.", user_id)
    } else {
        format!("<@{}> has no sign record.", user_id)
    }
}

pub fn all_records_deleted(count: u64) -> String {
    format!("Deleted {} sign record(s).", count)
}

pub fn help(policy: &BonusPolicy) -> String {
    let bonus = if policy.enabled {
        format!(
            "Consecutive days earn a streak bonus of {} coins per day, up to {}.",
            policy.per_day, policy.cap
        )
    } else {
        "There is no streak bonus.".to_string()
    };

    [
        "**Daily sign commands**",
        "`/sign` - check in once per day for 0-100 coins and a fortune draw",
        "`/sign-status` - show your streak, balance and last fortune",
        "`/sign-ranking` - top users by coins",
        "`/coins-history` - your recent coin changes",
        "`/fortune-history` - your recent fortunes",
        "`/sign-help` - this message",
        "",
        bonus.as_str(),
        "",
        "Admin: `/set-coins`, `/delete-sign-record`, `/delete-all-sign-records`",
    ]
    .join("\n")
}

fn plural_days(n: u32) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::CoinReason,
        rewards::{Fortune, Reward},
    };

    fn record() -> UserRecord {
        UserRecord {
            total_days: 12,
            last_sign: NaiveDate::from_ymd_opt(2024, 1, 2),
            continuous_days: 4,
            coins: 640,
            total_coins_gift: 90,
            last_fortune_result: "Blessing".to_string(),
            last_fortune_value: 81,
            ..UserRecord::new("1001")
        }
    }

    #[test]
    fn success_message_mentions_bonus_only_when_paid() {
        let mut outcome = CheckinOutcome {
            record: record(),
            reward: Reward {
                streak: 4,
                base: 55,
                bonus: 40,
                fortune: Fortune::from_score(81),
            },
        };
        let text = sign_success(&outcome);
        assert!(text.contains("Streak: 4 days | Total days: 12 days"));
        assert!(text.contains("+55 (streak bonus +40)"));
        assert!(text.contains("Balance: 640"));
        assert!(text.contains("Blessing (81/100)"));

        outcome.reward.bonus = 0;
        outcome.reward.streak = 1;
        let text = sign_success(&outcome);
        assert!(text.contains("Streak: 1 day |"));
        assert!(!text.contains("streak bonus"));
    }

    #[test]
    fn status_skips_empty_fortune() {
        assert!(status(&record()).contains("Last fortune: Blessing (81/100)"));

        let fresh = UserRecord::new("7");
        let text = status(&fresh);
        assert!(text.contains("Last check-in: never"));
        assert!(!text.contains("Last fortune"));
    }

    #[test]
    fn ranking_numbers_users_in_order() {
        let mut second = record();
        second.user_id = "1002".to_string();
        second.coins = 10;
        let text = ranking(&[record(), second]);

        assert!(text.contains("1. <@1001> - 640 coins, 12 days"));
        assert!(text.contains("2. <@1002> - 10 coins"));
        assert_eq!(ranking(&[]), "Nobody has checked in yet.");
    }

    #[test]
    fn coin_history_shows_signed_amounts() {
        let text = coins_history(&[
            CoinsEntry::new("1", -37, CoinReason::AdminSet),
            CoinsEntry::new("1", 20, CoinReason::StreakBonus),
        ]);
        assert!(text.contains("-37 (admin balance override)"));
        assert!(text.contains("+20 (streak bonus)"));
    }

    #[test]
    fn help_reflects_bonus_policy() {
        let disabled = BonusPolicy {
            enabled: false,
            ..BonusPolicy::default()
        };
        assert!(help(&BonusPolicy::default()).contains("10 coins per day, up to 200"));
        assert!(help(&disabled).contains("no streak bonus"));
    }
}
