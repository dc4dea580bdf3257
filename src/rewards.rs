use crate::error::SignError;
use chrono::NaiveDate;
use rand::Rng;

/// Fortune labels ordered from worst to best.
pub const FORTUNE_LABELS: [&str; 7] = [
    "Great Misfortune",
    "Misfortune",
    "Slight Misfortune",
    "Average",
    "Small Blessing",
    "Blessing",
    "Great Blessing",
];

pub const MAX_ROLL: u8 = 100;

/// How the streak bonus is paid out on top of the base reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusPolicy {
    pub enabled: bool,
    pub per_day: i64,
    pub cap: i64,
}

impl Default for BonusPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            per_day: 10,
            cap: 200,
        }
    }
}

impl BonusPolicy {
    pub fn bonus(&self, streak: u32) -> i64 {
        if !self.enabled || streak <= 1 {
            return 0;
        }
        (i64::from(streak) * self.per_day).min(self.cap)
    }
}

/// The two random numbers behind a check-in. Drawn up front so the
/// rest of the calculation stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyDraw {
    pub base: u8,
    pub fortune: u8,
}

impl DailyDraw {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            base: rng.gen_range(0..=MAX_ROLL),
            fortune: rng.gen_range(0..=MAX_ROLL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub streak: u32,
    pub base: i64,
    pub bonus: i64,
    pub fortune: Fortune,
}

impl Reward {
    pub fn total(&self) -> i64 {
        self.base + self.bonus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fortune {
    pub tier: usize,
    pub score: u8,
}

impl Fortune {
    pub fn from_score(score: u8) -> Self {
        let score = score.min(MAX_ROLL);
        Self {
            tier: fortune_tier(score),
            score,
        }
    }

    pub fn label(&self) -> &'static str {
        FORTUNE_LABELS[self.tier]
    }
}

pub fn fortune_tier(score: u8) -> usize {
    (usize::from(score) / 15).min(FORTUNE_LABELS.len() - 1)
}

/// Compute the streak a check-in on `today` produces.
///
/// A stored date equal to (or, after a clock change, later than) `today`
/// means the user has already checked in for this calendar day.
pub fn next_streak(
    last_sign: Option<NaiveDate>,
    continuous_days: u32,
    today: NaiveDate,
) -> Result<u32, SignError> {
    match last_sign {
        Some(last) if last >= today => Err(SignError::AlreadySigned(today)),
        Some(last) if today.pred_opt() == Some(last) => Ok(continuous_days.saturating_add(1)),
        _ => Ok(1),
    }
}

pub fn calculate(
    last_sign: Option<NaiveDate>,
    continuous_days: u32,
    today: NaiveDate,
    draw: DailyDraw,
    policy: &BonusPolicy,
) -> Result<Reward, SignError> {
    let streak = next_streak(last_sign, continuous_days, today)?;

    Ok(Reward {
        streak,
        base: i64::from(draw.base.min(MAX_ROLL)),
        bonus: policy.bonus(streak),
        fortune: Fortune::from_score(draw.fortune),
    })
}
