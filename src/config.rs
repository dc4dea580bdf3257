use crate::rewards::BonusPolicy;
use chrono_tz::Tz;
use std::{env, path::PathBuf, str::FromStr};

/// Longest ranking or history list a single reply will show.
pub const MAX_LIST_LEN: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Json { path: PathBuf },
    Sqlite { url: String },
}

/// Bot settings read from the environment, with `.env` loaded first.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub storage: StorageBackend,
    /// Directory holding the background image and the font file.
    pub asset_dir: PathBuf,
    /// Where to download the font from when it is missing locally.
    pub font_url: Option<String>,
    pub font_size: f32,
    pub bonus: BonusPolicy,
    /// Timezone whose calendar date counts as "today" for check-ins.
    pub timezone: Tz,
    pub ranking_size: usize,
    pub history_limit: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let storage = match lookup("SIGN_STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("json") => StorageBackend::Json {
                path: lookup("DATA_FILE_PATH")
                    .unwrap_or_else(|| "sign_data.json".to_string())
                    .into(),
            },
            Some("sqlite") => StorageBackend::Sqlite {
                url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://sign_data.db".to_string()),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "SIGN_STORAGE",
                    value: other.to_string(),
                })
            }
        };

        let defaults = BonusPolicy::default();
        let bonus = BonusPolicy {
            enabled: parse_or(&lookup, "SIGN_STREAK_BONUS", defaults.enabled)?,
            per_day: parse_or(&lookup, "SIGN_BONUS_PER_DAY", defaults.per_day)?,
            cap: parse_or(&lookup, "SIGN_BONUS_CAP", defaults.cap)?,
        };
        for (name, value) in [("SIGN_BONUS_PER_DAY", bonus.per_day), ("SIGN_BONUS_CAP", bonus.cap)] {
            if value < 0 {
                return Err(ConfigError::Invalid {
                    name,
                    value: value.to_string(),
                });
            }
        }

        let font_size: f32 = parse_or(&lookup, "SIGN_FONT_SIZE", 40.0)?;
        if font_size.is_nan() || font_size <= 0.0 {
            return Err(ConfigError::Invalid {
                name: "SIGN_FONT_SIZE",
                value: font_size.to_string(),
            });
        }

        Ok(Self {
            discord_token,
            storage,
            asset_dir: lookup("SIGN_ASSET_DIR")
                .unwrap_or_else(|| "assets".to_string())
                .into(),
            font_url: lookup("SIGN_FONT_URL").filter(|v| !v.trim().is_empty()),
            font_size,
            bonus,
            timezone: parse_or(&lookup, "SIGN_TIMEZONE", Tz::UTC)?,
            ranking_size: list_len(&lookup, "SIGN_RANKING_SIZE")?,
            history_limit: list_len(&lookup, "SIGN_HISTORY_LIMIT")?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
        }),
        _ => Ok(default),
    }
}

fn list_len<F>(lookup: &F, name: &'static str) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_or(lookup, name, 10usize)?.clamp(1, MAX_LIST_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_only_token() {
        let config = load(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert_eq!(
            config.storage,
            StorageBackend::Json {
                path: PathBuf::from("sign_data.json")
            }
        );
        assert_eq!(config.bonus, BonusPolicy::default());
        assert_eq!(config.timezone, Tz::UTC);
        assert_eq!(config.ranking_size, 10);
        assert_eq!(config.font_size, 40.0);
        assert!(config.font_url.is_none());
    }

    #[test]
    fn token_is_required() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("DISCORD_TOKEN"));
        assert_eq!(
            load(&[("DISCORD_TOKEN", "  ")]).unwrap_err(),
            ConfigError::Missing("DISCORD_TOKEN")
        );
    }

    #[test]
    fn sqlite_backend_and_overrides() {
        let config = load(&[
            ("DISCORD_TOKEN", "abc"),
            ("SIGN_STORAGE", "sqlite"),
            ("DATABASE_URL", "sqlite://test.db"),
            ("SIGN_STREAK_BONUS", "false"),
            ("SIGN_TIMEZONE", "Asia/Shanghai"),
            ("SIGN_RANKING_SIZE", "5"),
        ])
        .unwrap();

        assert_eq!(
            config.storage,
            StorageBackend::Sqlite {
                url: "sqlite://test.db".to_string()
            }
        );
        assert!(!config.bonus.enabled);
        assert_eq!(config.timezone, chrono_tz::Asia::Shanghai);
        assert_eq!(config.ranking_size, 5);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            load(&[("DISCORD_TOKEN", "abc"), ("SIGN_STORAGE", "redis")]),
            Err(ConfigError::Invalid { name: "SIGN_STORAGE", .. })
        ));
        assert!(matches!(
            load(&[("DISCORD_TOKEN", "abc"), ("SIGN_TIMEZONE", "Mars/Olympus")]),
            Err(ConfigError::Invalid { name: "SIGN_TIMEZONE", .. })
        ));
        assert!(matches!(
            load(&[("DISCORD_TOKEN", "abc"), ("SIGN_FONT_SIZE", "0")]),
            Err(ConfigError::Invalid { name: "SIGN_FONT_SIZE", .. })
        ));
    }

    #[test]
    fn negative_bonus_is_rejected() {
        assert_eq!(
            load(&[("DISCORD_TOKEN", "abc"), ("SIGN_BONUS_PER_DAY", "-5")]).unwrap_err(),
            ConfigError::Invalid {
                name: "SIGN_BONUS_PER_DAY",
                value: "-5".to_string()
            }
        );
        assert!(matches!(
            load(&[("DISCORD_TOKEN", "abc"), ("SIGN_BONUS_CAP", "-1")]),
            Err(ConfigError::Invalid { name: "SIGN_BONUS_CAP", .. })
        ));
        let config = load(&[("DISCORD_TOKEN", "abc"), ("SIGN_BONUS_CAP", "0")]).unwrap();
        assert_eq!(config.bonus.cap, 0);
    }

    #[test]
    fn list_sizes_are_clamped() {
        let config = load(&[
            ("DISCORD_TOKEN", "abc"),
            ("SIGN_RANKING_SIZE", "500"),
            ("SIGN_HISTORY_LIMIT", "0"),
        ])
        .unwrap();
        assert_eq!(config.ranking_size, MAX_LIST_LEN);
        assert_eq!(config.history_limit, 1);
    }
}
