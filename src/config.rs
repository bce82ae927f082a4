//! Runtime settings for the command-line shell

use std::env;
use std::path::PathBuf;

use crate::forecast::DEFAULT_DAILY_GROWTH_RATE;

pub const DB_ENV: &str = "PLY_REWARDS_DB";
pub const GROWTH_RATE_ENV: &str = "PLY_REWARDS_GROWTH_RATE";
/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "ply_rewards=info";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// SQLite snapshot store
    pub database: PathBuf,
    pub daily_growth_rate: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from("ply_rewards.db"),
            daily_growth_rate: DEFAULT_DAILY_GROWTH_RATE,
        }
    }
}

impl Settings {
    /// Defaults overridden by `PLY_REWARDS_DB` and `PLY_REWARDS_GROWTH_RATE`.
    /// An unparsable growth rate keeps the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(db) = lookup(DB_ENV).filter(|v| !v.is_empty()) {
            settings.database = PathBuf::from(db);
        }
        if let Some(rate) = lookup(GROWTH_RATE_ENV) {
            match rate.trim().parse::<f64>() {
                Ok(r) if r.is_finite() => settings.daily_growth_rate = r,
                _ => tracing::warn!(value = %rate, "ignoring invalid {}", GROWTH_RATE_ENV),
            }
        }
        settings
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, database: Option<PathBuf>, growth_rate: Option<f64>) -> Self {
        if let Some(db) = database {
            self.database = db;
        }
        match growth_rate {
            Some(rate) if rate.is_finite() => self.daily_growth_rate = rate,
            Some(rate) => tracing::warn!(value = rate, "ignoring non-finite growth rate"),
            None => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.database, PathBuf::from("ply_rewards.db"));
        assert_eq!(s.daily_growth_rate, 0.001);
    }

    #[test]
    fn environment_overrides_defaults() {
        let s = Settings::from_lookup(|key| match key {
            DB_ENV => Some("/tmp/rewards.db".to_string()),
            GROWTH_RATE_ENV => Some("0.05".to_string()),
            _ => None,
        });
        assert_eq!(s.database, PathBuf::from("/tmp/rewards.db"));
        assert_eq!(s.daily_growth_rate, 0.05);
    }

    #[test]
    fn bad_growth_rate_keeps_default() {
        let s = Settings::from_lookup(|key| (key == GROWTH_RATE_ENV).then(|| "fast".to_string()));
        assert_eq!(s.daily_growth_rate, DEFAULT_DAILY_GROWTH_RATE);
    }

    #[test]
    fn cli_overrides_win() {
        let s = Settings::default().with_overrides(Some(PathBuf::from("cli.db")), Some(0.2));
        assert_eq!(s.database, PathBuf::from("cli.db"));
        assert_eq!(s.daily_growth_rate, 0.2);
    }

    #[test]
    fn non_finite_cli_rate_keeps_current() {
        for rate in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let s = Settings::default().with_overrides(None, Some(rate));
            assert_eq!(s.daily_growth_rate, DEFAULT_DAILY_GROWTH_RATE);
        }
    }
}
