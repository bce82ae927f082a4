//! City issuance forecasts and badge rarity

use std::fmt;

use tracing::debug;

use crate::error::{Result, RewardError};
use crate::models::{BadgeRarityEntry, BadgeStat, CityMetric, ForecastResult};

pub const DEFAULT_DAILY_GROWTH_RATE: f64 = 0.001;

/// Project a city's totals one period ahead.
///
/// Each token total is compounded once by `daily_growth_rate`; there is no
/// history and no smoothing.
pub fn forecast(metric: &CityMetric, daily_growth_rate: f64) -> ForecastResult {
    let factor = 1.0 + daily_growth_rate;
    ForecastResult {
        city: metric.city.clone(),
        growth_rate: daily_growth_rate,
        current_ply: metric.ply_total,
        current_crt: metric.crt_total,
        projected_ply: metric.ply_total * factor,
        projected_crt: metric.crt_total * factor,
        submissions: metric.submissions,
    }
}

/// Forecast every city, largest projected PLY issuance first.
pub fn forecast_all(metrics: &[CityMetric], daily_growth_rate: f64) -> Vec<ForecastResult> {
    let mut results: Vec<_> = metrics
        .iter()
        .map(|m| forecast(m, daily_growth_rate))
        .collect();
    results.sort_by(|a, b| {
        b.projected_ply
            .total_cmp(&a.projected_ply)
            .then_with(|| a.city.cmp(&b.city))
    });
    results
}

/// Compute `earned_by / total_scans` for each badge, rarest first.
///
/// With no recorded scans every rarity is undefined, so the whole call
/// fails with `DivisionUndefined`. Badges nobody has earned yet have no
/// rarity and are left out.
pub fn badge_rarity(stats: &[BadgeStat], total_scans: u64) -> Result<Vec<BadgeRarityEntry>> {
    if total_scans == 0 {
        return Err(RewardError::DivisionUndefined);
    }

    let mut entries = Vec::with_capacity(stats.len());
    for stat in stats {
        if stat.earned_by > total_scans {
            return Err(RewardError::BadgeCountExceedsScans {
                badge: stat.badge_id.clone(),
                earned_by: stat.earned_by,
                total_scans,
            });
        }
        if stat.earned_by == 0 {
            debug!(badge = %stat.badge_id, "skipping badge with no earners");
            continue;
        }
        entries.push(BadgeRarityEntry {
            badge_id: stat.badge_id.clone(),
            earned_by: stat.earned_by,
            rarity: stat.earned_by as f64 / total_scans as f64,
        });
    }

    entries.sort_by(|a, b| {
        a.rarity
            .total_cmp(&b.rarity)
            .then_with(|| a.badge_id.cmp(&b.badge_id))
    });
    Ok(entries)
}

impl fmt::Display for ForecastResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<20} {:>14.1} {:>14.1} {:>12.1} {:>12.1} {:>8}",
            self.city,
            self.current_ply,
            self.projected_ply,
            self.current_crt,
            self.projected_crt,
            self.submissions
        )
    }
}
