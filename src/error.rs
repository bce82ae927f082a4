//! Error types for reward scoring and aggregation

use thiserror::Error;

use crate::models::MaterialFamily;

/// Validation failures returned by the scoring and forecast functions.
///
/// Every variant is a local input error: nothing here is retried and
/// nothing is fatal to the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewardError {
    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Invalid weight: {0} kg (must be greater than zero)")]
    InvalidWeight(f64),

    #[error("Invalid condition '{condition}' for {family} material {material}")]
    InvalidCondition {
        material: String,
        family: MaterialFamily,
        condition: String,
    },

    #[error("Invalid contamination score: {0} (must be within 0.0..=1.0)")]
    InvalidContamination(f64),

    #[error("Badge rarity is undefined when no scans have been recorded")]
    DivisionUndefined,

    #[error("Badge {badge} earned {earned_by} times but only {total_scans} scans recorded")]
    BadgeCountExceedsScans {
        badge: String,
        earned_by: u64,
        total_scans: u64,
    },
}

pub type Result<T> = std::result::Result<T, RewardError>;
