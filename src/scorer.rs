//! Reward scoring for recycling submissions
//!
//! Plastics are scored on weight and condition; e-waste is scored per
//! device on condition and packaging. Both round to one decimal.

use std::fmt;

use tracing::{debug, warn};

use crate::catalog;
use crate::error::{Result, RewardError};
use crate::models::{
    ActivityReward, BonusFlags, Condition, EWasteCondition, MaterialFamily, MaterialType,
    PlasticCondition, RewardBreakdown, RewardResult, SubmissionInput, UserActivityContext,
};
use crate::validation;

pub const PLASTIC_BASE_REWARD: f64 = 5.0;
pub const E_WASTE_BASE_REWARD: f64 = 15.0;
pub const WEIGHT_FACTOR_PER_KG: f64 = 0.1;
/// Anti-abuse cap: heavier submissions earn no more than this weight factor
pub const MAX_WEIGHT_FACTOR: f64 = 2.0;
pub const PACKAGING_BONUS: f64 = 1.2;

/// Score one submission.
///
/// Fails with `InvalidWeight` for non-positive or non-finite weights,
/// `InvalidCondition` when the condition belongs to the other family, and
/// `InvalidContamination` when a device reading reports a score outside
/// `0.0..=1.0`.
pub fn score(
    material: &MaterialType,
    weight_kg: f64,
    condition: Condition,
    flags: &BonusFlags,
) -> Result<RewardResult> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(RewardError::InvalidWeight(weight_kg));
    }
    if let Some(reading) = &flags.reading {
        let c = reading.contamination_score;
        if !(0.0..=1.0).contains(&c) {
            return Err(RewardError::InvalidContamination(c));
        }
    }

    let breakdown = breakdown_for(material, Some(weight_kg), condition, flags)?;
    let verdict = flags.reading.as_ref().map(validation::validate_reading);
    let valid = verdict.is_none_or(|v| v.valid);

    let result = RewardResult {
        material_id: material.id.to_string(),
        family: material.family,
        condition,
        amount: breakdown.total(),
        breakdown,
        valid,
        verdict,
    };

    if valid {
        debug!(
            material = material.id,
            weight_kg,
            condition = %condition,
            amount = result.amount,
            "scored submission"
        );
    } else {
        warn!(
            material = material.id,
            confidence = verdict.map(|v| v.confidence),
            "submission failed device validation"
        );
    }

    Ok(result)
}

pub fn score_submission(input: &SubmissionInput) -> Result<RewardResult> {
    score(input.material, input.weight_kg, input.condition, &input.flags)
}

/// Resolve a condition name within the material's own family.
pub fn parse_condition(material: &MaterialType, text: &str) -> Result<Condition> {
    Condition::parse(material.family, text).ok_or_else(|| RewardError::InvalidCondition {
        material: material.id.to_string(),
        family: material.family,
        condition: text.to_string(),
    })
}

/// Plastic reward by material id.
pub fn calculate_reward(
    material_id: &str,
    weight_kg: f64,
    condition: PlasticCondition,
) -> Result<RewardResult> {
    let material = catalog::lookup(material_id)?;
    score(material, weight_kg, Condition::Plastic(condition), &BonusFlags::default())
}

/// E-waste reward by material id. Devices are scored per item, so no
/// weight is required.
pub fn calculate_e_waste_reward(
    material_id: &str,
    condition: EWasteCondition,
    has_original_packaging: bool,
) -> Result<RewardResult> {
    let material = catalog::lookup(material_id)?;
    let condition = Condition::EWaste(condition);
    let flags = BonusFlags {
        has_original_packaging,
        reading: None,
    };
    let breakdown = breakdown_for(material, None, condition, &flags)?;

    Ok(RewardResult {
        material_id: material.id.to_string(),
        family: material.family,
        condition,
        amount: breakdown.total(),
        breakdown,
        valid: true,
        verdict: None,
    })
}

/// Apply a user's streak and referral bonuses on top of a scored reward.
/// Submissions that failed validation contribute a base of zero.
pub fn apply_activity(result: &RewardResult, ctx: &UserActivityContext) -> ActivityReward {
    let base = if result.valid { result.amount } else { 0.0 };
    ctx.apply(base)
}

fn breakdown_for(
    material: &MaterialType,
    weight_kg: Option<f64>,
    condition: Condition,
    flags: &BonusFlags,
) -> Result<RewardBreakdown> {
    if condition.family() != material.family {
        return Err(RewardError::InvalidCondition {
            material: material.id.to_string(),
            family: material.family,
            condition: condition.name().to_string(),
        });
    }

    let breakdown = match material.family {
        MaterialFamily::Plastic => {
            let weight_kg = weight_kg.ok_or(RewardError::InvalidWeight(0.0))?;
            RewardBreakdown {
                base_reward: PLASTIC_BASE_REWARD,
                material_multiplier: material.multiplier,
                weight_factor: (weight_kg * WEIGHT_FACTOR_PER_KG).min(MAX_WEIGHT_FACTOR),
                condition_multiplier: condition.multiplier(),
                bonus_multiplier: 1.0,
            }
        }
        MaterialFamily::EWaste => RewardBreakdown {
            base_reward: E_WASTE_BASE_REWARD,
            material_multiplier: material.multiplier,
            weight_factor: 1.0,
            condition_multiplier: condition.multiplier(),
            bonus_multiplier: if flags.has_original_packaging {
                PACKAGING_BONUS
            } else {
                1.0
            },
        },
    };
    Ok(breakdown)
}

impl fmt::Display for RewardResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Reward ===")?;
        writeln!(f, "Material:  {} ({})", self.material_id, self.family)?;
        writeln!(f, "Condition: {}", self.condition)?;
        writeln!(f)?;

        let b = &self.breakdown;
        writeln!(f, "Breakdown:")?;
        writeln!(f, "  Base:      {:.1}", b.base_reward)?;
        writeln!(f, "  Material:  x{:.2}", b.material_multiplier)?;
        writeln!(f, "  Weight:    x{:.2}", b.weight_factor)?;
        writeln!(f, "  Condition: x{:.2}", b.condition_multiplier)?;
        writeln!(f, "  Bonus:     x{:.2}", b.bonus_multiplier)?;
        writeln!(f)?;

        if let Some(v) = &self.verdict {
            writeln!(f, "Device confidence: {:.2}", v.confidence)?;
        }
        write!(f, "Reward: {:.1} PLY", self.amount)?;
        if !self.valid {
            write!(f, " (rejected by device validation)")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for ActivityReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Base:            {:.1} PLY", self.base)?;
        writeln!(f, "Streak:          x{:.2}", self.streak_multiplier)?;
        writeln!(f, "Referral bonus:  +{:.0} PLY", self.referral_bonus)?;
        writeln!(f, "Total:           {} PLY", self.total)
    }
}
