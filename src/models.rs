//! Data models for materials, submissions, rewards and city metrics

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two disjoint material families. Each has its own condition domain
/// and its own scoring formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialFamily {
    Plastic,
    EWaste,
}

impl fmt::Display for MaterialFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plastic => write!(f, "plastic"),
            Self::EWaste => write!(f, "e-waste"),
        }
    }
}

/// Recycling difficulty, ordered from easiest to most specialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Specialized,
}

impl DifficultyTier {
    pub fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Specialized => "specialized",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardLevel {
    None,
    Low,
    Moderate,
    High,
}

impl HazardLevel {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

/// A catalog entry. Instances only exist inside the static catalog tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialType {
    pub id: &'static str,
    pub name: &'static str,
    pub family: MaterialFamily,
    pub category: &'static str,
    /// SPI resin identification code, plastics only
    pub resin_code: Option<u8>,
    pub multiplier: f64,
    pub difficulty: DifficultyTier,
    pub hazard: HazardLevel,
}

/// Physical condition of a plastic item, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlasticCondition {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl PlasticCondition {
    pub const ALL: [PlasticCondition; 4] = [Self::Poor, Self::Fair, Self::Good, Self::Excellent];

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Poor => 0.5,
            Self::Fair => 0.8,
            Self::Good => 1.0,
            Self::Excellent => 1.2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

/// Physical condition of an electronic device, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EWasteCondition {
    Damaged,
    Functional,
    LikeNew,
}

impl EWasteCondition {
    pub const ALL: [EWasteCondition; 3] = [Self::Damaged, Self::Functional, Self::LikeNew];

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Damaged => 0.5,
            Self::Functional => 1.0,
            Self::LikeNew => 1.5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Damaged => "damaged",
            Self::Functional => "functional",
            Self::LikeNew => "like-new",
        }
    }
}

/// A condition tagged with the family whose domain it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Plastic(PlasticCondition),
    EWaste(EWasteCondition),
}

impl Condition {
    pub fn family(self) -> MaterialFamily {
        match self {
            Self::Plastic(_) => MaterialFamily::Plastic,
            Self::EWaste(_) => MaterialFamily::EWaste,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Plastic(c) => c.multiplier(),
            Self::EWaste(c) => c.multiplier(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Plastic(c) => c.name(),
            Self::EWaste(c) => c.name(),
        }
    }

    /// Parse a condition name within one family's domain.
    ///
    /// Matching ignores case and treats `-`, `_` and spaces alike, so
    /// `like-new`, `like_new` and `LikeNew` all name the same tier.
    /// Returns `None` when the name is not part of that family's domain.
    pub fn parse(family: MaterialFamily, text: &str) -> Option<Self> {
        let key: String = text
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match family {
            MaterialFamily::Plastic => PlasticCondition::ALL
                .into_iter()
                .find(|c| c.name().replace('-', "") == key)
                .map(Self::Plastic),
            MaterialFamily::EWaste => EWasteCondition::ALL
                .into_iter()
                .find(|c| c.name().replace('-', "") == key)
                .map(Self::EWaste),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Telemetry captured by a collection-point device for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    pub device_id: String,
    pub weight_kg: f64,
    /// 0.0 = clean, 1.0 = fully contaminated
    pub contamination_score: f64,
    pub has_image_evidence: bool,
}

/// Optional context that adjusts a reward or its validity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusFlags {
    /// E-waste only
    pub has_original_packaging: bool,
    /// Present when the scan came through an IoT collection point
    pub reading: Option<DeviceReading>,
}

/// One scan event, already classified.
#[derive(Debug, Clone)]
pub struct SubmissionInput {
    pub material: &'static MaterialType,
    pub weight_kg: f64,
    pub condition: Condition,
    pub flags: BonusFlags,
}

/// The multipliers that produced a reward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub base_reward: f64,
    pub material_multiplier: f64,
    /// Capped weight term for plastics, 1.0 for e-waste
    pub weight_factor: f64,
    pub condition_multiplier: f64,
    /// Packaging bonus for e-waste, 1.0 otherwise
    pub bonus_multiplier: f64,
}

impl RewardBreakdown {
    /// Product of all factors before rounding.
    pub fn raw_total(&self) -> f64 {
        self.base_reward
            * self.material_multiplier
            * self.weight_factor
            * self.condition_multiplier
            * self.bonus_multiplier
    }

    /// Rounded reward amount, identical to the scorer's output.
    pub fn total(&self) -> f64 {
        round_to_tenth(self.raw_total())
    }
}

/// Outcome of the IoT trust heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub confidence: f64,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardResult {
    pub material_id: String,
    pub family: MaterialFamily,
    pub condition: Condition,
    /// PLY amount, rounded to one decimal
    pub amount: f64,
    pub breakdown: RewardBreakdown,
    pub valid: bool,
    pub verdict: Option<ValidationVerdict>,
}

/// Per-user engagement counters supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivityContext {
    pub streak_days: u32,
    pub referrals: u32,
}

/// A base reward with streak and referral bonuses applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityReward {
    pub base: f64,
    pub streak_multiplier: f64,
    pub referral_bonus: f64,
    pub total: i64,
}

/// Read-only snapshot of one city's cumulative issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityMetric {
    pub city: String,
    pub ply_total: f64,
    pub crt_total: f64,
    pub submissions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub city: String,
    pub growth_rate: f64,
    pub current_ply: f64,
    pub current_crt: f64,
    pub projected_ply: f64,
    pub projected_crt: f64,
    pub submissions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStat {
    pub badge_id: String,
    pub earned_by: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeRarityEntry {
    pub badge_id: String,
    pub earned_by: u64,
    /// Fraction of all scans that earned this badge; lower is rarer
    pub rarity: f64,
}

/// Round half away from zero to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A scored submission as kept by the snapshot store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub city: String,
    pub material_id: String,
    pub weight_kg: f64,
    pub condition: String,
    pub amount: f64,
    pub valid: bool,
    /// Log file the submission was ingested from, if any
    pub source: Option<String>,
}
