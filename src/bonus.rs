//! Streak and referral bonuses

use crate::models::{ActivityReward, UserActivityContext};

/// Tokens credited per successful referral
pub const REFERRAL_BONUS_PER_USER: f64 = 10.0;

/// Streak tiers, highest threshold first: (minimum days, multiplier)
const STREAK_TIERS: [(u32, f64); 3] = [(30, 2.0), (14, 1.5), (7, 1.25)];

/// Multiplier earned by a run of consecutive active days.
pub fn streak_multiplier(days: u32) -> f64 {
    STREAK_TIERS
        .iter()
        .find(|(min_days, _)| days >= *min_days)
        .map_or(1.0, |(_, multiplier)| *multiplier)
}

/// Flat additive bonus for referrals.
pub fn referral_bonus(count: u32) -> f64 {
    f64::from(count) * REFERRAL_BONUS_PER_USER
}

/// Base reward with the streak applied multiplicatively, then the
/// referral bonus added on top, rounded to a whole token.
pub fn combined_reward(base_ply: f64, streak_days: u32, referrals: u32) -> i64 {
    (base_ply * streak_multiplier(streak_days) + referral_bonus(referrals)).round() as i64
}

impl UserActivityContext {
    pub fn apply(&self, base_ply: f64) -> ActivityReward {
        ActivityReward {
            base: base_ply,
            streak_multiplier: streak_multiplier(self.streak_days),
            referral_bonus: referral_bonus(self.referrals),
            total: combined_reward(base_ply, self.streak_days, self.referrals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_boundaries() {
        assert_eq!(streak_multiplier(0), 1.0);
        assert_eq!(streak_multiplier(6), 1.0);
        assert_eq!(streak_multiplier(7), 1.25);
        assert_eq!(streak_multiplier(13), 1.25);
        assert_eq!(streak_multiplier(14), 1.5);
        assert_eq!(streak_multiplier(29), 1.5);
        assert_eq!(streak_multiplier(30), 2.0);
        assert_eq!(streak_multiplier(365), 2.0);
    }

    #[test]
    fn referral_bonus_is_linear() {
        assert_eq!(referral_bonus(0), 0.0);
        assert_eq!(referral_bonus(1), 10.0);
        assert_eq!(referral_bonus(7), 70.0);
    }

    #[test]
    fn referral_is_added_after_streak() {
        assert_eq!(combined_reward(100.0, 30, 2), 220);
        // 100 * 1.25 + 10, not (100 + 10) * 1.25
        assert_eq!(combined_reward(100.0, 7, 1), 135);
        assert_eq!(combined_reward(0.0, 30, 3), 30);
    }

    #[test]
    fn combined_reward_rounds_to_whole_tokens() {
        assert_eq!(combined_reward(0.5, 0, 0), 1);
        assert_eq!(combined_reward(0.4, 0, 0), 0);
        assert_eq!(combined_reward(75.0, 14, 0), 113);
    }

    #[test]
    fn activity_context_reports_each_component() {
        let ctx = UserActivityContext {
            streak_days: 14,
            referrals: 3,
        };
        let reward = ctx.apply(40.0);
        assert_eq!(reward.streak_multiplier, 1.5);
        assert_eq!(reward.referral_bonus, 30.0);
        assert_eq!(reward.total, 90);
    }
}
