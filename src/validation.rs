//! Trust heuristic for scans reported by IoT collection points
//!
//! The constants are a fixed scoring heuristic, not a calibrated model.
//! Confidence is tracked in whole percentage points so that threshold
//! comparisons are exact.

use tracing::debug;

use crate::models::{DeviceReading, ValidationVerdict};

const BASE_CONFIDENCE_PCT: i32 = 80;
const CONTAMINATION_PENALTY_PCT: i32 = 20;
const IMAGE_EVIDENCE_BONUS_PCT: i32 = 10;
const MISSING_WEIGHT_PENALTY_PCT: i32 = 30;
const MIN_CONFIDENCE_PCT: i32 = 10;
const MAX_CONFIDENCE_PCT: i32 = 100;
const VALID_ABOVE_PCT: i32 = 70;

/// Contamination above this is penalised
pub const CONTAMINATION_THRESHOLD: f64 = 0.5;

pub fn validate_reading(reading: &DeviceReading) -> ValidationVerdict {
    let mut pct = BASE_CONFIDENCE_PCT;

    if reading.contamination_score > CONTAMINATION_THRESHOLD {
        pct -= CONTAMINATION_PENALTY_PCT;
    }
    if reading.has_image_evidence {
        pct += IMAGE_EVIDENCE_BONUS_PCT;
    }
    if reading.weight_kg <= 0.0 {
        pct -= MISSING_WEIGHT_PENALTY_PCT;
    }

    let pct = pct.clamp(MIN_CONFIDENCE_PCT, MAX_CONFIDENCE_PCT);
    let verdict = ValidationVerdict {
        confidence: f64::from(pct) / 100.0,
        valid: pct > VALID_ABOVE_PCT,
    };

    debug!(
        device = %reading.device_id,
        confidence = verdict.confidence,
        valid = verdict.valid,
        "validated device reading"
    );
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(weight_kg: f64, contamination_score: f64, has_image_evidence: bool) -> DeviceReading {
        DeviceReading {
            device_id: "bin-001".to_string(),
            weight_kg,
            contamination_score,
            has_image_evidence,
        }
    }

    #[test]
    fn clean_reading_is_valid() {
        let v = validate_reading(&reading(1.0, 0.1, false));
        assert_eq!(v.confidence, 0.8);
        assert!(v.valid);
    }

    #[test]
    fn image_evidence_raises_confidence() {
        let v = validate_reading(&reading(1.0, 0.0, true));
        assert_eq!(v.confidence, 0.9);
        assert!(v.valid);
    }

    #[test]
    fn contamination_penalty_fails_even_with_image() {
        let v = validate_reading(&reading(1.0, 0.8, true));
        assert_eq!(v.confidence, 0.7);
        assert!(!v.valid);
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(validate_reading(&reading(1.0, 0.5, false)).valid);
        assert!(!validate_reading(&reading(1.0, 0.51, false)).valid);
    }

    #[test]
    fn confidence_is_clamped_at_floor() {
        let v = validate_reading(&reading(0.0, 0.9, false));
        // 0.8 - 0.2 - 0.3 = 0.3
        assert_eq!(v.confidence, 0.3);
        assert!(!v.valid);

        let v = validate_reading(&reading(-1.0, 1.0, false));
        assert!(v.confidence >= 0.1);
    }
}
