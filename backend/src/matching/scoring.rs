//! Weighted multi-factor match scoring.
//!
//! Component scores are step functions over fixed breakpoints, not continuous
//! decay; the breakpoints and weights are part of the product contract and
//! tests pin them exactly. Weights and thresholds are plain values handed in
//! by the caller so the functions stay pure.

use crate::constants::*;
use crate::models::MatchConfidence;

/// Weights of the four scoring components. Must sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct MatchWeights {
    pub destination_proximity: f64,
    pub time_alignment: f64,
    pub trust_score: f64,
    pub previous_interactions: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            destination_proximity: WEIGHT_DESTINATION_PROXIMITY,
            time_alignment: WEIGHT_TIME_ALIGNMENT,
            trust_score: WEIGHT_TRUST_SCORE,
            previous_interactions: WEIGHT_PREVIOUS_INTERACTIONS,
        }
    }
}

/// Admission and confidence-tier cutoffs over the rounded overall score.
#[derive(Debug, Clone, Copy)]
pub struct ScoreThresholds {
    pub min_score: f64,
    pub high_confidence: f64,
    pub medium_confidence: f64,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            min_score: MIN_MATCH_SCORE,
            high_confidence: HIGH_CONFIDENCE_SCORE,
            medium_confidence: MEDIUM_CONFIDENCE_SCORE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringConfig {
    pub weights: MatchWeights,
    pub thresholds: ScoreThresholds,
}

/// Raw signals for one source/candidate pairing.
#[derive(Debug, Clone, Copy)]
pub struct MatchSignals {
    pub destination_distance_m: f64,
    pub time_difference_min: f64,
    /// Candidate owner's trust score on the 0-5 scale.
    pub trust_score: f64,
}

/// Component scores plus the weighted overall, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub destination_proximity: f64,
    pub time_alignment: f64,
    pub trust_score: f64,
    pub previous_interactions: f64,
    /// Weighted sum, rounded to 2 decimals.
    pub overall: f64,
}

pub fn proximity_score(distance_m: f64) -> f64 {
    if distance_m <= PROXIMITY_TIER_1_M {
        1.0
    } else if distance_m <= PROXIMITY_TIER_2_M {
        0.8
    } else if distance_m <= PROXIMITY_TIER_3_M {
        0.6
    } else {
        0.4
    }
}

pub fn time_alignment_score(diff_min: f64) -> f64 {
    if diff_min <= TIME_TIER_1_MIN {
        1.0
    } else if diff_min <= TIME_TIER_2_MIN {
        0.9
    } else if diff_min <= TIME_TIER_3_MIN {
        0.7
    } else {
        0.5
    }
}

pub fn trust_component(trust_score: f64) -> f64 {
    (trust_score / TRUST_SCORE_MAX).clamp(0.0, 1.0)
}

pub fn calculate_match_score(signals: MatchSignals, weights: MatchWeights) -> ScoreBreakdown {
    let destination_proximity = proximity_score(signals.destination_distance_m);
    let time_alignment = time_alignment_score(signals.time_difference_min);
    let trust_score = trust_component(signals.trust_score);
    let previous_interactions = PREVIOUS_INTERACTIONS_PLACEHOLDER;

    let overall = destination_proximity * weights.destination_proximity
        + time_alignment * weights.time_alignment
        + trust_score * weights.trust_score
        + previous_interactions * weights.previous_interactions;

    ScoreBreakdown {
        destination_proximity,
        time_alignment,
        trust_score,
        previous_interactions,
        overall: round2(overall),
    }
}

pub fn classify_confidence(overall: f64, thresholds: ScoreThresholds) -> MatchConfidence {
    if overall >= thresholds.high_confidence {
        MatchConfidence::High
    } else if overall >= thresholds.medium_confidence {
        MatchConfidence::Medium
    } else {
        MatchConfidence::Low
    }
}

/// Human-readable tags explaining why a pairing scored well.
pub fn match_reasons(breakdown: &ScoreBreakdown, distance_m: f64, diff_min: f64) -> Vec<String> {
    let mut reasons = Vec::new();
    if breakdown.destination_proximity > REASON_PROXIMITY_SCORE {
        reasons.push("destination_proximity".to_string());
    }
    if breakdown.time_alignment > REASON_TIME_SCORE {
        reasons.push("time_match".to_string());
    }
    if breakdown.trust_score > REASON_TRUST_SCORE {
        reasons.push("high_trust_score".to_string());
    }
    if distance_m < REASON_SAME_DESTINATION_M {
        reasons.push("same_destination".to_string());
    }
    if diff_min < REASON_PERFECT_TIMING_MIN {
        reasons.push("perfect_timing".to_string());
    }
    reasons
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(distance_m: f64, diff_min: f64, trust: f64) -> MatchSignals {
        MatchSignals {
            destination_distance_m: distance_m,
            time_difference_min: diff_min,
            trust_score: trust,
        }
    }

    #[test]
    fn default_weights_sum_to_one() {
        let w = MatchWeights::default();
        let sum = w.destination_proximity + w.time_alignment + w.trust_score + w.previous_interactions;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn proximity_steps_at_exact_breakpoints() {
        assert_eq!(proximity_score(0.0), 1.0);
        assert_eq!(proximity_score(499.0), 1.0);
        assert_eq!(proximity_score(500.0), 1.0);
        assert_eq!(proximity_score(501.0), 0.8);
        assert_eq!(proximity_score(1000.0), 0.8);
        assert_eq!(proximity_score(1001.0), 0.6);
        assert_eq!(proximity_score(2000.0), 0.6);
        assert_eq!(proximity_score(2001.0), 0.4);
    }

    #[test]
    fn time_alignment_steps_at_exact_breakpoints() {
        assert_eq!(time_alignment_score(0.0), 1.0);
        assert_eq!(time_alignment_score(5.0), 1.0);
        assert_eq!(time_alignment_score(5.1), 0.9);
        assert_eq!(time_alignment_score(15.0), 0.9);
        assert_eq!(time_alignment_score(15.1), 0.7);
        assert_eq!(time_alignment_score(30.0), 0.7);
        assert_eq!(time_alignment_score(30.1), 0.5);
    }

    #[test]
    fn trust_normalizes_against_five_and_clamps() {
        assert_eq!(trust_component(4.5), 0.9);
        assert_eq!(trust_component(5.0), 1.0);
        assert_eq!(trust_component(0.0), 0.0);
        assert_eq!(trust_component(6.0), 1.0);
        assert_eq!(trust_component(-1.0), 0.0);
    }

    #[test]
    fn overall_is_exact_weighted_sum() {
        // proximity 0.8, time 0.9, trust 0.8, interactions 0.7
        // 0.8*0.4 + 0.9*0.3 + 0.8*0.2 + 0.7*0.1 = 0.82
        let breakdown = calculate_match_score(signals(800.0, 10.0, 4.0), MatchWeights::default());
        assert_eq!(breakdown.destination_proximity, 0.8);
        assert_eq!(breakdown.time_alignment, 0.9);
        assert_eq!(breakdown.trust_score, 0.8);
        assert_eq!(breakdown.previous_interactions, 0.7);
        assert_eq!(breakdown.overall, 0.82);
    }

    #[test]
    fn confidence_tier_boundaries() {
        let t = ScoreThresholds::default();
        assert_eq!(classify_confidence(0.85, t), MatchConfidence::High);
        assert_eq!(classify_confidence(0.849999, t), MatchConfidence::Medium);
        assert_eq!(classify_confidence(0.70, t), MatchConfidence::Medium);
        assert_eq!(classify_confidence(0.69999, t), MatchConfidence::Low);
        assert_eq!(classify_confidence(1.0, t), MatchConfidence::High);
    }

    #[test]
    fn reasons_for_a_near_perfect_pairing() {
        let breakdown = calculate_match_score(signals(60.0, 3.0, 4.5), MatchWeights::default());
        let reasons = match_reasons(&breakdown, 60.0, 3.0);
        assert_eq!(
            reasons,
            vec![
                "destination_proximity",
                "time_match",
                "high_trust_score",
                "same_destination",
                "perfect_timing"
            ]
        );
    }

    #[test]
    fn reasons_empty_for_a_marginal_pairing() {
        let breakdown = calculate_match_score(signals(2500.0, 25.0, 3.0), MatchWeights::default());
        assert!(match_reasons(&breakdown, 2500.0, 25.0).is_empty());
    }

    #[test]
    fn rounding_is_two_decimals() {
        assert_eq!(round2(0.8150001), 0.82);
        assert_eq!(round2(0.3149999), 0.31);
        assert_eq!(round2(0.956), 0.96);
    }
}
