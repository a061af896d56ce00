//! The match engine: finds compatible rides for a freshly created ride,
//! scores them, persists pending matches and notifies both owners.
//!
//! Runs inline in the ride-creation request. Matching is best-effort
//! enrichment: the caller treats a failure here as non-fatal.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::constants::{
    CANDIDATE_WINDOW_MINUTES, CO2_KG_PER_KM, COST_PER_KM_INR, MATCH_EXPIRY_MINUTES,
    SHARED_SAVINGS_FACTOR,
};
use crate::db;
use crate::models::{
    Gender, GenderPreference, MatchConfidence, NewMatch, Ride, RideWithOwner, User,
};
use crate::services::notifications::PushService;

use super::geo::{distance_between_meters, time_difference_minutes};
use super::scoring::{
    calculate_match_score, classify_confidence, match_reasons, round2, MatchSignals,
    ScoreBreakdown, ScoringConfig,
};

#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error("Ride not found")]
    RideNotFound,
    #[error("Matching failed: {0}")]
    Store(anyhow::Error),
}

impl From<anyhow::Error> for MatchingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(err)
    }
}

/// Knobs for one matching run. Defaults mirror production tuning.
#[derive(Debug, Clone, Copy)]
pub struct MatchingParams {
    pub scoring: ScoringConfig,
    pub window_minutes: i64,
    pub expiry_minutes: i64,
}

impl Default for MatchingParams {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            window_minutes: CANDIDATE_WINDOW_MINUTES,
            expiry_minutes: MATCH_EXPIRY_MINUTES,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct MatchingOutcome {
    pub matches_found: usize,
    pub candidates_considered: usize,
    pub notification_failures: usize,
}

/// Everything derived for a candidate that survived the hard filters.
#[derive(Debug, Clone)]
pub struct CandidateEvaluation {
    pub breakdown: ScoreBreakdown,
    pub confidence: MatchConfidence,
    /// Rounded to whole meters.
    pub destination_distance_m: f64,
    /// Rounded to whole minutes.
    pub time_difference_min: f64,
    pub estimated_savings: f64,
    pub co2_reduction_kg: f64,
    pub reasons: Vec<String>,
}

/// Score one candidate against the source ride, applying the hard constraints.
///
/// Returns `None` when the candidate is filtered out: no free seat, destination
/// beyond the source owner's detour tolerance, gender constraint violated on
/// either side, or overall score below the admission threshold.
pub fn evaluate_candidate(
    source_ride: &Ride,
    source_owner: &User,
    candidate: &RideWithOwner,
    config: &ScoringConfig,
) -> Option<CandidateEvaluation> {
    if candidate.ride.available_seats <= 0 {
        return None;
    }

    let distance_m = distance_between_meters(
        source_ride.destination_lat,
        source_ride.destination_lng,
        candidate.ride.destination_lat,
        candidate.ride.destination_lng,
    );
    if distance_m > source_ride.max_detour_km * 1000.0 {
        return None;
    }

    let diff_min = time_difference_minutes(source_ride.departure_time, candidate.ride.departure_time);

    if !genders_compatible(
        source_ride.gender_preference,
        source_owner.gender,
        candidate.ride.gender_preference,
        candidate.owner.gender,
    ) {
        return None;
    }

    let breakdown = calculate_match_score(
        MatchSignals {
            destination_distance_m: distance_m,
            time_difference_min: diff_min,
            trust_score: candidate.owner.trust_score,
        },
        config.weights,
    );
    if breakdown.overall < config.thresholds.min_score {
        return None;
    }

    Some(CandidateEvaluation {
        breakdown,
        confidence: classify_confidence(breakdown.overall, config.thresholds),
        destination_distance_m: distance_m.round(),
        time_difference_min: diff_min.round(),
        estimated_savings: estimated_savings(source_ride.cost_per_person, distance_m),
        co2_reduction_kg: co2_reduction_kg(distance_m),
        reasons: match_reasons(&breakdown, distance_m, diff_min),
    })
}

/// Both directions are enforced independently: a constraint on either ride
/// rejects the pairing.
fn genders_compatible(
    source_pref: GenderPreference,
    source_gender: Gender,
    candidate_pref: GenderPreference,
    candidate_gender: Gender,
) -> bool {
    direction_ok(source_pref, source_gender, candidate_gender)
        && direction_ok(candidate_pref, candidate_gender, source_gender)
}

fn direction_ok(pref: GenderPreference, own: Gender, other: Gender) -> bool {
    match pref {
        GenderPreference::Any => true,
        GenderPreference::SameGender => own == other,
        GenderPreference::Male => other == Gender::Male,
        GenderPreference::Female => other == Gender::Female,
    }
}

/// Half the seat cost when the ride has one, otherwise half of a flat
/// per-km fare over the shared stretch.
fn estimated_savings(cost_per_person: Option<f64>, distance_m: f64) -> f64 {
    let base = match cost_per_person {
        Some(cost) => cost,
        None => (distance_m / 1000.0) * COST_PER_KM_INR,
    };
    round2(base * SHARED_SAVINGS_FACTOR)
}

fn co2_reduction_kg(distance_m: f64) -> f64 {
    round2((distance_m / 1000.0) * CO2_KG_PER_KM)
}

/// Find, score and record matches for `ride_id`.
///
/// A failure on one candidate is logged and skipped rather than aborting the
/// batch; notification failures are only counted. The returned outcome counts
/// newly created matches (re-running for the same ride is idempotent thanks to
/// the unique pairing index).
pub async fn run_matching(
    pool: &PgPool,
    push: &PushService,
    ride_id: Uuid,
    params: &MatchingParams,
) -> Result<MatchingOutcome, MatchingError> {
    let source = db::rides::find_ride_context(pool, ride_id)
        .await?
        .ok_or(MatchingError::RideNotFound)?;

    let window_start = source.ride.departure_time - Duration::minutes(params.window_minutes);
    let window_end = source.ride.departure_time + Duration::minutes(params.window_minutes);

    let candidates = db::rides::find_candidate_rides(
        pool,
        source.ride.building_id,
        source.ride.id,
        source.ride.user_id,
        window_start,
        window_end,
    )
    .await?;

    info!(
        "🔎 Matching ride {} at {}: {} candidate(s) within ±{}min",
        source.ride.id,
        source.building.name,
        candidates.len(),
        params.window_minutes
    );

    let mut outcome = MatchingOutcome::default();

    for candidate in &candidates {
        outcome.candidates_considered += 1;

        let Some(eval) = evaluate_candidate(&source.ride, &source.owner, candidate, &params.scoring)
        else {
            continue;
        };

        let new_match = build_match(
            &source.ride,
            candidate,
            &eval,
            Utc::now() + Duration::minutes(params.expiry_minutes),
        );

        match db::matches::create_match(pool, new_match).await {
            Ok(Some(created)) => {
                outcome.matches_found += 1;
                info!(
                    "🎯 Match {} for ride {}: target ride {}, score {} ({:?})",
                    created.id, source.ride.id, created.target_ride_id, created.score, created.confidence
                );
                outcome.notification_failures +=
                    push.notify_match_pair(&source, candidate, &created).await;
            }
            Ok(None) => {
                info!(
                    "↩️ Ride pair {} / {} already matched, skipping",
                    source.ride.id, candidate.ride.id
                );
            }
            Err(e) => {
                // One bad candidate must not starve the rest of the batch
                error!(
                    "❌ Failed to persist match for ride pair {} / {}: {}",
                    source.ride.id, candidate.ride.id, e
                );
            }
        }
    }

    Ok(outcome)
}

fn build_match(
    source_ride: &Ride,
    candidate: &RideWithOwner,
    eval: &CandidateEvaluation,
    expires_at: DateTime<Utc>,
) -> NewMatch {
    NewMatch {
        source_ride_id: source_ride.id,
        target_ride_id: candidate.ride.id,
        target_user_id: candidate.owner.id,
        score: eval.breakdown.overall,
        confidence: eval.confidence,
        destination_proximity: eval.breakdown.destination_proximity,
        time_alignment: eval.breakdown.time_alignment,
        trust_score: eval.breakdown.trust_score,
        previous_interactions: eval.breakdown.previous_interactions,
        destination_distance_m: eval.destination_distance_m,
        time_difference_min: eval.time_difference_min,
        estimated_savings: eval.estimated_savings,
        co2_reduction_kg: eval.co2_reduction_kg,
        reasons: eval.reasons.clone(),
        expires_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RideStatus;
    use chrono::TimeDelta;

    fn test_user(gender: Gender, trust_score: f64) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Resident".to_string(),
            gender,
            trust_score,
            building_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    fn test_ride(owner: &User, lat: f64, lng: f64, departure: DateTime<Utc>) -> Ride {
        let now = Utc::now();
        Ride {
            id: Uuid::new_v4(),
            user_id: owner.id,
            building_id: owner.building_id,
            destination_lat: lat,
            destination_lng: lng,
            departure_time: departure,
            gender_preference: GenderPreference::Any,
            max_detour_km: 2.0,
            cost_per_person: None,
            total_seats: 4,
            available_seats: 3,
            status: RideStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn candidate(owner: User, ride: Ride) -> RideWithOwner {
        RideWithOwner { ride, owner }
    }

    #[test]
    fn near_perfect_pairing_scores_high() {
        // Source at MG Road, candidate ~60m away departing 3 minutes later
        let departure = Utc::now() + TimeDelta::hours(1);
        let source_owner = test_user(Gender::Female, 4.0);
        let mut source_ride = test_ride(&source_owner, 12.9716, 77.5946, departure);
        source_ride.max_detour_km = 1.0;

        let cand_owner = test_user(Gender::Male, 4.5);
        let cand_ride = test_ride(&cand_owner, 12.9720, 77.5950, departure + TimeDelta::minutes(3));
        let cand = candidate(cand_owner, cand_ride);

        let eval = evaluate_candidate(&source_ride, &source_owner, &cand, &ScoringConfig::default())
            .expect("candidate should match");

        assert_eq!(eval.breakdown.destination_proximity, 1.0);
        assert_eq!(eval.breakdown.time_alignment, 1.0);
        assert_eq!(eval.breakdown.trust_score, 0.9);
        assert_eq!(eval.breakdown.overall, 0.95);
        assert_eq!(eval.confidence, MatchConfidence::High);
        assert_eq!(
            eval.reasons,
            vec![
                "destination_proximity",
                "time_match",
                "high_trust_score",
                "same_destination",
                "perfect_timing"
            ]
        );
        assert_eq!(eval.time_difference_min, 3.0);
        assert!((50.0..80.0).contains(&eval.destination_distance_m));
    }

    #[test]
    fn detour_cutoff_is_inclusive_at_the_limit() {
        let departure = Utc::now() + TimeDelta::hours(1);
        let source_owner = test_user(Gender::Female, 4.5);
        let mut source_ride = test_ride(&source_owner, 12.9716, 77.5946, departure);

        let cand_owner = test_user(Gender::Male, 4.5);
        // ~800m away: proximity 0.8, overall 0.8*0.4+1.0*0.3+0.9*0.2+0.07 = 0.87
        let cand_ride = test_ride(&cand_owner, 12.9788, 77.5946, departure);
        let distance_m = distance_between_meters(
            source_ride.destination_lat,
            source_ride.destination_lng,
            cand_ride.destination_lat,
            cand_ride.destination_lng,
        );
        let cand = candidate(cand_owner, cand_ride);

        // Exactly at the limit: included
        source_ride.max_detour_km = distance_m / 1000.0;
        assert!(
            evaluate_candidate(&source_ride, &source_owner, &cand, &ScoringConfig::default())
                .is_some()
        );

        // One meter short of the distance: excluded
        source_ride.max_detour_km = (distance_m - 1.0) / 1000.0;
        assert!(
            evaluate_candidate(&source_ride, &source_owner, &cand, &ScoringConfig::default())
                .is_none()
        );
    }

    #[test]
    fn same_gender_constraint_rejects_from_either_side() {
        let departure = Utc::now() + TimeDelta::hours(1);
        let source_owner = test_user(Gender::Female, 4.5);
        let cand_owner = test_user(Gender::Male, 4.5);

        // Constraint on the source side
        let mut source_ride = test_ride(&source_owner, 12.9716, 77.5946, departure);
        source_ride.gender_preference = GenderPreference::SameGender;
        let cand_ride = test_ride(&cand_owner, 12.9718, 77.5948, departure);
        let cand = candidate(cand_owner.clone(), cand_ride.clone());
        assert!(
            evaluate_candidate(&source_ride, &source_owner, &cand, &ScoringConfig::default())
                .is_none()
        );

        // Constraint on the candidate side only
        source_ride.gender_preference = GenderPreference::Any;
        let mut strict_cand_ride = cand_ride;
        strict_cand_ride.gender_preference = GenderPreference::SameGender;
        let strict_cand = candidate(cand_owner, strict_cand_ride);
        assert!(
            evaluate_candidate(&source_ride, &source_owner, &strict_cand, &ScoringConfig::default())
                .is_none()
        );

        // Same genders satisfy the constraint
        let peer_owner = test_user(Gender::Female, 4.5);
        let mut peer_ride = test_ride(&peer_owner, 12.9718, 77.5948, departure);
        peer_ride.gender_preference = GenderPreference::SameGender;
        let peer = candidate(peer_owner, peer_ride);
        source_ride.gender_preference = GenderPreference::SameGender;
        assert!(
            evaluate_candidate(&source_ride, &source_owner, &peer, &ScoringConfig::default())
                .is_some()
        );
    }

    #[test]
    fn named_gender_preference_must_match_counterpart() {
        let departure = Utc::now() + TimeDelta::hours(1);
        let source_owner = test_user(Gender::Female, 4.5);
        let mut source_ride = test_ride(&source_owner, 12.9716, 77.5946, departure);
        source_ride.gender_preference = GenderPreference::Female;

        let cand_owner = test_user(Gender::Male, 4.5);
        let cand_ride = test_ride(&cand_owner, 12.9718, 77.5948, departure);
        let cand = candidate(cand_owner, cand_ride);
        assert!(
            evaluate_candidate(&source_ride, &source_owner, &cand, &ScoringConfig::default())
                .is_none()
        );

        let peer_owner = test_user(Gender::Female, 4.5);
        let peer_ride = test_ride(&peer_owner, 12.9718, 77.5948, departure);
        let peer = candidate(peer_owner, peer_ride);
        assert!(
            evaluate_candidate(&source_ride, &source_owner, &peer, &ScoringConfig::default())
                .is_some()
        );
    }

    #[test]
    fn admission_threshold_at_exactly_sixty() {
        let departure = Utc::now() + TimeDelta::hours(1);
        let source_owner = test_user(Gender::Female, 4.5);
        let mut source_ride = test_ride(&source_owner, 12.9716, 77.5946, departure);
        source_ride.max_detour_km = 5.0;

        // ~2.5km away (proximity 0.4), 20min apart (time 0.7):
        // overall = 0.16 + 0.21 + trust*0.2 + 0.07
        let far_lat = 12.9716 + 0.0225;
        let make_candidate = |trust: f64| {
            let owner = test_user(Gender::Male, trust);
            let ride = test_ride(&owner, far_lat, 77.5946, departure + TimeDelta::minutes(20));
            candidate(owner, ride)
        };

        // trust 4.0 -> 0.8 component -> overall 0.60: admitted
        let at_threshold = make_candidate(4.0);
        let eval =
            evaluate_candidate(&source_ride, &source_owner, &at_threshold, &ScoringConfig::default())
                .expect("0.60 is admitted");
        assert_eq!(eval.breakdown.overall, 0.60);
        assert_eq!(eval.confidence, MatchConfidence::Low);

        // trust 3.75 -> 0.75 component -> overall 0.59: rejected
        let below_threshold = make_candidate(3.75);
        assert!(
            evaluate_candidate(&source_ride, &source_owner, &below_threshold, &ScoringConfig::default())
                .is_none()
        );
    }

    #[test]
    fn full_ride_is_never_a_candidate() {
        let departure = Utc::now() + TimeDelta::hours(1);
        let source_owner = test_user(Gender::Female, 4.5);
        let source_ride = test_ride(&source_owner, 12.9716, 77.5946, departure);

        let cand_owner = test_user(Gender::Male, 4.5);
        let mut cand_ride = test_ride(&cand_owner, 12.9718, 77.5948, departure);
        cand_ride.available_seats = 0;
        let cand = candidate(cand_owner, cand_ride);

        assert!(
            evaluate_candidate(&source_ride, &source_owner, &cand, &ScoringConfig::default())
                .is_none()
        );
    }

    #[test]
    fn savings_halve_the_seat_cost_when_present() {
        assert_eq!(estimated_savings(Some(100.0), 1500.0), 50.0);
    }

    #[test]
    fn savings_fall_back_to_flat_per_km_fare() {
        // 1.5km * 12/km = 18, halved = 9
        assert_eq!(estimated_savings(None, 1500.0), 9.0);
    }

    #[test]
    fn co2_scales_with_shared_distance() {
        // 1.5km * 0.21 = 0.315 -> 0.32 rounded
        assert_eq!(co2_reduction_kg(1500.0), 0.32);
    }
}
