// =============================================================================
// ShareTaxi Backend Constants
// =============================================================================
// This file contains all constants used throughout the backend to enable
// easy tuning and configuration from a single location.

// =============================================================================
// MATCH SCORING WEIGHTS
// =============================================================================

/// Weight of destination proximity in the overall match score
pub const WEIGHT_DESTINATION_PROXIMITY: f64 = 0.40;

/// Weight of departure-time alignment in the overall match score
pub const WEIGHT_TIME_ALIGNMENT: f64 = 0.30;

/// Weight of the candidate owner's trust score in the overall match score
pub const WEIGHT_TRUST_SCORE: f64 = 0.20;

/// Weight of previous-interaction affinity in the overall match score
pub const WEIGHT_PREVIOUS_INTERACTIONS: f64 = 0.10;

/// Interaction history is not computed yet; every pair gets this flat score
pub const PREVIOUS_INTERACTIONS_PLACEHOLDER: f64 = 0.7;

// =============================================================================
// SCORE THRESHOLDS
// =============================================================================

/// Minimum overall score for a candidate to produce a match
pub const MIN_MATCH_SCORE: f64 = 0.60;

/// Overall score at or above this is HIGH confidence
pub const HIGH_CONFIDENCE_SCORE: f64 = 0.85;

/// Overall score at or above this (and below HIGH) is MEDIUM confidence
pub const MEDIUM_CONFIDENCE_SCORE: f64 = 0.70;

// =============================================================================
// PROXIMITY BREAKPOINTS (meters)
// =============================================================================

/// Destinations within this distance score 1.0
pub const PROXIMITY_TIER_1_M: f64 = 500.0;

/// Destinations within this distance score 0.8
pub const PROXIMITY_TIER_2_M: f64 = 1000.0;

/// Destinations within this distance score 0.6; anything farther scores 0.4
pub const PROXIMITY_TIER_3_M: f64 = 2000.0;

// =============================================================================
// TIME ALIGNMENT BREAKPOINTS (minutes)
// =============================================================================

/// Departures within this many minutes score 1.0
pub const TIME_TIER_1_MIN: f64 = 5.0;

/// Departures within this many minutes score 0.9
pub const TIME_TIER_2_MIN: f64 = 15.0;

/// Departures within this many minutes score 0.7; anything later scores 0.5
pub const TIME_TIER_3_MIN: f64 = 30.0;

// =============================================================================
// MATCH REASON TAG THRESHOLDS
// =============================================================================

/// Proximity component above this tags `destination_proximity`
pub const REASON_PROXIMITY_SCORE: f64 = 0.8;

/// Time component above this tags `time_match`
pub const REASON_TIME_SCORE: f64 = 0.8;

/// Trust component above this tags `high_trust_score`
pub const REASON_TRUST_SCORE: f64 = 0.85;

/// Destination distance below this (meters) tags `same_destination`
pub const REASON_SAME_DESTINATION_M: f64 = 500.0;

/// Time difference below this (minutes) tags `perfect_timing`
pub const REASON_PERFECT_TIMING_MIN: f64 = 5.0;

// =============================================================================
// MATCH LIFECYCLE
// =============================================================================

/// Candidate rides must depart within this many minutes of the source ride
pub const CANDIDATE_WINDOW_MINUTES: i64 = 30;

/// A match expires this many minutes after creation; expires_at is never extended
pub const MATCH_EXPIRY_MINUTES: i64 = 15;

// =============================================================================
// TRUST SCORE
// =============================================================================

/// Trust scores are stored on a 0-5 scale; the scorer normalizes against this
pub const TRUST_SCORE_MAX: f64 = 5.0;

/// Default trust score for freshly registered users
pub const DEFAULT_TRUST_SCORE: f64 = 3.0;

// =============================================================================
// SAVINGS & EMISSIONS
// =============================================================================

/// Flat per-km fare used to estimate savings when a ride has no cost set (INR)
pub const COST_PER_KM_INR: f64 = 12.0;

/// Fraction of the fare saved by sharing
pub const SHARED_SAVINGS_FACTOR: f64 = 0.5;

/// CO2 saved per shared kilometer (kg)
pub const CO2_KG_PER_KM: f64 = 0.21;

// =============================================================================
// RIDES
// =============================================================================

/// Default seat count for a newly created ride
pub const DEFAULT_TOTAL_SEATS: i32 = 4;

/// Default maximum detour a ride owner tolerates in a matched candidate (km)
pub const DEFAULT_MAX_DETOUR_KM: f64 = 2.0;

// =============================================================================
// PUSH NOTIFICATIONS
// =============================================================================

/// Maximum push sends per user per window
pub const PUSH_RATE_LIMIT_PER_MINUTE: u32 = 30;

/// Push rate limit window duration in seconds
pub const PUSH_RATE_LIMIT_WINDOW_SECONDS: u64 = 60;

// =============================================================================
// DATABASE CONFIGURATION
// =============================================================================

/// Default maximum pool connections
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Connections kept warm so inline matching never pays connection setup
pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 2;

/// Upper bound on waiting for a pool connection (seconds); matching runs
/// inside the ride-creation request and must not block unbounded
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECONDS: u32 = 5;

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;
