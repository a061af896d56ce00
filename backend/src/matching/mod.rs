pub mod engine;
pub mod geo;
pub mod scoring;

pub use engine::{run_matching, MatchingError, MatchingOutcome, MatchingParams};
pub use scoring::{MatchWeights, ScoreThresholds, ScoringConfig};
