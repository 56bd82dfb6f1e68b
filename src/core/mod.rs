// Core swipe/match exports
pub mod engine;
pub mod ratios;
pub mod selector;

pub use engine::{MatchEngine, SwipeError};
pub use ratios::{acceptance_ratio, rounded_percentage, swipe_ratio, RatioCalculator, Ratios};
pub use selector::{exclude_decided, CandidateSelector};
