//! Swipe Match - swipe ledger and match engine for a swipe-to-match dating app
//!
//! Users swipe left or right on each other's profiles; a mutual right
//! swipe becomes a match. The engine is storage-agnostic and runs
//! against PostgreSQL in production or an in-memory store in tests.

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{CandidateSelector, MatchEngine, RatioCalculator, Ratios, SwipeError};
pub use models::{
    LedgerSnapshot, Profile, ProfileCard, Swipe, SwipeDirection, SwipeOutcome, UserId, UserPair,
};
pub use services::{MemoryStore, PostgresStore, StoreError, SwipeStore};
