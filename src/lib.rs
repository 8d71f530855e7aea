//! Matrimony Match - compatibility engine for a matrimonial profile service
//!
//! Decides whether two profiles satisfy each other's deal-breaker
//! preferences, scores how well a candidate fits a seeker, explains near
//! misses and orders candidate lists with boost and reciprocity tiers.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, explain, is_mutual_match, matches_seeker_preferences, MatchResult, Matcher};
pub use models::{
    Attribute, FindMatchesResponse, InteractionHistory, NearMatch, Preference, PreferenceSet,
    Profile, ProfileRecord, RankedCandidate, ScoringWeights,
};
