// Core algorithm exports
pub mod classifier;
pub mod explainer;
pub mod filters;
pub mod matcher;
pub mod normalize;
pub mod predicate;
pub mod ranking;
pub mod scoring;

pub use classifier::{is_mutual_match, matches_seeker_preferences};
pub use explainer::{explain, is_near_match, summarize_blockers};
pub use filters::{default_pool_filter, AllOf, CandidatePoolFilter, OppositeGender, VisibleProfiles};
pub use matcher::{MatchResult, Matcher};
pub use predicate::satisfies;
pub use ranking::BoostPolicy;
pub use scoring::calculate_match_score;
