// Model exports
pub mod attribute;
pub mod domain;
pub mod preference;
pub mod record;
pub mod requests;
pub mod responses;

pub use attribute::{Attribute, AttributeKind, NumericScale, UnknownAttribute};
pub use domain::{
    ApprovalStatus, AttributeValue, BlockerCount, BoostActivation, BoostKind, DeclinedProfile,
    Direction, FailedCriterion, FailedDirection, InteractionHistory, InterestStatus, MatchRecord,
    MatchScore, MatchStatus, NearMatch, Profile, RankedCandidate, ScoringWeights,
};
pub use preference::{Preference, PreferenceEntry, PreferenceError, PreferenceSet};
pub use record::{ProfileError, ProfileRecord, RawValue};
pub use requests::{
    ExplainRequest, FindMatchesRequest, InterestAction, InterestRequest, RankRequest,
    UpdatePreferenceRequest,
};
pub use responses::{
    ErrorResponse, ExplainResponse, FindMatchesResponse, HealthResponse, InterestResponse,
    PreferenceResponse,
};
