use crate::models::{domain::InteractionHistory, record::ProfileRecord};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find matches for a stored profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default = "default_true")]
    #[serde(alias = "include_near_matches", rename = "includeNearMatches")]
    pub include_near_matches: bool,
}

fn default_true() -> bool {
    true
}

/// Stateless ranking: everything the matcher needs is supplied inline
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankRequest {
    pub seeker: ProfileRecord,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub candidates: Vec<ProfileRecord>,
    #[serde(default)]
    pub history: InteractionHistory,
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(default)]
    pub offset: Option<u32>,
}

/// Explain why a stored pair is or isn't a full match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExplainRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "candidate_user_id", rename = "candidateUserId")]
    pub candidate_user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestAction {
    /// Express interest in the target
    Send,
    /// Accept the target's pending interest
    Accept,
    /// Reject the target's pending interest
    Reject,
    /// Pass on the target without any interest involved
    Decline,
}

/// Record an interaction between two users
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InterestRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
    pub action: InterestAction,
}

/// Update one attribute preference.
///
/// Numeric attributes take `min`/`max`; everything else takes `preference`.
/// Omitting `isDealbreaker` keeps the current flag.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePreferenceRequest {
    #[validate(length(min = 1, max = 64))]
    pub attribute: String,
    #[validate(length(max = 1024))]
    #[serde(default)]
    pub preference: Option<String>,
    #[serde(default)]
    pub min: Option<String>,
    #[serde(default)]
    pub max: Option<String>,
    #[serde(default)]
    #[serde(alias = "is_dealbreaker", rename = "isDealbreaker")]
    pub is_dealbreaker: Option<bool>,
}
