use crate::models::domain::{BlockerCount, BoostActivation, InterestStatus, NearMatch, RankedCandidate};
use crate::models::preference::PreferenceEntry;
use serde::{Deserialize, Serialize};

/// Response for find and rank endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesResponse {
    pub matches: Vec<RankedCandidate>,
    pub mutual_matches: Vec<RankedCandidate>,
    pub near_matches: Vec<RankedCandidate>,
    pub blockers: Vec<BlockerCount>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub boost_activations: Vec<BoostActivation>,
    pub total_candidates: usize,
    pub execution_time_ms: u64,
}

/// Response for the explain endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainResponse {
    pub is_mutual_match: bool,
    pub interest_status: InterestStatus,
    #[serde(flatten)]
    pub explanation: NearMatch,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Interaction write response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestResponse {
    pub success: bool,
    pub interest_status: InterestStatus,
}

/// Preference write response, echoing the stored entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceResponse {
    pub user_id: String,
    pub attribute: String,
    /// `None` when the attribute was reset to "doesn't matter"
    pub entry: Option<PreferenceEntry>,
}
