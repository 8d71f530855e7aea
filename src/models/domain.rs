use crate::core::normalize::age_on;
use crate::models::attribute::{Attribute, UnknownAttribute};
use crate::models::preference::PreferenceSet;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Moderation state of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Matrimonial profile, the unit being matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub gender: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Fallback when no date of birth is on record
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub referral_count: u32,
    #[serde(default)]
    pub referral_boost_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub engagement_boost_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attributes: BTreeMap<Attribute, String>,
    #[serde(default)]
    pub preferences: PreferenceSet,
}

fn default_true() -> bool { true }

/// A profile's value for one attribute, as seen by the predicate evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
}

impl<'a> AttributeValue<'a> {
    pub fn is_missing(&self) -> bool {
        matches!(self, AttributeValue::Missing)
    }

    /// Display form for explanations
    pub fn describe(&self) -> String {
        match self {
            AttributeValue::Text(s) => s.to_string(),
            AttributeValue::Number(n) => format!("{}", n),
            AttributeValue::Missing => "Not specified".to_string(),
        }
    }
}

impl Profile {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            gender: gender.into(),
            date_of_birth: None,
            age: None,
            approval_status: ApprovalStatus::Approved,
            is_active: true,
            is_suspended: false,
            referral_count: 0,
            referral_boost_start: None,
            engagement_boost_start: None,
            attributes: BTreeMap::new(),
            preferences: PreferenceSet::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.attributes.insert(attribute, value.into());
        self
    }

    pub fn with_preferences(mut self, preferences: PreferenceSet) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = Some(date_of_birth);
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Age on the given day, from date of birth when known
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.date_of_birth
            .and_then(|dob| age_on(dob, today))
            .or(self.age)
    }

    /// Value of an attribute for predicate evaluation
    pub fn attribute_value(&self, attribute: Attribute, today: NaiveDate) -> AttributeValue<'_> {
        if attribute == Attribute::Age {
            return match self.age_on(today) {
                Some(age) => AttributeValue::Number(age as f64),
                None => AttributeValue::Missing,
            };
        }
        match self.attributes.get(&attribute) {
            Some(v) if !v.trim().is_empty() => AttributeValue::Text(v.as_str()),
            _ => AttributeValue::Missing,
        }
    }

    /// Visible to other users: approved, active and not suspended
    pub fn is_visible(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved && self.is_active && !self.is_suspended
    }
}

/// State of an expressed interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Directed interest edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub sender_id: String,
    pub receiver_id: String,
    pub status: MatchStatus,
}

/// Directed "pass" edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclinedProfile {
    pub user_id: String,
    pub declined_user_id: String,
}

/// Relationship between the seeker and one candidate, from the seeker's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestStatus {
    None,
    /// Seeker expressed interest, awaiting an answer
    Sent,
    /// Candidate expressed interest first, awaiting the seeker
    Received,
    Mutual,
    /// Seeker passed on the candidate
    Declined,
    /// Candidate passed on the seeker or rejected the seeker's interest
    DeclinedYou,
    /// Seeker rejected the candidate's interest
    Rejected,
}

/// Interest and decline records touching the seeker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionHistory {
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
    #[serde(default)]
    pub declines: Vec<DeclinedProfile>,
}

impl InteractionHistory {
    pub fn new(matches: Vec<MatchRecord>, declines: Vec<DeclinedProfile>) -> Self {
        Self { matches, declines }
    }

    /// Collapse every record between two users into a single status.
    ///
    /// Precedence: mutual, then declines, then rejections, then pending
    /// interest in either direction.
    pub fn status_between(&self, seeker_user_id: &str, candidate_user_id: &str) -> InterestStatus {
        let between = |m: &&MatchRecord| {
            (m.sender_id == seeker_user_id && m.receiver_id == candidate_user_id)
                || (m.sender_id == candidate_user_id && m.receiver_id == seeker_user_id)
        };

        if self
            .matches
            .iter()
            .filter(between)
            .any(|m| m.status == MatchStatus::Accepted)
        {
            return InterestStatus::Mutual;
        }

        if self
            .declines
            .iter()
            .any(|d| d.user_id == seeker_user_id && d.declined_user_id == candidate_user_id)
        {
            return InterestStatus::Declined;
        }

        let declined_me = self
            .declines
            .iter()
            .any(|d| d.user_id == candidate_user_id && d.declined_user_id == seeker_user_id);
        let sent = self
            .matches
            .iter()
            .find(|m| m.sender_id == seeker_user_id && m.receiver_id == candidate_user_id);
        let received = self
            .matches
            .iter()
            .find(|m| m.sender_id == candidate_user_id && m.receiver_id == seeker_user_id);

        if declined_me || matches!(sent, Some(m) if m.status == MatchStatus::Rejected) {
            return InterestStatus::DeclinedYou;
        }
        if matches!(received, Some(m) if m.status == MatchStatus::Rejected) {
            return InterestStatus::Rejected;
        }
        if sent.is_some() {
            return InterestStatus::Sent;
        }
        if received.is_some() {
            return InterestStatus::Received;
        }
        InterestStatus::None
    }
}

/// Per-attribute score weights, in points
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    weights: BTreeMap<Attribute, f64>,
}

impl ScoringWeights {
    pub fn get(&self, attribute: Attribute) -> f64 {
        self.weights.get(&attribute).copied().unwrap_or(0.0)
    }

    /// Sum of all weights; the score's `max_score`
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Replace individual weights, keyed by attribute name.
    ///
    /// Negative weights are clamped to zero.
    pub fn with_overrides(mut self, overrides: &HashMap<String, f64>) -> Result<Self, UnknownAttribute> {
        for (name, weight) in overrides {
            let attribute: Attribute = name.parse()?;
            self.weights.insert(attribute, weight.max(0.0));
        }
        Ok(self)
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            weights: Attribute::ALL
                .iter()
                .map(|a| (*a, a.default_weight()))
                .collect(),
        }
    }
}

/// Weighted compatibility of a candidate against a seeker's preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub percentage: u8,
    pub total_score: f64,
    pub max_score: f64,
}

/// Whose preferences are being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Seeker's preferences against the candidate's values
    Seeker,
    /// Candidate's preferences against the seeker's values
    Candidate,
}

/// Which side's preferences rejected a near-match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedDirection {
    Seeker,
    Candidate,
    Both,
}

/// One attribute that failed in one direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedCriterion {
    pub attribute: Attribute,
    pub name: String,
    pub direction: Direction,
    /// Stated preference of the side that owns it
    pub preference: String,
    /// The other profile's value
    pub value: String,
    pub is_dealbreaker: bool,
}

/// Diagnostic breakdown of a pair that is not a full mutual match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearMatch {
    pub candidate_id: String,
    pub failed_criteria: Vec<FailedCriterion>,
    pub match_score: MatchScore,
    pub failed_direction: Option<FailedDirection>,
}

impl NearMatch {
    pub fn has_dealbreaker_failure(&self) -> bool {
        self.failed_criteria.iter().any(|c| c.is_dealbreaker)
    }
}

/// How many near-match candidates one attribute blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockerCount {
    pub attribute: Attribute,
    pub name: String,
    pub count: usize,
}

/// Source of a ranking boost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostKind {
    Referral,
    Engagement,
}

/// A boost that ranking decided to start; persisted by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostActivation {
    pub profile_id: String,
    pub kind: BoostKind,
    pub started_at: DateTime<Utc>,
}

/// Candidate in a ranked list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub profile_id: String,
    pub user_id: String,
    pub match_score: MatchScore,
    pub interest_status: InterestStatus,
    pub is_boosted: bool,
    pub they_liked_me_first: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_criteria: Vec<FailedCriterion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_direction: Option<FailedDirection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sender: &str, receiver: &str, status: MatchStatus) -> MatchRecord {
        MatchRecord {
            sender_id: sender.to_string(),
            receiver_id: receiver.to_string(),
            status,
        }
    }

    #[test]
    fn test_status_between() {
        let history = InteractionHistory::new(
            vec![
                record("me", "a", MatchStatus::Pending),
                record("b", "me", MatchStatus::Pending),
                record("c", "me", MatchStatus::Accepted),
                record("me", "d", MatchStatus::Rejected),
                record("e", "me", MatchStatus::Rejected),
            ],
            vec![
                DeclinedProfile { user_id: "me".into(), declined_user_id: "f".into() },
                DeclinedProfile { user_id: "g".into(), declined_user_id: "me".into() },
            ],
        );

        assert_eq!(history.status_between("me", "a"), InterestStatus::Sent);
        assert_eq!(history.status_between("me", "b"), InterestStatus::Received);
        assert_eq!(history.status_between("me", "c"), InterestStatus::Mutual);
        assert_eq!(history.status_between("me", "d"), InterestStatus::DeclinedYou);
        assert_eq!(history.status_between("me", "e"), InterestStatus::Rejected);
        assert_eq!(history.status_between("me", "f"), InterestStatus::Declined);
        assert_eq!(history.status_between("me", "g"), InterestStatus::DeclinedYou);
        assert_eq!(history.status_between("me", "h"), InterestStatus::None);
    }

    #[test]
    fn test_age_prefers_date_of_birth() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let profile = Profile::new("p1", "u1", "female")
            .with_age(99)
            .with_date_of_birth(NaiveDate::from_ymd_opt(1994, 1, 1).unwrap());
        assert_eq!(profile.age_on(today), Some(30));

        let profile = Profile::new("p2", "u2", "female").with_age(31);
        assert_eq!(profile.age_on(today), Some(31));
    }

    #[test]
    fn test_blank_attribute_is_missing() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let profile = Profile::new("p1", "u1", "female").with_attribute(Attribute::Diet, "  ");
        assert!(profile.attribute_value(Attribute::Diet, today).is_missing());
        assert!(profile.attribute_value(Attribute::Age, today).is_missing());
    }

    #[test]
    fn test_weight_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert("diet".to_string(), 20.0);
        overrides.insert("pets".to_string(), -3.0);
        let weights = ScoringWeights::default().with_overrides(&overrides).unwrap();
        assert_eq!(weights.get(Attribute::Diet), 20.0);
        assert_eq!(weights.get(Attribute::Pets), 0.0);

        overrides.insert("zodiac".to_string(), 1.0);
        assert!(ScoringWeights::default().with_overrides(&overrides).is_err());
    }

    #[test]
    fn test_visibility() {
        let mut profile = Profile::new("p1", "u1", "female");
        assert!(profile.is_visible());
        profile.is_suspended = true;
        assert!(!profile.is_visible());
        profile.is_suspended = false;
        profile.approval_status = ApprovalStatus::Pending;
        assert!(!profile.is_visible());
    }
}
