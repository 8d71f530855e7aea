use crate::core::{
    classifier::is_mutual_match,
    explainer::{explain, is_near_match, summarize_blockers},
    filters::CandidatePoolFilter,
    ranking::{placement, sort_fresh, sort_mutual, BoostPolicy, Placement},
    scoring::calculate_match_score,
};
use crate::models::{
    BlockerCount, BoostActivation, InteractionHistory, InterestStatus, MatchScore, NearMatch,
    Profile, RankedCandidate, ScoringWeights,
};
use chrono::{DateTime, NaiveDate, Utc};

/// Default cap on failed criteria for a pair to be shown as a near-match
pub const DEFAULT_NEAR_MATCH_MAX_FAILURES: usize = 3;

/// Result of the matching process
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Mutually matching candidates with no prior interaction history
    pub fresh: Vec<RankedCandidate>,
    /// Candidates already in an accepted state with the seeker
    pub mutual: Vec<RankedCandidate>,
    /// Pairs that fail the mutual gate but are close, with explanations
    pub near_matches: Vec<RankedCandidate>,
    /// Which attributes block the most near-matches
    pub blockers: Vec<BlockerCount>,
    /// Referral boosts started while ranking; the caller persists these
    pub boost_activations: Vec<BoostActivation>,
    pub total_candidates: usize,
}

impl MatchResult {
    /// Page through the fresh matches.
    ///
    /// Only `fresh` honours `offset`. The mutual and near-match lists are side
    /// panels and always show their top `limit` entries.
    pub fn paginate(mut self, offset: usize, limit: usize) -> Self {
        let start = offset.min(self.fresh.len());
        self.fresh.drain(..start);
        self.fresh.truncate(limit);
        self.mutual.truncate(limit);
        self.near_matches.truncate(limit);
        self
    }
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Candidate pool filter (gender / visibility policy, supplied by caller)
/// 2. Interaction exclusion pre-pass
/// 3. Bidirectional deal-breaker gate
/// 4. Near-match explanation for pairs that fail the gate
/// 5. Scoring, boost evaluation and tiered ranking
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    boost_policy: BoostPolicy,
    near_match_max_failures: usize,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            boost_policy: BoostPolicy::default(),
            near_match_max_failures: DEFAULT_NEAR_MATCH_MAX_FAILURES,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default())
    }

    pub fn with_boost_policy(mut self, policy: BoostPolicy) -> Self {
        self.boost_policy = policy;
        self
    }

    pub fn with_near_match_max_failures(mut self, max_failures: usize) -> Self {
        self.near_match_max_failures = max_failures;
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(&self, seeker: &Profile, candidate: &Profile, today: NaiveDate) -> MatchScore {
        calculate_match_score(seeker, candidate, &self.weights, today)
    }

    pub fn explain(&self, seeker: &Profile, candidate: &Profile, today: NaiveDate) -> NearMatch {
        explain(seeker, candidate, &self.weights, today)
    }

    /// Rank a candidate pool for a seeker.
    ///
    /// # Arguments
    /// * `seeker` - The profile whose preferences drive the ranking
    /// * `candidates` - Fully materialized candidate profiles
    /// * `history` - Interest and decline records touching the seeker
    /// * `pool_filter` - Policy stage applied before any matching
    /// * `now` - Clock used for ages and boost windows
    pub fn rank(
        &self,
        seeker: &Profile,
        candidates: &[Profile],
        history: &InteractionHistory,
        pool_filter: &dyn CandidatePoolFilter,
        now: DateTime<Utc>,
    ) -> MatchResult {
        let today = now.date_naive();
        let mut result = MatchResult {
            total_candidates: candidates.len(),
            ..Default::default()
        };
        let mut explanations: Vec<NearMatch> = Vec::new();

        for candidate in candidates.iter().filter(|c| pool_filter.admits(seeker, c)) {
            let status = history.status_between(&seeker.user_id, &candidate.user_id);
            let place = placement(status);
            if place == Placement::Excluded {
                continue;
            }

            let (is_boosted, activation) = self.boost_policy.evaluate(candidate, now);
            result.boost_activations.extend(activation);

            let ranked = |match_score: MatchScore| RankedCandidate {
                profile_id: candidate.id.clone(),
                user_id: candidate.user_id.clone(),
                match_score,
                interest_status: status,
                is_boosted,
                they_liked_me_first: status == InterestStatus::Received,
                failed_criteria: Vec::new(),
                failed_direction: None,
            };

            if place == Placement::Mutual {
                result.mutual.push(ranked(self.score(seeker, candidate, today)));
                continue;
            }

            if is_mutual_match(seeker, candidate, today) {
                result.fresh.push(ranked(self.score(seeker, candidate, today)));
                continue;
            }

            let explanation = self.explain(seeker, candidate, today);
            if is_near_match(&explanation, self.near_match_max_failures) {
                let mut entry = ranked(explanation.match_score);
                entry.failed_criteria = explanation.failed_criteria.clone();
                entry.failed_direction = explanation.failed_direction;
                result.near_matches.push(entry);
                explanations.push(explanation);
            }
        }

        sort_fresh(&mut result.fresh);
        sort_fresh(&mut result.near_matches);
        sort_mutual(&mut result.mutual);
        result.blockers = summarize_blockers(&explanations);

        tracing::debug!(
            "Ranked {} candidates for {}: {} fresh, {} mutual, {} near, {} boost activations",
            result.total_candidates,
            seeker.user_id,
            result.fresh.len(),
            result.mutual.len(),
            result.near_matches.len(),
            result.boost_activations.len()
        );

        result
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
