use crate::core::classifier::evaluate_direction;
use crate::core::scoring::calculate_match_score;
use crate::models::{
    Attribute, BlockerCount, Direction, FailedCriterion, FailedDirection, NearMatch, Profile,
    ScoringWeights,
};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Break down why a pair is not a full match.
///
/// Checks every attribute in both directions and records each failure with
/// display strings for the owning side's preference and the other side's
/// value. An empty `failed_criteria` means every preference in both
/// directions is satisfied.
pub fn explain(
    seeker: &Profile,
    candidate: &Profile,
    weights: &ScoringWeights,
    today: NaiveDate,
) -> NearMatch {
    let mut failed_criteria = Vec::new();

    for direction in [Direction::Seeker, Direction::Candidate] {
        let (owner, other) = match direction {
            Direction::Seeker => (seeker, candidate),
            Direction::Candidate => (candidate, seeker),
        };

        for outcome in evaluate_direction(seeker, candidate, direction, today) {
            if outcome.passed {
                continue;
            }
            let attribute = outcome.attribute;
            failed_criteria.push(FailedCriterion {
                attribute,
                name: attribute.name().to_string(),
                direction,
                preference: owner.preferences.preference(attribute).describe(attribute.kind()),
                value: other.attribute_value(attribute, today).describe(),
                is_dealbreaker: outcome.is_dealbreaker,
            });
        }
    }

    let failed_direction = failed_direction(&failed_criteria);

    NearMatch {
        candidate_id: candidate.id.clone(),
        failed_criteria,
        match_score: calculate_match_score(seeker, candidate, weights, today),
        failed_direction,
    }
}

fn failed_direction(criteria: &[FailedCriterion]) -> Option<FailedDirection> {
    let seeker_side = criteria.iter().any(|c| c.direction == Direction::Seeker);
    let candidate_side = criteria.iter().any(|c| c.direction == Direction::Candidate);
    match (seeker_side, candidate_side) {
        (true, true) => Some(FailedDirection::Both),
        (true, false) => Some(FailedDirection::Seeker),
        (false, true) => Some(FailedDirection::Candidate),
        (false, false) => None,
    }
}

/// Close enough to surface: at least one and at most `max_failures` failed
/// criteria
pub fn is_near_match(near_match: &NearMatch, max_failures: usize) -> bool {
    !near_match.failed_criteria.is_empty() && near_match.failed_criteria.len() <= max_failures
}

/// Count, per attribute, how many distinct candidates it fails for.
///
/// Sorted by count descending; equal counts keep first-seen order.
pub fn summarize_blockers(near_matches: &[NearMatch]) -> Vec<BlockerCount> {
    let mut counted: HashSet<(Attribute, &str)> = HashSet::new();
    let mut counts: Vec<BlockerCount> = Vec::new();

    for near_match in near_matches {
        for criterion in &near_match.failed_criteria {
            if !counted.insert((criterion.attribute, near_match.candidate_id.as_str())) {
                continue;
            }
            match counts.iter_mut().find(|b| b.attribute == criterion.attribute) {
                Some(entry) => entry.count += 1,
                None => counts.push(BlockerCount {
                    attribute: criterion.attribute,
                    name: criterion.name.clone(),
                    count: 1,
                }),
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
