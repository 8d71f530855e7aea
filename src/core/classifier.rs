use crate::core::predicate::satisfies;
use crate::models::{Attribute, Direction, Profile};
use chrono::NaiveDate;

/// Result of checking one attribute in one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriterionOutcome {
    pub attribute: Attribute,
    pub direction: Direction,
    pub passed: bool,
    pub is_dealbreaker: bool,
}

/// Does `other`'s value for `attribute` satisfy `owner`'s preference?
#[inline]
pub fn attribute_satisfied(owner: &Profile, other: &Profile, attribute: Attribute, today: NaiveDate) -> bool {
    satisfies(
        owner.preferences.preference(attribute),
        other.attribute_value(attribute, today),
        attribute.kind(),
        owner.attribute_value(attribute, today),
    )
}

/// Gate for one direction: every deal-breaker the seeker flagged must pass.
///
/// Stops at the first failing deal-breaker. Non-deal-breaker attributes never
/// block; they only lower the score.
pub fn matches_seeker_preferences(seeker: &Profile, candidate: &Profile, today: NaiveDate) -> bool {
    seeker
        .preferences
        .dealbreakers()
        .all(|attribute| attribute_satisfied(seeker, candidate, attribute, today))
}

/// Both profiles pass each other's deal-breaker gates
pub fn is_mutual_match(seeker: &Profile, candidate: &Profile, today: NaiveDate) -> bool {
    matches_seeker_preferences(seeker, candidate, today)
        && matches_seeker_preferences(candidate, seeker, today)
}

/// Evaluate every tracked attribute in one direction without short-circuiting.
///
/// `Direction::Seeker` checks the seeker's preferences against the
/// candidate; `Direction::Candidate` checks the reverse.
pub fn evaluate_direction(
    seeker: &Profile,
    candidate: &Profile,
    direction: Direction,
    today: NaiveDate,
) -> Vec<CriterionOutcome> {
    let (owner, other) = match direction {
        Direction::Seeker => (seeker, candidate),
        Direction::Candidate => (candidate, seeker),
    };

    Attribute::ALL
        .iter()
        .map(|&attribute| CriterionOutcome {
            attribute,
            direction,
            passed: attribute_satisfied(owner, other, attribute, today),
            is_dealbreaker: owner.preferences.is_dealbreaker(attribute),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Preference, PreferenceSet};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn seeker() -> Profile {
        let prefs = PreferenceSet::new()
            .with(Attribute::Diet, Preference::Exact("vegetarian".into()), true)
            .unwrap()
            .with(Attribute::Age, Preference::Range { min: Some(28.0), max: Some(35.0) }, false)
            .unwrap();
        Profile::new("s", "seeker", "male")
            .with_age(31)
            .with_attribute(Attribute::Diet, "vegetarian")
            .with_preferences(prefs)
    }

    fn candidate(diet: &str, age: u32) -> Profile {
        Profile::new("c", "candidate", "female")
            .with_age(age)
            .with_attribute(Attribute::Diet, diet)
    }

    #[test]
    fn test_dealbreaker_failure_blocks() {
        let c = candidate("non_vegetarian", 30);
        assert!(!matches_seeker_preferences(&seeker(), &c, today()));
    }

    #[test]
    fn test_soft_failure_does_not_block() {
        let c = candidate("vegetarian", 40);
        assert!(matches_seeker_preferences(&seeker(), &c, today()));
    }

    #[test]
    fn test_dealbreakers_bind_both_directions() {
        let s = seeker();
        let prefs = PreferenceSet::new()
            .with(Attribute::Age, Preference::Range { min: None, max: Some(30.0) }, true)
            .unwrap();
        let c = candidate("vegetarian", 29).with_preferences(prefs);

        assert!(matches_seeker_preferences(&s, &c, today()));
        assert!(!matches_seeker_preferences(&c, &s, today()));
        assert!(!is_mutual_match(&s, &c, today()));
        assert!(!is_mutual_match(&c, &s, today()));
    }

    #[test]
    fn test_evaluate_direction_covers_every_attribute() {
        let c = candidate("non_vegetarian", 40);
        let outcomes = evaluate_direction(&seeker(), &c, Direction::Seeker, today());
        assert_eq!(outcomes.len(), Attribute::ALL.len());

        let failed: Vec<_> = outcomes.iter().filter(|o| !o.passed).map(|o| o.attribute).collect();
        assert_eq!(failed, vec![Attribute::Age, Attribute::Diet]);

        let reverse = evaluate_direction(&seeker(), &c, Direction::Candidate, today());
        assert!(reverse.iter().all(|o| o.passed && o.direction == Direction::Candidate));
    }
}
