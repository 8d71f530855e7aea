use crate::core::predicate::{numeric_value, satisfies};
use crate::models::{
    Attribute, AttributeKind, AttributeValue, MatchScore, NumericScale, Preference, Profile,
    ScoringWeights,
};
use chrono::NaiveDate;

/// Share of an attribute's weight a near-miss on a numeric range can earn
const NEAR_MISS_CREDIT: f64 = 0.5;

/// Calculate how well a candidate fits a seeker's preferences (0-100).
///
/// Scoring formula:
/// score = Σ weight(attr) * credit(attr) / Σ weight(attr) * 100
///
/// where credit is 1.0 for a wildcard or satisfied preference, a linearly
/// decaying partial credit for a numeric value just outside the preferred
/// range, and 0.0 otherwise. The score ignores deal-breaker flags and is
/// directional: `(a, b)` and `(b, a)` generally differ.
pub fn calculate_match_score(
    seeker: &Profile,
    candidate: &Profile,
    weights: &ScoringWeights,
    today: NaiveDate,
) -> MatchScore {
    let mut total_score = 0.0;
    let mut max_score = 0.0;

    for attribute in Attribute::ALL {
        let weight = weights.get(attribute);
        if weight <= 0.0 {
            continue;
        }

        let credit = attribute_credit(
            seeker.preferences.preference(attribute),
            candidate.attribute_value(attribute, today),
            attribute.kind(),
            seeker.attribute_value(attribute, today),
        );

        total_score += weight * credit;
        max_score += weight;
    }

    let percentage = if max_score > 0.0 {
        (total_score / max_score * 100.0).round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    MatchScore {
        percentage,
        total_score,
        max_score,
    }
}

/// Credit (0-1) one attribute contributes to the score
#[inline]
fn attribute_credit(
    preference: &Preference,
    value: AttributeValue<'_>,
    kind: AttributeKind,
    own: AttributeValue<'_>,
) -> f64 {
    if satisfies(preference, value, kind, own) {
        return 1.0;
    }

    match (preference, kind) {
        (Preference::Range { min, max }, AttributeKind::Numeric(scale)) => {
            numeric_value(value, scale)
                .map(|v| range_near_miss(v, *min, *max, scale))
                .unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

/// Partial credit for a value outside `[min, max]`, decaying to zero at the
/// scale's tolerance
#[inline]
fn range_near_miss(value: f64, min: Option<f64>, max: Option<f64>, scale: NumericScale) -> f64 {
    let (deviation, bound) = match (min, max) {
        (Some(lo), _) if value < lo => (lo - value, lo),
        (_, Some(hi)) if value > hi => (value - hi, hi),
        _ => return 1.0,
    };

    let tolerance = match scale {
        NumericScale::Years => 5.0,
        NumericScale::HeightCm => 10.0,
        NumericScale::Income => (bound.abs() * 0.25).max(1.0),
    };

    NEAR_MISS_CREDIT * (1.0 - deviation / tolerance).max(0.0)
}
