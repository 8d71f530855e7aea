use crate::models::{BoostActivation, BoostKind, InterestStatus, Profile, RankedCandidate};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

/// Boost windows and the referral milestone that starts a referral boost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostPolicy {
    pub referral_window: Duration,
    pub engagement_window: Duration,
    pub referral_threshold: u32,
}

impl Default for BoostPolicy {
    fn default() -> Self {
        Self {
            referral_window: Duration::days(30),
            engagement_window: Duration::days(7),
            referral_threshold: 3,
        }
    }
}

impl BoostPolicy {
    /// Whether a candidate ranks as boosted at `now`.
    ///
    /// Returns the activation to persist when the referral milestone is met
    /// but no referral boost has started yet; the candidate counts as boosted
    /// from `now` in that case.
    pub fn evaluate(&self, profile: &Profile, now: DateTime<Utc>) -> (bool, Option<BoostActivation>) {
        let mut activation = None;
        let referral_start = match profile.referral_boost_start {
            Some(start) => Some(start),
            None if profile.referral_count >= self.referral_threshold => {
                activation = Some(BoostActivation {
                    profile_id: profile.id.clone(),
                    kind: BoostKind::Referral,
                    started_at: now,
                });
                Some(now)
            }
            None => None,
        };

        let active = is_window_active(referral_start, self.referral_window, now)
            || is_window_active(profile.engagement_boost_start, self.engagement_window, now);

        (active, activation)
    }
}

#[inline]
fn is_window_active(start: Option<DateTime<Utc>>, window: Duration, now: DateTime<Utc>) -> bool {
    match start {
        Some(start) => {
            let elapsed = now - start;
            elapsed >= Duration::zero() && elapsed < window
        }
        None => false,
    }
}

/// Which list a candidate belongs in after the exclusion pre-pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Fresh,
    Mutual,
    Excluded,
}

/// Route a candidate by its interaction status with the seeker.
///
/// Anyone the seeker already sent interest to, declined or rejected, or who
/// declined the seeker, is excluded. Accepted pairs go to the mutual list.
pub fn placement(status: InterestStatus) -> Placement {
    match status {
        InterestStatus::None | InterestStatus::Received => Placement::Fresh,
        InterestStatus::Mutual => Placement::Mutual,
        InterestStatus::Sent
        | InterestStatus::Declined
        | InterestStatus::DeclinedYou
        | InterestStatus::Rejected => Placement::Excluded,
    }
}

/// Fresh-candidate order: boost, then "liked me first", then score.
///
/// Strict cascade, no blending between tiers. Profile id breaks any
/// remaining tie so a single call is deterministic.
pub fn sort_fresh(candidates: &mut [RankedCandidate]) {
    candidates.sort_by(|a, b| {
        b.is_boosted
            .cmp(&a.is_boosted)
            .then_with(|| b.they_liked_me_first.cmp(&a.they_liked_me_first))
            .then_with(|| by_score(a, b))
            .then_with(|| a.profile_id.cmp(&b.profile_id))
    });
}

/// Mutual-match order: boost, then score
pub fn sort_mutual(candidates: &mut [RankedCandidate]) {
    candidates.sort_by(|a, b| {
        b.is_boosted
            .cmp(&a.is_boosted)
            .then_with(|| by_score(a, b))
            .then_with(|| a.profile_id.cmp(&b.profile_id))
    });
}

#[inline]
fn by_score(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.match_score
        .percentage
        .cmp(&a.match_score.percentage)
        .then_with(|| {
            b.match_score
                .total_score
                .partial_cmp(&a.match_score.total_score)
                .unwrap_or(Ordering::Equal)
        })
}
