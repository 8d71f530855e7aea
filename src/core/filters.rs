use crate::models::Profile;

/// Stage that narrows the raw candidate pool before any matching runs.
///
/// Gender and visibility policies live here instead of inside the scoring
/// core, so the classifier stays agnostic of the business's gender model.
pub trait CandidatePoolFilter: Send + Sync {
    fn admits(&self, seeker: &Profile, candidate: &Profile) -> bool;
}

/// Binary gender model: candidates must have the other gender
#[derive(Debug, Clone, Copy, Default)]
pub struct OppositeGender;

impl CandidatePoolFilter for OppositeGender {
    #[inline]
    fn admits(&self, seeker: &Profile, candidate: &Profile) -> bool {
        let (s, c) = (seeker.gender.trim(), candidate.gender.trim());
        !s.is_empty() && !c.is_empty() && !s.eq_ignore_ascii_case(c)
    }
}

/// Approved, active, unsuspended profiles other than the seeker
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibleProfiles;

impl CandidatePoolFilter for VisibleProfiles {
    #[inline]
    fn admits(&self, seeker: &Profile, candidate: &Profile) -> bool {
        candidate.is_visible() && candidate.id != seeker.id && candidate.user_id != seeker.user_id
    }
}

/// Admits a candidate only if every inner filter does
pub struct AllOf(pub Vec<Box<dyn CandidatePoolFilter>>);

impl CandidatePoolFilter for AllOf {
    fn admits(&self, seeker: &Profile, candidate: &Profile) -> bool {
        self.0.iter().all(|f| f.admits(seeker, candidate))
    }
}

/// Default pool policy: visible profiles of the opposite gender
pub fn default_pool_filter() -> AllOf {
    AllOf(vec![Box::new(VisibleProfiles), Box::new(OppositeGender)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApprovalStatus;

    #[test]
    fn test_opposite_gender() {
        let seeker = Profile::new("s", "us", "male");
        assert!(OppositeGender.admits(&seeker, &Profile::new("c", "uc", "female")));
        assert!(!OppositeGender.admits(&seeker, &Profile::new("c", "uc", "Male")));
        assert!(!OppositeGender.admits(&seeker, &Profile::new("c", "uc", "")));
    }

    #[test]
    fn test_visible_profiles() {
        let seeker = Profile::new("s", "us", "male");
        let mut candidate = Profile::new("c", "uc", "female");
        assert!(VisibleProfiles.admits(&seeker, &candidate));

        candidate.approval_status = ApprovalStatus::Rejected;
        assert!(!VisibleProfiles.admits(&seeker, &candidate));

        candidate.approval_status = ApprovalStatus::Approved;
        candidate.is_active = false;
        assert!(!VisibleProfiles.admits(&seeker, &candidate));

        assert!(!VisibleProfiles.admits(&seeker, &seeker));
    }

    #[test]
    fn test_default_pool_filter() {
        let seeker = Profile::new("s", "us", "male");
        let filter = default_pool_filter();
        assert!(filter.admits(&seeker, &Profile::new("c1", "u1", "female")));
        assert!(!filter.admits(&seeker, &Profile::new("c2", "u2", "male")));

        let mut suspended = Profile::new("c3", "u3", "female");
        suspended.is_suspended = true;
        assert!(!filter.admits(&seeker, &suspended));
    }
}
