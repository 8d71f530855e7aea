use crate::core::normalize::parse_date_of_birth;
use crate::models::attribute::Attribute;
use crate::models::domain::{ApprovalStatus, Profile};
use crate::models::preference::{Preference, PreferenceError, PreferenceSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors converting a raw profile record into a [`Profile`]
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile {id}: {source}")]
    Preference {
        id: String,
        #[source]
        source: PreferenceError,
    },

    #[error("profile record is missing {0}")]
    MissingField(&'static str),
}

/// Loosely typed scalar as stored by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl RawValue {
    pub fn as_text(&self) -> String {
        match self {
            RawValue::Bool(true) => "yes".to_string(),
            RawValue::Bool(false) => "no".to_string(),
            RawValue::Number(n) => format!("{}", n),
            RawValue::Text(s) => s.clone(),
            RawValue::List(items) => items.join(","),
        }
    }
}

fn text(v: &Option<RawValue>) -> Option<String> {
    v.as_ref().map(RawValue::as_text)
}

/// Flat profile record with `pref*` and `pref*IsDealbreaker` mirror fields,
/// as the host application stores and submits it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRecord {
    pub id: String,
    pub user_id: String,
    pub gender: String,
    pub date_of_birth: Option<String>,
    pub age: Option<u32>,
    pub approval_status: Option<ApprovalStatus>,
    pub is_active: Option<bool>,
    pub is_suspended: Option<bool>,
    pub referral_count: Option<u32>,
    pub referral_boost_start: Option<DateTime<Utc>>,
    pub engagement_boost_start: Option<DateTime<Utc>>,

    pub height: Option<RawValue>,
    pub marital_status: Option<RawValue>,
    pub dietary_preference: Option<RawValue>,
    pub smoking: Option<RawValue>,
    pub drinking: Option<RawValue>,
    pub religion: Option<RawValue>,
    pub community: Option<RawValue>,
    pub sub_community: Option<RawValue>,
    pub caste: Option<RawValue>,
    pub gotra: Option<RawValue>,
    pub qualification: Option<RawValue>,
    pub occupation: Option<RawValue>,
    pub annual_income: Option<RawValue>,
    pub current_location: Option<RawValue>,
    pub citizenship: Option<RawValue>,
    pub grew_up_in: Option<RawValue>,
    pub mother_tongue: Option<RawValue>,
    pub family_values: Option<RawValue>,
    pub family_location: Option<RawValue>,
    pub hobbies: Option<RawValue>,
    pub fitness: Option<RawValue>,
    pub interests: Option<RawValue>,
    pub pets: Option<RawValue>,
    pub has_children: Option<RawValue>,

    pub pref_age_min: Option<RawValue>,
    pub pref_age_max: Option<RawValue>,
    pub pref_height_min: Option<RawValue>,
    pub pref_height_max: Option<RawValue>,
    pub pref_income_min: Option<RawValue>,
    pub pref_income_max: Option<RawValue>,
    pub pref_marital_status: Option<RawValue>,
    pub pref_diet: Option<RawValue>,
    pub pref_smoking: Option<RawValue>,
    pub pref_drinking: Option<RawValue>,
    pub pref_religion: Option<RawValue>,
    pub pref_community: Option<RawValue>,
    pub pref_sub_community: Option<RawValue>,
    pub pref_caste: Option<RawValue>,
    pub pref_gotra: Option<RawValue>,
    pub pref_qualification: Option<RawValue>,
    pub pref_occupation: Option<RawValue>,
    pub pref_location: Option<RawValue>,
    pub pref_citizenship: Option<RawValue>,
    pub pref_grew_up_in: Option<RawValue>,
    pub pref_mother_tongue: Option<RawValue>,
    pub pref_family_values: Option<RawValue>,
    pub pref_family_location: Option<RawValue>,
    pub pref_hobbies: Option<RawValue>,
    pub pref_fitness: Option<RawValue>,
    pub pref_interests: Option<RawValue>,
    pub pref_pets: Option<RawValue>,
    pub pref_has_children: Option<RawValue>,

    pub pref_age_is_dealbreaker: bool,
    pub pref_height_is_dealbreaker: bool,
    pub pref_income_is_dealbreaker: bool,
    pub pref_marital_status_is_dealbreaker: bool,
    pub pref_diet_is_dealbreaker: bool,
    pub pref_smoking_is_dealbreaker: bool,
    pub pref_drinking_is_dealbreaker: bool,
    pub pref_religion_is_dealbreaker: bool,
    pub pref_community_is_dealbreaker: bool,
    pub pref_sub_community_is_dealbreaker: bool,
    pub pref_caste_is_dealbreaker: bool,
    pub pref_gotra_is_dealbreaker: bool,
    pub pref_qualification_is_dealbreaker: bool,
    pub pref_occupation_is_dealbreaker: bool,
    pub pref_location_is_dealbreaker: bool,
    pub pref_citizenship_is_dealbreaker: bool,
    pub pref_grew_up_in_is_dealbreaker: bool,
    pub pref_mother_tongue_is_dealbreaker: bool,
    pub pref_family_values_is_dealbreaker: bool,
    pub pref_family_location_is_dealbreaker: bool,
    pub pref_hobbies_is_dealbreaker: bool,
    pub pref_fitness_is_dealbreaker: bool,
    pub pref_interests_is_dealbreaker: bool,
    pub pref_pets_is_dealbreaker: bool,
    pub pref_has_children_is_dealbreaker: bool,
}

impl ProfileRecord {
    fn attribute_values(&self) -> [(Attribute, &Option<RawValue>); 24] {
        use Attribute::*;
        [
            (Height, &self.height),
            (MaritalStatus, &self.marital_status),
            (Diet, &self.dietary_preference),
            (Smoking, &self.smoking),
            (Drinking, &self.drinking),
            (Religion, &self.religion),
            (Community, &self.community),
            (SubCommunity, &self.sub_community),
            (Caste, &self.caste),
            (Gotra, &self.gotra),
            (Qualification, &self.qualification),
            (Occupation, &self.occupation),
            (Income, &self.annual_income),
            (Location, &self.current_location),
            (Citizenship, &self.citizenship),
            (GrewUpIn, &self.grew_up_in),
            (MotherTongue, &self.mother_tongue),
            (FamilyValues, &self.family_values),
            (FamilyLocation, &self.family_location),
            (Hobbies, &self.hobbies),
            (Fitness, &self.fitness),
            (Interests, &self.interests),
            (Pets, &self.pets),
            (HasChildren, &self.has_children),
        ]
    }

    fn ranged_preferences(&self) -> [(Attribute, &Option<RawValue>, &Option<RawValue>); 3] {
        [
            (Attribute::Age, &self.pref_age_min, &self.pref_age_max),
            (Attribute::Height, &self.pref_height_min, &self.pref_height_max),
            (Attribute::Income, &self.pref_income_min, &self.pref_income_max),
        ]
    }

    fn listed_preferences(&self) -> [(Attribute, &Option<RawValue>); 22] {
        use Attribute::*;
        [
            (MaritalStatus, &self.pref_marital_status),
            (Diet, &self.pref_diet),
            (Smoking, &self.pref_smoking),
            (Drinking, &self.pref_drinking),
            (Religion, &self.pref_religion),
            (Community, &self.pref_community),
            (SubCommunity, &self.pref_sub_community),
            (Caste, &self.pref_caste),
            (Gotra, &self.pref_gotra),
            (Qualification, &self.pref_qualification),
            (Occupation, &self.pref_occupation),
            (Location, &self.pref_location),
            (Citizenship, &self.pref_citizenship),
            (GrewUpIn, &self.pref_grew_up_in),
            (MotherTongue, &self.pref_mother_tongue),
            (FamilyValues, &self.pref_family_values),
            (FamilyLocation, &self.pref_family_location),
            (Hobbies, &self.pref_hobbies),
            (Fitness, &self.pref_fitness),
            (Interests, &self.pref_interests),
            (Pets, &self.pref_pets),
            (HasChildren, &self.pref_has_children),
        ]
    }

    fn dealbreaker_flags(&self) -> [(Attribute, bool); 25] {
        use Attribute::*;
        [
            (Age, self.pref_age_is_dealbreaker),
            (Height, self.pref_height_is_dealbreaker),
            (Income, self.pref_income_is_dealbreaker),
            (MaritalStatus, self.pref_marital_status_is_dealbreaker),
            (Diet, self.pref_diet_is_dealbreaker),
            (Smoking, self.pref_smoking_is_dealbreaker),
            (Drinking, self.pref_drinking_is_dealbreaker),
            (Religion, self.pref_religion_is_dealbreaker),
            (Community, self.pref_community_is_dealbreaker),
            (SubCommunity, self.pref_sub_community_is_dealbreaker),
            (Caste, self.pref_caste_is_dealbreaker),
            (Gotra, self.pref_gotra_is_dealbreaker),
            (Qualification, self.pref_qualification_is_dealbreaker),
            (Occupation, self.pref_occupation_is_dealbreaker),
            (Location, self.pref_location_is_dealbreaker),
            (Citizenship, self.pref_citizenship_is_dealbreaker),
            (GrewUpIn, self.pref_grew_up_in_is_dealbreaker),
            (MotherTongue, self.pref_mother_tongue_is_dealbreaker),
            (FamilyValues, self.pref_family_values_is_dealbreaker),
            (FamilyLocation, self.pref_family_location_is_dealbreaker),
            (Hobbies, self.pref_hobbies_is_dealbreaker),
            (Fitness, self.pref_fitness_is_dealbreaker),
            (Interests, self.pref_interests_is_dealbreaker),
            (Pets, self.pref_pets_is_dealbreaker),
            (HasChildren, self.pref_has_children_is_dealbreaker),
        ]
    }

    /// Unreadable stored preferences load as unsatisfiable rather than
    /// rejecting the profile
    fn readable(&self, parsed: Result<Preference, PreferenceError>) -> Preference {
        parsed.unwrap_or_else(|e| {
            tracing::warn!("Unreadable preference on profile {}: {}", self.id, e);
            Preference::unsatisfiable()
        })
    }

    fn preference_set(&self) -> Result<PreferenceSet, PreferenceError> {
        let mut set = PreferenceSet::new();

        for (attribute, min, max) in self.ranged_preferences() {
            let (min, max) = (text(min), text(max));
            let pref = Preference::range(min.as_deref(), max.as_deref(), attribute);
            set.set_preference(attribute, self.readable(pref))?;
        }

        for (attribute, raw) in self.listed_preferences() {
            let raw = text(raw);
            let pref = Preference::parse(raw.as_deref(), attribute);
            set.set_preference(attribute, self.readable(pref))?;
        }

        for (attribute, flag) in self.dealbreaker_flags() {
            if let Err(e) = set.set_dealbreaker(attribute, flag) {
                tracing::warn!("Dropping deal-breaker flag on profile {}: {}", self.id, e);
            }
        }

        Ok(set)
    }
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = ProfileError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        if record.id.trim().is_empty() {
            return Err(ProfileError::MissingField("id"));
        }
        if record.gender.trim().is_empty() {
            return Err(ProfileError::MissingField("gender"));
        }

        let preferences = record.preference_set().map_err(|source| ProfileError::Preference {
            id: record.id.clone(),
            source,
        })?;

        let date_of_birth = record.date_of_birth.as_deref().and_then(|raw| {
            let parsed = parse_date_of_birth(raw);
            if parsed.is_none() {
                tracing::warn!("Unparseable date of birth on profile {}: {}", record.id, raw);
            }
            parsed
        });

        let attributes: BTreeMap<Attribute, String> = record
            .attribute_values()
            .into_iter()
            .filter_map(|(attribute, raw)| text(raw).map(|v| (attribute, v)))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();

        let user_id = if record.user_id.is_empty() {
            record.id.clone()
        } else {
            record.user_id.clone()
        };

        Ok(Profile {
            id: record.id,
            user_id,
            gender: record.gender.trim().to_lowercase(),
            date_of_birth,
            age: record.age,
            approval_status: record.approval_status.unwrap_or_default(),
            is_active: record.is_active.unwrap_or(true),
            is_suspended: record.is_suspended.unwrap_or(false),
            referral_count: record.referral_count.unwrap_or(0),
            referral_boost_start: record.referral_boost_start,
            engagement_boost_start: record.engagement_boost_start,
            attributes,
            preferences,
        })
    }
}
