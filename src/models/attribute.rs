use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every profile attribute that takes part in preference matching.
///
/// The declaration order is the evaluation order used by the classifier and
/// the order in which failed criteria are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Age,
    Height,
    MaritalStatus,
    Religion,
    Community,
    SubCommunity,
    Caste,
    Gotra,
    MotherTongue,
    Location,
    Citizenship,
    GrewUpIn,
    Diet,
    Smoking,
    Drinking,
    Qualification,
    Occupation,
    Income,
    FamilyValues,
    FamilyLocation,
    HasChildren,
    Fitness,
    Hobbies,
    Interests,
    Pets,
}

/// How a preference for an attribute is compared against a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Single value, exact case-insensitive compare
    Categorical,
    /// Preference is a set of acceptable tokens
    List,
    /// Preference is an inclusive numeric range
    Numeric(NumericScale),
}

/// Unit a numeric attribute is normalized to before range comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericScale {
    Years,
    HeightCm,
    Income,
}

impl Attribute {
    pub const ALL: [Attribute; 25] = [
        Attribute::Age,
        Attribute::Height,
        Attribute::MaritalStatus,
        Attribute::Religion,
        Attribute::Community,
        Attribute::SubCommunity,
        Attribute::Caste,
        Attribute::Gotra,
        Attribute::MotherTongue,
        Attribute::Location,
        Attribute::Citizenship,
        Attribute::GrewUpIn,
        Attribute::Diet,
        Attribute::Smoking,
        Attribute::Drinking,
        Attribute::Qualification,
        Attribute::Occupation,
        Attribute::Income,
        Attribute::FamilyValues,
        Attribute::FamilyLocation,
        Attribute::HasChildren,
        Attribute::Fitness,
        Attribute::Hobbies,
        Attribute::Interests,
        Attribute::Pets,
    ];

    pub fn kind(self) -> AttributeKind {
        use Attribute::*;
        match self {
            Age => AttributeKind::Numeric(NumericScale::Years),
            Height => AttributeKind::Numeric(NumericScale::HeightCm),
            Income => AttributeKind::Numeric(NumericScale::Income),
            MaritalStatus | Community | SubCommunity | Caste | MotherTongue | Location
            | Citizenship | GrewUpIn | Qualification | Occupation | FamilyLocation | Hobbies
            | Interests => AttributeKind::List,
            Religion | Gotra | Diet | Smoking | Drinking | FamilyValues | HasChildren
            | Fitness | Pets => AttributeKind::Categorical,
        }
    }

    /// Profile field name the attribute value is read from
    pub fn name(self) -> &'static str {
        use Attribute::*;
        match self {
            Age => "age",
            Height => "height",
            MaritalStatus => "maritalStatus",
            Religion => "religion",
            Community => "community",
            SubCommunity => "subCommunity",
            Caste => "caste",
            Gotra => "gotra",
            MotherTongue => "motherTongue",
            Location => "currentLocation",
            Citizenship => "citizenship",
            GrewUpIn => "grewUpIn",
            Diet => "dietaryPreference",
            Smoking => "smoking",
            Drinking => "drinking",
            Qualification => "qualification",
            Occupation => "occupation",
            Income => "annualIncome",
            FamilyValues => "familyValues",
            FamilyLocation => "familyLocation",
            HasChildren => "hasChildren",
            Fitness => "fitness",
            Hobbies => "hobbies",
            Interests => "interests",
            Pets => "pets",
        }
    }

    /// Suffix used by the `pref*` fields, e.g. `diet` for `prefDiet`
    pub fn short_name(self) -> &'static str {
        use Attribute::*;
        match self {
            Diet => "diet",
            Location => "location",
            Income => "income",
            other => other.name(),
        }
    }

    /// Default score weight, in points.
    ///
    /// Age, height, religion, marital status and location dominate; lifestyle
    /// extras (hobbies, pets) barely move the percentage.
    pub fn default_weight(self) -> f64 {
        use Attribute::*;
        match self {
            Age | Religion => 10.0,
            Height | Location | MaritalStatus => 8.0,
            Community => 7.0,
            Diet | MotherTongue => 6.0,
            Qualification | Occupation | Income | Caste => 5.0,
            SubCommunity | Gotra | Citizenship | Smoking | Drinking | HasChildren => 4.0,
            GrewUpIn | FamilyValues => 3.0,
            FamilyLocation | Fitness | Hobbies | Interests => 2.0,
            Pets => 1.0,
        }
    }

    /// Whether a preference may reference the seeker's own value
    pub fn allows_same_as_mine(self) -> bool {
        !matches!(self.kind(), AttributeKind::Numeric(_))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attribute: {0}")]
pub struct UnknownAttribute(pub String);

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    /// Accepts either the profile field name (`dietaryPreference`) or the
    /// preference suffix (`diet`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Attribute::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(needle) || a.short_name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}
