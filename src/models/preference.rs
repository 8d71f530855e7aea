use crate::core::normalize::{normalize_token, parse_income_band, parse_numeric};
use crate::models::attribute::{Attribute, AttributeKind, NumericScale};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised when a preference write would break a model invariant
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreferenceError {
    #[error("{0} cannot be a deal-breaker while its preference is \"doesn't matter\"")]
    DealbreakerOnWildcard(Attribute),

    #[error("preference kind does not fit attribute {0}")]
    KindMismatch(Attribute),

    #[error("unparseable preference for {attribute}: {raw}")]
    Unparseable { attribute: Attribute, raw: String },
}

/// A seeker's stated preference for one attribute, decided once at the
/// data-model boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Preference {
    /// "Doesn't matter"; every value is acceptable
    Wildcard,
    Exact(String),
    OneOf(Vec<String>),
    /// Inclusive range, either side may be unbounded
    Range { min: Option<f64>, max: Option<f64> },
    /// Must equal the seeker's own value for the same attribute
    SameAsMine,
}

static WILDCARD: Preference = Preference::Wildcard;

const LIST_DELIMITERS: [char; 3] = [',', '|', ';'];

/// True for the "doesn't matter" sentinel in any of its spellings, including
/// the empty string.
pub fn is_doesnt_matter(raw: &str) -> bool {
    let folded: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    let folded = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    folded.is_empty() || folded == "doesnt matter"
}

fn is_same_as_mine(raw: &str) -> bool {
    normalize_token(raw) == "same as mine"
}

impl Preference {
    /// Parse a raw preference string for an attribute of the given kind.
    ///
    /// `None`, the empty string and every "doesn't matter" spelling become
    /// [`Preference::Wildcard`]. Numeric kinds accept `min-max` or a single
    /// value; use [`Preference::range`] when bounds arrive separately.
    pub fn parse(raw: Option<&str>, attribute: Attribute) -> Result<Self, PreferenceError> {
        let raw = match raw {
            Some(r) if !is_doesnt_matter(r) => r,
            _ => return Ok(Preference::Wildcard),
        };

        match attribute.kind() {
            AttributeKind::Numeric(scale) => parse_numeric_preference(raw, scale)
                .ok_or_else(|| PreferenceError::Unparseable {
                    attribute,
                    raw: raw.to_string(),
                }),
            kind => {
                if is_same_as_mine(raw) {
                    return Ok(Preference::SameAsMine);
                }

                let tokens: Vec<String> = raw
                    .split(&LIST_DELIMITERS[..])
                    .filter(|t| !is_doesnt_matter(t))
                    .map(normalize_token)
                    .collect();

                match (kind, tokens.len()) {
                    (_, 0) => Ok(Preference::Wildcard),
                    (AttributeKind::Categorical, 1) => {
                        Ok(Preference::Exact(tokens.into_iter().next().unwrap_or_default()))
                    }
                    _ => Ok(Preference::OneOf(dedup(tokens))),
                }
            }
        }
    }

    /// Build a numeric range preference from separately stored bounds.
    ///
    /// Missing or "doesn't matter" bounds are unbounded; two missing bounds
    /// collapse to a wildcard.
    pub fn range(
        min: Option<&str>,
        max: Option<&str>,
        attribute: Attribute,
    ) -> Result<Self, PreferenceError> {
        let scale = match attribute.kind() {
            AttributeKind::Numeric(scale) => scale,
            _ => return Err(PreferenceError::KindMismatch(attribute)),
        };

        let bound = |raw: Option<&str>| -> Result<Option<f64>, PreferenceError> {
            match raw {
                Some(r) if !is_doesnt_matter(r) => parse_numeric(r, scale)
                    .map(Some)
                    .ok_or_else(|| PreferenceError::Unparseable {
                        attribute,
                        raw: r.to_string(),
                    }),
                _ => Ok(None),
            }
        };

        let (min, max) = (bound(min)?, bound(max)?);
        if min.is_none() && max.is_none() {
            return Ok(Preference::Wildcard);
        }
        Ok(Preference::Range { min, max })
    }

    /// An empty range that no value falls in. Unreadable stored bounds load
    /// as this so they fail closed instead of rejecting the whole profile.
    pub fn unsatisfiable() -> Self {
        Preference::Range { min: Some(1.0), max: Some(0.0) }
    }

    /// Canonical token form, so values built in code or read back from
    /// storage compare the same way as parsed ones
    fn normalized(self) -> Self {
        match self {
            Preference::Exact(token) if is_doesnt_matter(&token) => Preference::Wildcard,
            Preference::Exact(token) => Preference::Exact(normalize_token(&token)),
            Preference::OneOf(tokens) => Preference::OneOf(dedup(
                tokens
                    .iter()
                    .filter(|t| !is_doesnt_matter(t))
                    .map(|t| normalize_token(t))
                    .collect(),
            )),
            other => other,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        match self {
            Preference::Wildcard => true,
            Preference::OneOf(tokens) => tokens.is_empty(),
            Preference::Range { min: None, max: None } => true,
            _ => false,
        }
    }

    fn fits(&self, attribute: Attribute) -> bool {
        match (self, attribute.kind()) {
            (Preference::Wildcard, _) => true,
            (Preference::Range { .. }, AttributeKind::Numeric(_)) => true,
            (Preference::Range { .. }, _) => false,
            (_, AttributeKind::Numeric(_)) => false,
            (Preference::SameAsMine, _) => attribute.allows_same_as_mine(),
            _ => true,
        }
    }

    /// Human-readable form for explanations
    pub fn describe(&self, kind: AttributeKind) -> String {
        let unit = |v: f64| match kind {
            AttributeKind::Numeric(NumericScale::HeightCm) => format!("{} cm", v),
            AttributeKind::Numeric(NumericScale::Years) => format!("{} yrs", v),
            _ => format!("{}", v),
        };
        match self {
            Preference::Wildcard => "Doesn't matter".to_string(),
            Preference::Exact(v) => v.clone(),
            Preference::OneOf(tokens) => tokens.join(", "),
            Preference::Range { min: Some(lo), max: Some(hi) } if lo > hi => {
                "Unreadable preference".to_string()
            }
            Preference::Range { min: Some(lo), max: Some(hi) } => {
                format!("{} to {}", unit(*lo), unit(*hi))
            }
            Preference::Range { min: Some(lo), max: None } => format!("at least {}", unit(*lo)),
            Preference::Range { min: None, max: Some(hi) } => format!("at most {}", unit(*hi)),
            Preference::Range { min: None, max: None } => "Doesn't matter".to_string(),
            Preference::SameAsMine => "Same as mine".to_string(),
        }
    }
}

fn parse_numeric_preference(raw: &str, scale: NumericScale) -> Option<Preference> {
    let trimmed = raw.trim();
    if scale == NumericScale::Income {
        // Income bands carry a shared unit suffix ("5-10L")
        if let Some((min, max)) = parse_income_band(trimmed) {
            return Some(Preference::Range { min: Some(min), max: Some(max) });
        }
        if split_band(trimmed).is_some() {
            return None;
        }
    }
    if let Some((lo, hi)) = split_band(trimmed) {
        let min = parse_numeric(lo, scale)?;
        let max = parse_numeric(hi, scale)?;
        return Some(Preference::Range { min: Some(min), max: Some(max) });
    }
    let value = parse_numeric(trimmed, scale)?;
    Some(Preference::Range { min: Some(value), max: Some(value) })
}

fn split_band(s: &str) -> Option<(&str, &str)> {
    if let Some(pair) = s.split_once(" to ") {
        return Some(pair);
    }
    // Skip the first char so a leading minus is not read as a separator
    let idx = s
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '-')
        .map(|(i, _)| i)?;
    Some((&s[..idx], &s[idx + 1..]))
}

fn dedup(tokens: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    for t in tokens {
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// One attribute's preference together with its deal-breaker flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceEntry {
    preference: Preference,
    #[serde(default)]
    is_dealbreaker: bool,
}

impl PreferenceEntry {
    pub fn preference(&self) -> &Preference {
        &self.preference
    }

    pub fn is_dealbreaker(&self) -> bool {
        self.is_dealbreaker
    }
}

/// All of a profile's preferences.
///
/// Every mutation goes through [`PreferenceSet::set_preference`] or
/// [`PreferenceSet::set_dealbreaker`], which keep the invariant that a
/// wildcard preference is never a deal-breaker: moving a preference to
/// wildcard clears its flag, and flagging a wildcard is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Attribute, PreferenceEntry>", into = "BTreeMap<Attribute, PreferenceEntry>")]
pub struct PreferenceSet {
    entries: BTreeMap<Attribute, PreferenceEntry>,
}

impl PreferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preference for an attribute; absent entries read as wildcard
    pub fn preference(&self, attribute: Attribute) -> &Preference {
        self.entries
            .get(&attribute)
            .map(|e| &e.preference)
            .unwrap_or(&WILDCARD)
    }

    /// Stored entry, `None` for "doesn't matter"
    pub fn entry(&self, attribute: Attribute) -> Option<&PreferenceEntry> {
        self.entries.get(&attribute)
    }

    pub fn is_dealbreaker(&self, attribute: Attribute) -> bool {
        self.entries
            .get(&attribute)
            .map(|e| e.is_dealbreaker)
            .unwrap_or(false)
    }

    pub fn set_preference(
        &mut self,
        attribute: Attribute,
        preference: Preference,
    ) -> Result<(), PreferenceError> {
        if !preference.fits(attribute) {
            return Err(PreferenceError::KindMismatch(attribute));
        }
        let preference = preference.normalized();

        if preference.is_wildcard() {
            self.entries.remove(&attribute);
            return Ok(());
        }

        let is_dealbreaker = self.is_dealbreaker(attribute);
        self.entries.insert(
            attribute,
            PreferenceEntry {
                preference,
                is_dealbreaker,
            },
        );
        Ok(())
    }

    pub fn set_dealbreaker(
        &mut self,
        attribute: Attribute,
        is_dealbreaker: bool,
    ) -> Result<(), PreferenceError> {
        match self.entries.get_mut(&attribute) {
            Some(entry) => {
                entry.is_dealbreaker = is_dealbreaker;
                Ok(())
            }
            None if is_dealbreaker => Err(PreferenceError::DealbreakerOnWildcard(attribute)),
            None => Ok(()),
        }
    }

    /// Reset an attribute to "doesn't matter", clearing its deal-breaker flag
    pub fn clear(&mut self, attribute: Attribute) {
        self.entries.remove(&attribute);
    }

    /// Builder-style helper, mostly for tests and fixtures
    pub fn with(
        mut self,
        attribute: Attribute,
        preference: Preference,
        is_dealbreaker: bool,
    ) -> Result<Self, PreferenceError> {
        self.set_preference(attribute, preference)?;
        self.set_dealbreaker(attribute, is_dealbreaker)?;
        Ok(self)
    }

    pub fn dealbreakers(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.entries
            .iter()
            .filter(|(_, e)| e.is_dealbreaker)
            .map(|(a, _)| *a)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<BTreeMap<Attribute, PreferenceEntry>> for PreferenceSet {
    type Error = PreferenceError;

    fn try_from(map: BTreeMap<Attribute, PreferenceEntry>) -> Result<Self, Self::Error> {
        let mut set = PreferenceSet::new();
        for (attribute, entry) in map {
            set.set_preference(attribute, entry.preference)?;
            set.set_dealbreaker(attribute, entry.is_dealbreaker)?;
        }
        Ok(set)
    }
}

impl From<PreferenceSet> for BTreeMap<Attribute, PreferenceEntry> {
    fn from(set: PreferenceSet) -> Self {
        set.entries
    }
}
