use crate::core::normalize::{normalize_token, parse_numeric};
use crate::models::{AttributeKind, AttributeValue, NumericScale, Preference};

const VALUE_DELIMITERS: [char; 3] = [',', '|', ';'];

/// Decide whether a value satisfies one preference.
///
/// `own` is the preference owner's value for the same attribute and is only
/// consulted for [`Preference::SameAsMine`]. Wildcards always pass; missing or
/// unparseable values fail against any concrete preference.
pub fn satisfies(
    preference: &Preference,
    value: AttributeValue<'_>,
    kind: AttributeKind,
    own: AttributeValue<'_>,
) -> bool {
    if preference.is_wildcard() {
        return true;
    }

    if let Preference::SameAsMine = preference {
        return match resolve_same_as_mine(own, kind) {
            Some(resolved) => satisfies(&resolved, value, kind, AttributeValue::Missing),
            None => false,
        };
    }

    if value.is_missing() {
        return false;
    }

    match preference {
        Preference::Range { min, max } => match kind {
            AttributeKind::Numeric(scale) => match numeric_value(value, scale) {
                Some(v) => within(v, *min, *max),
                None => false,
            },
            _ => false,
        },
        Preference::Exact(expected) => value_tokens(value, kind).iter().any(|t| t == expected),
        Preference::OneOf(accepted) => value_tokens(value, kind)
            .iter()
            .any(|t| accepted.contains(t)),
        Preference::Wildcard | Preference::SameAsMine => true,
    }
}

/// Numeric form of a value on the given scale, if it parses
pub fn numeric_value(value: AttributeValue<'_>, scale: NumericScale) -> Option<f64> {
    match value {
        AttributeValue::Number(n) => Some(n),
        AttributeValue::Text(s) => parse_numeric(s, scale),
        AttributeValue::Missing => None,
    }
}

#[inline]
fn within(v: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |lo| v >= lo) && max.map_or(true, |hi| v <= hi)
}

/// Normalized tokens of a value; list attributes may hold several
fn value_tokens(value: AttributeValue<'_>, kind: AttributeKind) -> Vec<String> {
    let text = match value {
        AttributeValue::Text(s) => s.to_string(),
        AttributeValue::Number(n) => format!("{}", n),
        AttributeValue::Missing => return Vec::new(),
    };

    match kind {
        AttributeKind::List => text
            .split(&VALUE_DELIMITERS[..])
            .map(normalize_token)
            .filter(|t| !t.is_empty())
            .collect(),
        _ => vec![normalize_token(&text)],
    }
}

fn resolve_same_as_mine(own: AttributeValue<'_>, kind: AttributeKind) -> Option<Preference> {
    let mut tokens = value_tokens(own, kind);
    match tokens.len() {
        0 => None,
        1 => tokens.pop().map(Preference::Exact),
        _ => Some(Preference::OneOf(tokens)),
    }
}
