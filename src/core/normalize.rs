use crate::models::NumericScale;
use chrono::{Datelike, NaiveDate};

/// Plausible adult height bounds in centimetres
const MIN_HEIGHT_CM: f64 = 90.0;
const MAX_HEIGHT_CM: f64 = 250.0;

/// Plain numbers below this are read as decimal feet
const DECIMAL_FEET_CUTOFF: f64 = 9.0;

const CM_PER_INCH: f64 = 2.54;

/// Canonical form of a categorical token: trimmed, lowercased, with `_` and
/// `-` treated as spaces and whitespace collapsed.
pub fn normalize_token(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a numeric attribute value into its scale's unit
pub fn parse_numeric(raw: &str, scale: NumericScale) -> Option<f64> {
    match scale {
        NumericScale::Years => parse_number(raw).filter(|v| (0.0..=120.0).contains(v)),
        NumericScale::HeightCm => parse_height_cm(raw),
        NumericScale::Income => parse_income(raw),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Parse a free-text height into centimetres.
///
/// Accepts `5'4"`, `5' 4`, `5ft 4in`, `5 feet`, decimal feet (`5.5`),
/// centimetres (`165`, `165 cm`) and metres (`1.65m`). Values outside a
/// plausible adult range are rejected.
pub fn parse_height_cm(raw: &str) -> Option<f64> {
    let s = raw
        .trim()
        .to_lowercase()
        .replace('\u{2019}', "'")
        .replace(['\u{201d}', '\u{2033}'], "\"")
        .replace("''", "\"");

    if s.is_empty() {
        return None;
    }

    let cm = if let Some(num) = s.strip_suffix("cm") {
        parse_number(num)?
    } else if let Some(cm) = parse_feet_inches(&s) {
        cm
    } else if let Some(num) = s.strip_suffix('m') {
        let metres = parse_number(num)?;
        if metres >= 3.0 {
            return None;
        }
        metres * 100.0
    } else {
        let value = parse_number(&s)?;
        if value < DECIMAL_FEET_CUTOFF {
            value * 12.0 * CM_PER_INCH
        } else {
            value
        }
    };

    if (MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&cm) {
        Some(round_tenth(cm))
    } else {
        None
    }
}

fn parse_feet_inches(s: &str) -> Option<f64> {
    let (pos, marker) = ["feet", "foot", "ft", "'"]
        .iter()
        .find_map(|m| s.find(m).map(|p| (p, *m)))?;

    let feet = parse_number(&s[..pos])?;
    let mut rest = s[pos + marker.len()..].trim();
    for suffix in ["inches", "inch", "in", "\""] {
        if let Some(stripped) = rest.strip_suffix(suffix) {
            rest = stripped.trim();
            break;
        }
    }

    let inches = if rest.is_empty() { 0.0 } else { parse_number(rest)? };
    if !(0.0..12.0).contains(&inches) {
        return None;
    }

    Some((feet * 12.0 + inches) * CM_PER_INCH)
}

/// Parse a free-text annual income into a plain amount.
///
/// Understands thousands separators, currency prefixes, `k`, `L`/`lakh`,
/// `Cr`/`crore` and `M` suffixes. A band such as `5-10L` resolves to its
/// midpoint.
pub fn parse_income(raw: &str) -> Option<f64> {
    if let Some((lo, hi)) = parse_income_band(raw) {
        return Some((lo + hi) / 2.0);
    }
    parse_income_amount(&clean_income(raw))
}

/// Parse an income band (`5-10L`, `5 to 10 lakh`, `80k-1.2L`) into its
/// bounds. `None` when `raw` is not a band or either side is unreadable.
///
/// An unsuffixed lower bound takes the upper bound's unit, unless its digits
/// already exceed the upper bound's digits (`500000-10L` stays 500000).
pub fn parse_income_band(raw: &str) -> Option<(f64, f64)> {
    let s = clean_income(raw);
    let idx = s.char_indices().skip(1).find(|(_, c)| *c == '-').map(|(i, _)| i)?;
    let (lo, hi) = (&s[..idx], &s[idx + 1..]);

    let (hi_digits, hi_mult) = split_income_suffix(hi)?;
    let hi_val = parse_income_amount(hi)?;
    let lo_val = match split_income_suffix(lo)? {
        (digits, mult) if mult == 1.0 => {
            let lo_num = parse_number(digits)?;
            if lo_num <= parse_number(hi_digits)? {
                lo_num * hi_mult
            } else {
                lo_num
            }
        }
        _ => parse_income_amount(lo)?,
    };
    if lo_val < 0.0 {
        return None;
    }
    Some((lo_val, hi_val))
}

fn clean_income(raw: &str) -> String {
    let mut s = raw.trim().to_lowercase();
    for prefix in ["\u{20b9}", "rs.", "rs", "inr", "usd", "$"] {
        if let Some(stripped) = s.strip_prefix(prefix) {
            s = stripped.to_string();
            break;
        }
    }
    for suffix in ["per annum", "p.a.", "pa", "/yr", "/year"] {
        if let Some(stripped) = s.trim_end().strip_suffix(suffix) {
            s = stripped.to_string();
            break;
        }
    }
    s.replace(" to ", "-")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect()
}

fn parse_income_amount(s: &str) -> Option<f64> {
    let (digits, multiplier) = split_income_suffix(s)?;
    let value = parse_number(digits)? * multiplier;
    if value < 0.0 {
        return None;
    }
    Some(value)
}

fn split_income_suffix(s: &str) -> Option<(&str, f64)> {
    const SUFFIXES: [(&str, f64); 11] = [
        ("crores", 1e7),
        ("crore", 1e7),
        ("cr", 1e7),
        ("lakhs", 1e5),
        ("lakh", 1e5),
        ("lpa", 1e5),
        ("lac", 1e5),
        ("l", 1e5),
        ("mn", 1e6),
        ("m", 1e6),
        ("k", 1e3),
    ];
    if s.is_empty() {
        return None;
    }
    for (suffix, mult) in SUFFIXES {
        if let Some(digits) = s.strip_suffix(suffix) {
            return Some((digits, mult));
        }
    }
    Some((s, 1.0))
}

/// Parse a date of birth stored as `YYYY-MM-DD` or a full RFC 3339 timestamp
pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok())
}

/// Completed years between a birth date and `today`; `None` for future dates
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if date_of_birth > today {
        return None;
    }
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
