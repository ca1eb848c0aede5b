use super::{FieldKind, Value, start_of_day};
use crate::errors::FilterError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Date-time layouts tried before anything else.
const EXACT_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Layouts accepted for hand-typed date-times.
const LOOSE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

/// Layouts accepted for hand-typed dates. Slash-separated day/month orders are
/// not accepted.
const LOOSE_DATE_FORMATS: [&str; 4] = ["%Y/%m/%d", "%d.%m.%Y", "%B %d, %Y", "%d %B %Y"];

/// Convert a raw query value into a [`Value`] of the given kind.
///
/// Never panics. Anything that does not parse cleanly is reported as
/// [`FilterError::Coercion`]; callers in the filtering layer turn that into a
/// predicate that matches nothing.
///
/// # Errors
///
/// Returns [`FilterError::Coercion`] when `raw` is not a valid literal of `kind`.
pub fn coerce(raw: &str, kind: FieldKind) -> Result<Value, FilterError> {
    let parsed = match kind {
        FieldKind::Text => Some(Value::Text(raw.to_string())),
        FieldKind::Integer => raw.trim().parse::<i64>().ok().map(Value::Integer),
        FieldKind::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(Value::Float),
        FieldKind::Decimal => parse_decimal(raw.trim()).map(Value::Decimal),
        FieldKind::Boolean => parse_bool(raw.trim()).map(Value::Boolean),
        FieldKind::Date => parse_date(raw.trim()).map(Value::Date),
        FieldKind::DateTime => parse_date_time(raw.trim()).map(Value::DateTime),
        FieldKind::Uuid => Uuid::parse_str(raw.trim()).ok().map(Value::Uuid),
        FieldKind::Enum(variants) => parse_enum(raw.trim(), variants),
    };

    parsed.ok_or_else(|| FilterError::Coercion {
        raw: raw.to_string(),
        kind,
    })
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str_exact(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment.naive_utc());
    }
    EXACT_DATE_TIME_FORMATS
        .iter()
        .chain(LOOSE_DATE_TIME_FORMATS.iter())
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| parse_plain_date(raw).map(start_of_day))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_plain_date(raw).or_else(|| parse_date_time(raw).map(|moment| moment.date()))
}

fn parse_plain_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        LOOSE_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    })
}

fn parse_enum(raw: &str, variants: &'static [&'static str]) -> Option<Value> {
    if let Some((ordinal, name)) = variants
        .iter()
        .enumerate()
        .find(|(_, name)| name.eq_ignore_ascii_case(raw))
    {
        return Some(Value::Enum { name: *name, ordinal });
    }

    let ordinal = raw.parse::<usize>().ok()?;
    variants
        .get(ordinal)
        .map(|name| Value::Enum { name: *name, ordinal })
}
