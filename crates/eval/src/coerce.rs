//! Raw value to kind-appropriate default value.
//!
//! `Ok(None)` means "leave the default unset". Null raw values are always
//! unset; everything else follows the field kind.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::kinds::FieldKind;
use crate::numeric::as_numeric;
use crate::types::{CoercionError, Value};

/// Coerce `raw` into the default value for a field of `kind`.
///
/// - `integer` (also the kind for `number`): numeric values, numeric text
///   included, truncate to `Int`.
/// - `file`: only a host file handle is kept.
/// - `date`/`datetime`/`time`: temporal values pass through, text is
///   parsed, empty text is unset, anything else is an error.
/// - every other kind: passed through unchanged.
pub fn coerce(kind: FieldKind, raw: &Value) -> Result<Option<Value>, CoercionError> {
    if raw.is_null() {
        return Ok(None);
    }

    match kind {
        FieldKind::Integer => Ok(Some(
            as_numeric(raw)
                .and_then(|n| n.to_integer())
                .map(Value::Int)
                .unwrap_or_else(|| raw.clone()),
        )),
        FieldKind::File => Ok(match raw {
            Value::File(_) => Some(raw.clone()),
            _ => None,
        }),
        FieldKind::Date | FieldKind::DateTime | FieldKind::Time => coerce_temporal(kind, raw),
        _ => Ok(Some(raw.clone())),
    }
}

fn coerce_temporal(kind: FieldKind, raw: &Value) -> Result<Option<Value>, CoercionError> {
    if raw.is_temporal() {
        return Ok(Some(raw.clone()));
    }
    let Value::Text(text) = raw else {
        return Err(CoercionError::NotTemporal {
            kind,
            got: raw.type_name(),
        });
    };
    let input = text.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let parsed = match kind {
        FieldKind::Date => parse_date(input).map(Value::Date),
        FieldKind::Time => parse_time(input).map(Value::Time),
        _ => parse_datetime(input).map(Value::DateTime),
    };
    parsed.map(Some).ok_or_else(|| CoercionError::Unparseable {
        kind,
        input: text.clone(),
    })
}

// ── Parsers ─────────────────────────────────────────────────────────

/// Full timestamps. Values without an offset are read as UTC; a bare date
/// is midnight UTC.
fn parse_datetime(s: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(dt);
    }
    parse_local_datetime(s)
        .or_else(|| {
            Date::parse(s, format_description!("[year]-[month]-[day]"))
                .ok()
                .map(|d| d.midnight())
        })
        .map(PrimitiveDateTime::assume_utc)
}

fn parse_local_datetime(s: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
        .or_else(|_| {
            PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]"))
        })
        .ok()
}

fn parse_date(s: &str) -> Option<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

fn parse_time(s: &str) -> Option<Time> {
    Time::parse(s, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(s, format_description!("[hour]:[minute]")))
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.time()))
}
