//! Numeric model using `rust_decimal`.
//!
//! Integers, decimals, floats and numeric strings all count as numeric.
//! Comparisons happen on `Decimal` so `"20" > 18` and `1.5 < 2` agree with
//! plain arithmetic. Only a value `Decimal` cannot hold (more than 28
//! significant digits, or beyond its 96-bit range) drops to `f64`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::types::Value;

/// Largest scale `Decimal` can carry.
const MAX_SCALE: i64 = 28;

/// Exponents beyond this skip the exact path and go straight to `f64`.
const MAX_EXACT_EXPONENT: i64 = 64;

/// Ordering tests available to leaf comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

/// A numeric reading of a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Exact(Decimal),
    Approx(f64),
}

impl Numeric {
    pub fn to_f64(self) -> Option<f64> {
        match self {
            Numeric::Exact(d) => d.to_f64(),
            Numeric::Approx(f) => Some(f),
        }
    }

    /// Truncate toward zero to an `i64`, if it fits.
    pub fn to_integer(self) -> Option<i64> {
        match self {
            Numeric::Exact(d) => to_integer(d),
            Numeric::Approx(f) => {
                let t = f.trunc();
                (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then(|| t as i64)
            }
        }
    }
}

/// Numeric reading of a value, if it has one.
///
/// Booleans, null, lists and maps are never numeric.
pub fn as_numeric(v: &Value) -> Option<Numeric> {
    match v {
        Value::Int(i) => Some(Numeric::Exact(Decimal::from(*i))),
        Value::Decimal(d) => Some(Numeric::Exact(*d)),
        Value::Float(f) => Some(Numeric::Approx(*f)),
        Value::Text(s) => parse_numeric_str(s),
        _ => None,
    }
}

pub fn is_numeric(v: &Value) -> bool {
    as_numeric(v).is_some()
}

/// Parse a numeric string: optional surrounding whitespace, optional sign,
/// digits with an optional decimal point, optional exponent.
///
/// Accepts `"42"`, `" -3.5 "`, `".5"`, `"5."`, `"1e3"`. Rejects `""`, `"."`,
/// `"0x1A"`, `"12abc"`.
pub fn parse_numeric_str(s: &str) -> Option<Numeric> {
    let t = s.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C'));
    let (negative, body) = match t.as_bytes().first()? {
        b'-' => (true, &t[1..]),
        b'+' => (false, &t[1..]),
        _ => (false, t),
    };

    let (mantissa, exponent) = match body.find(|c| c == 'e' || c == 'E') {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = match mantissa.find('.') {
        Some(pos) => (&mantissa[..pos], &mantissa[pos + 1..]),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    if let Some(e) = exponent {
        let digits = e.strip_prefix(|c| c == '+' || c == '-').unwrap_or(e);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    if let Some(d) = exact_decimal(negative, int_part, frac_part, exponent) {
        return Some(Numeric::Exact(d));
    }
    // Syntax is valid, so the standard float parser accepts it.
    t.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Numeric::Approx)
}

/// Build the exact value of an already validated numeric string.
fn exact_decimal(
    negative: bool,
    int_part: &str,
    frac_part: &str,
    exponent: Option<&str>,
) -> Option<Decimal> {
    let exp = match exponent {
        Some(e) => e.parse::<i64>().ok()?,
        None => 0,
    };
    if exp.abs() > MAX_EXACT_EXPONENT {
        return None;
    }

    let joined = format!("{}{}", int_part, frac_part);
    let digits = joined.trim_start_matches('0');
    let mut mantissa: i128 = if digits.is_empty() {
        0
    } else {
        digits.parse().ok()?
    };

    let mut scale = frac_part.len() as i64 - exp;
    while scale < 0 {
        mantissa = mantissa.checked_mul(10)?;
        scale += 1;
    }
    while scale > MAX_SCALE {
        mantissa /= 10;
        scale -= 1;
    }
    if negative {
        mantissa = -mantissa;
    }
    Decimal::try_from_i128_with_scale(mantissa, scale as u32).ok()
}

/// Truncate toward zero to an `i64`, if it fits.
pub fn to_integer(d: Decimal) -> Option<i64> {
    d.trunc().to_i64()
}

/// Compare two values numerically. Returns `false` (never an error) when
/// either side is not numeric.
pub fn compare(left: &Value, right: &Value, op: NumericOp) -> bool {
    let (Some(l), Some(r)) = (as_numeric(left), as_numeric(right)) else {
        return false;
    };
    let ordering = match (l, r) {
        (Numeric::Exact(a), Numeric::Exact(b)) => Some(a.cmp(&b)),
        _ => l.to_f64().zip(r.to_f64()).and_then(|(a, b)| a.partial_cmp(&b)),
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        NumericOp::GreaterThan => ordering == Ordering::Greater,
        NumericOp::LessThan => ordering == Ordering::Less,
        NumericOp::GreaterThanOrEqual => ordering != Ordering::Less,
        NumericOp::LessThanOrEqual => ordering != Ordering::Greater,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn exact(s: &str) -> Option<Numeric> {
        Some(Numeric::Exact(dec(s)))
    }

    #[test]
    fn numeric_strings() {
        assert_eq!(parse_numeric_str("42"), exact("42"));
        assert_eq!(parse_numeric_str(" -3.5 "), exact("-3.5"));
        assert_eq!(parse_numeric_str(".5"), exact("0.5"));
        assert_eq!(parse_numeric_str("5."), exact("5"));
        assert_eq!(parse_numeric_str("+7"), exact("7"));
        assert_eq!(parse_numeric_str("1e3"), exact("1000"));
        assert_eq!(parse_numeric_str("2.5E-1"), exact("0.25"));
        assert_eq!(parse_numeric_str("007"), exact("7"));
    }

    #[test]
    fn non_numeric_strings() {
        for s in [
            "", " ", ".", "-", "abc", "12abc", "0x1A", "1e", "1e+", "1.2.3", "--1", "inf", "NaN",
            "1e999",
        ] {
            assert_eq!(parse_numeric_str(s), None, "{:?} should not be numeric", s);
        }
    }

    #[test]
    fn oversized_numeric_strings_fall_back_to_float() {
        let huge = format!("1{}", "0".repeat(44));
        assert_eq!(parse_numeric_str(&huge), Some(Numeric::Approx(1e44)));
        assert_eq!(parse_numeric_str("2.5e100"), Some(Numeric::Approx(2.5e100)));
        assert!(compare(&Value::Text(huge), &Value::Int(5), NumericOp::GreaterThan));
    }

    #[test]
    fn floats_compare_against_exact_values() {
        assert!(compare(&Value::Float(1e30), &Value::Int(5), NumericOp::GreaterThan));
        assert!(compare(&Value::from("-1e40"), &Value::Decimal(dec("0.5")), NumericOp::LessThan));
        assert!(!compare(&Value::Float(1e30), &Value::Float(1e30), NumericOp::LessThan));
        assert_eq!(Numeric::Approx(1e30).to_integer(), None);
        assert_eq!(Numeric::Approx(-42.9).to_integer(), Some(-42));
    }

    #[test]
    fn only_numbers_and_numeric_text_are_numeric() {
        assert!(is_numeric(&Value::Int(0)));
        assert!(is_numeric(&Value::Decimal(dec("0.1"))));
        assert!(is_numeric(&Value::Float(1e30)));
        assert!(is_numeric(&Value::from("18")));
        assert!(!is_numeric(&Value::Bool(true)));
        assert!(!is_numeric(&Value::Null));
        assert!(!is_numeric(&Value::List(vec![Value::Int(1)])));
    }

    #[test]
    fn comparisons_mix_strings_and_numbers() {
        assert!(compare(&Value::from("20"), &Value::Int(18), NumericOp::GreaterThan));
        assert!(compare(&Value::Int(18), &Value::from("18.0"), NumericOp::GreaterThanOrEqual));
        assert!(compare(&Value::Decimal(dec("1.5")), &Value::Int(2), NumericOp::LessThan));
        assert!(compare(&Value::Int(2), &Value::Int(2), NumericOp::LessThanOrEqual));
        assert!(!compare(&Value::Int(2), &Value::Int(2), NumericOp::LessThan));
    }

    #[test]
    fn non_numeric_operands_compare_false() {
        assert!(!compare(&Value::from("abc"), &Value::Int(5), NumericOp::GreaterThan));
        assert!(!compare(&Value::Int(5), &Value::Null, NumericOp::LessThan));
        assert!(!compare(&Value::Bool(true), &Value::Int(0), NumericOp::GreaterThanOrEqual));
    }

    #[test]
    fn truncation_to_integer() {
        assert_eq!(to_integer(dec("42.9")), Some(42));
        assert_eq!(to_integer(dec("-42.9")), Some(-42));
        assert_eq!(to_integer(Decimal::from(i64::MAX) + Decimal::ONE), None);
    }
}
