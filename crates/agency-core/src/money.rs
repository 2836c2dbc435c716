//! # Money
//!
//! Amounts arrive as JSON numbers or numeric strings (`"12,500.50"` from
//! spreadsheets pasted into forms). They are summed as [`Decimal`] so that
//! rollups never accumulate float drift, and written back as JSON numbers.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Map, Value};

/// Parse an amount from a JSON value.
///
/// Returns `None` for `null`, blank strings and anything that is not a
/// number. Thousands separators in strings are ignored.
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return None;
            }
            Decimal::from_str(&cleaned)
                .or_else(|_| Decimal::from_scientific(&cleaned))
                .ok()
        }
        _ => None,
    }
}

/// Read `field` from a document as an amount, treating absence as zero.
pub fn amount_or_zero(doc: &Map<String, Value>, field: &str) -> Decimal {
    doc.get(field).and_then(parse_amount).unwrap_or(Decimal::ZERO)
}

/// Sum amounts, or `None` if the total leaves the decimal range.
pub fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

/// Sum every numeric value of a JSON object (e.g. a package's `costs`).
///
/// Non-numeric entries are skipped. A non-object yields zero. `None` on
/// overflow.
pub fn sum_object(value: Option<&Value>) -> Option<Decimal> {
    match value {
        Some(Value::Object(map)) => checked_total(map.values().filter_map(parse_amount)),
        _ => Some(Decimal::ZERO),
    }
}

/// Render an amount as a JSON number, rounded half away from zero to two
/// decimal places.
///
/// Whole amounts become JSON integers so `1500` does not turn into `1500.0`.
pub fn to_json(amount: Decimal) -> Value {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    if rounded.scale() == 0 {
        if let Some(i) = rounded.to_i64() {
            return Value::from(i);
        }
    }
    rounded
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Render an amount as a JSON number without rounding.
///
/// Used when coercing client input, where exchange rates may carry more than
/// two decimal places.
pub fn to_json_exact(amount: Decimal) -> Value {
    let amount = amount.normalize();
    if amount.scale() == 0 {
        if let Some(i) = amount.to_i64() {
            return Value::from(i);
        }
    }
    amount
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
