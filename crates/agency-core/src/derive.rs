//! # Derived Fields
//!
//! Server-computed money fields, recomputed from the merged document after
//! every create or update. The inputs are whatever the document holds after
//! the write, so a partial update of `paidAmount` alone still refreshes
//! `dueAmount`.
//!
//! Every operation is checked: a result outside the decimal range is a
//! [`ValidationError::AmountOutOfRange`] naming the derived field, and the
//! document is left unchanged.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::money::{amount_or_zero, to_json};
use crate::rollup::derive_package_fields;
use crate::schema::EntitySchema;

/// Recompute the derived fields of `doc` for its collection.
/// Collections without derived fields are left untouched.
pub fn apply_derived(schema: &EntitySchema, doc: &mut Map<String, Value>) -> Result<(), ValidationError> {
    match schema.name {
        "packages" => derive_package_fields(doc)?,
        "vendor_bills" | "loans" => {
            let due = amount_or_zero(doc, "amount").checked_sub(amount_or_zero(doc, "paidAmount"));
            doc.insert("dueAmount".into(), to_json(in_range(due, "dueAmount")?));
        }
        "air_tickets" => {
            let due = amount_or_zero(doc, "fare").checked_sub(amount_or_zero(doc, "paidAmount"));
            doc.insert("dueAmount".into(), to_json(in_range(due, "dueAmount")?));
        }
        "exchanges" => {
            let total = amount_or_zero(doc, "amount").checked_mul(amount_or_zero(doc, "rate"));
            doc.insert("totalAmount".into(), to_json(in_range(total, "totalAmount")?));
        }
        _ => {}
    }
    Ok(())
}

/// Unwrap a checked result or report `field` as out of range.
pub(crate) fn in_range(amount: Option<Decimal>, field: &str) -> Result<Decimal, ValidationError> {
    amount.ok_or_else(|| ValidationError::AmountOutOfRange {
        field: field.to_string(),
    })
}
