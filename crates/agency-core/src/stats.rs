//! # Aggregate Statistics
//!
//! License expiry statistics and the personal expense summary. Both are
//! computed from snapshots of the relevant collections and never write.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::CoreError;
use crate::money::{amount_or_zero, to_json};
use crate::schema::get_str;
use crate::temporal::parse_date;

/// Window, in days, for a license to count as expiring soon.
pub const EXPIRING_SOON_DAYS: u64 = 30;

/// License counts by expiry state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseStats {
    /// Every license.
    pub total: u64,
    /// Expiry date today or later.
    pub active: u64,
    /// Expiry date before today.
    pub expired: u64,
    /// Expiry date within the next [`EXPIRING_SOON_DAYS`] days, inclusive.
    pub expiring_soon: u64,
    /// Counts per stored `status` label.
    pub by_status: BTreeMap<String, u64>,
}

impl LicenseStats {
    /// Compute statistics as of `today`.
    ///
    /// Licenses whose expiry date cannot be parsed count toward `total` and
    /// `by_status` only.
    pub fn compute<'a, I>(licenses: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        let horizon = today
            .checked_add_days(Days::new(EXPIRING_SOON_DAYS))
            .unwrap_or(NaiveDate::MAX);
        let mut stats = Self::default();

        for license in licenses {
            stats.total += 1;
            let status = get_str(license, "status").unwrap_or("active").to_lowercase();
            *stats.by_status.entry(status).or_default() += 1;

            let expiry = get_str(license, "expiryDate")
                .or_else(|| get_str(license, "expiry_date"))
                .and_then(parse_date);
            let Some(expiry) = expiry else { continue };

            if expiry < today {
                stats.expired += 1;
            } else {
                stats.active += 1;
                if expiry <= horizon {
                    stats.expiring_soon += 1;
                }
            }
        }
        stats
    }
}

/// Spending within one expense category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    /// Category id as stored on the expenses.
    pub category_id: String,
    /// Resolved category name, if the category still exists.
    pub category_name: Option<String>,
    /// Sum of expense amounts.
    pub total: Decimal,
    /// Number of expenses.
    pub count: u64,
}

/// Personal expense totals per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseSummary {
    /// Per-category totals, largest first.
    pub categories: Vec<CategoryTotal>,
    /// Sum over every expense.
    pub grand_total: Decimal,
    /// Number of expenses.
    pub count: u64,
}

impl ExpenseSummary {
    /// Summarize `expenses`, resolving names through `category_names`
    /// (category id → name). Fails if a total leaves the decimal range.
    pub fn compute<'a, I>(
        expenses: I,
        category_names: &HashMap<String, String>,
    ) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        let mut per_category: HashMap<String, (Decimal, u64)> = HashMap::new();
        let mut summary = Self::default();

        for expense in expenses {
            let amount = amount_or_zero(expense, "amount");
            let category = get_str(expense, "categoryId")
                .or_else(|| get_str(expense, "category_id"))
                .unwrap_or("uncategorized")
                .to_string();
            let entry = per_category.entry(category).or_default();
            entry.0 = entry
                .0
                .checked_add(amount)
                .ok_or(CoreError::Overflow("expense category"))?;
            entry.1 += 1;
            summary.grand_total = summary
                .grand_total
                .checked_add(amount)
                .ok_or(CoreError::Overflow("expense"))?;
            summary.count += 1;
        }

        summary.categories = per_category
            .into_iter()
            .map(|(category_id, (total, count))| CategoryTotal {
                category_name: category_names.get(&category_id).cloned(),
                category_id,
                total,
                count,
            })
            .collect();
        summary
            .categories
            .sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category_id.cmp(&b.category_id)));
        Ok(summary)
    }

    /// Response body.
    pub fn to_json(&self) -> Value {
        let categories: Vec<Value> = self
            .categories
            .iter()
            .map(|c| {
                json!({
                    "categoryId": c.category_id,
                    "categoryName": c.category_name,
                    "total": to_json(c.total),
                    "count": c.count,
                })
            })
            .collect();
        json!({
            "categories": categories,
            "grandTotal": to_json(self.grand_total),
            "count": self.count,
        })
    }
}
