//! # Agent Financial Rollup
//!
//! An agent's summary fields are a pure function of the agent's packages:
//! each package is classified as hajj, umrah or other by its type text, and
//! billed / paid / due are summed per category. The API recomputes the whole
//! rollup on every package write rather than applying deltas, so a missed
//! update heals on the next write.
//!
//! Sums are checked; a rollup whose totals leave the decimal range fails
//! with [`CoreError::Overflow`] instead of storing wrong figures.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::derive::in_range;
use crate::error::{CoreError, ValidationError};
use crate::money::{amount_or_zero, sum_object, to_json};

/// Package category derived from its free-text type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// Type text mentions hajj.
    Hajj,
    /// Type text mentions umrah.
    Umrah,
    /// Anything else. Counted in overall totals only.
    Other,
}

impl PackageKind {
    /// Classify a package type string. Matching is case-insensitive and
    /// substring-based, so "Hajj Premium 2025" is hajj.
    pub fn classify(package_type: &str) -> Self {
        let lowered = package_type.to_lowercase();
        if lowered.contains("haj") {
            Self::Hajj
        } else if lowered.contains("umra") {
            Self::Umrah
        } else {
            Self::Other
        }
    }

    /// Classify a stored package document.
    pub fn of(package: &Map<String, Value>) -> Self {
        package
            .get("packageType")
            .or_else(|| package.get("package_type"))
            .or_else(|| package.get("type"))
            .and_then(Value::as_str)
            .map(Self::classify)
            .unwrap_or(Self::Other)
    }
}

/// Billed amount of a package.
pub fn package_billed(package: &Map<String, Value>) -> Decimal {
    amount_or_zero(package, "totalPrice")
}

/// Paid amount of a package.
pub fn package_paid(package: &Map<String, Value>) -> Decimal {
    amount_or_zero(package, "paidAmount")
}

/// Recompute a package's derived money fields in place:
/// `totalCost`, `dueAmount` and `profit`. Nothing is written on overflow.
pub fn derive_package_fields(package: &mut Map<String, Value>) -> Result<(), ValidationError> {
    let billed = package_billed(package);
    let paid = package_paid(package);
    let total_cost = in_range(sum_object(package.get("costs")), "totalCost")?;
    let due = in_range(billed.checked_sub(paid), "dueAmount")?;
    let profit = in_range(billed.checked_sub(total_cost), "profit")?;
    package.insert("totalCost".into(), to_json(total_cost));
    package.insert("dueAmount".into(), to_json(due));
    package.insert("profit".into(), to_json(profit));
    Ok(())
}

/// Per-category money totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Sum of billed amounts.
    pub bill: Decimal,
    /// Sum of paid amounts.
    pub paid: Decimal,
    /// Billed minus paid.
    pub due: Decimal,
    /// Number of packages.
    pub count: u64,
}

impl Totals {
    fn add(&mut self, bill: Decimal, paid: Decimal, scope: &'static str) -> Result<(), CoreError> {
        let overflow = || CoreError::Overflow(scope);
        let next_bill = self.bill.checked_add(bill).ok_or_else(overflow)?;
        let next_paid = self.paid.checked_add(paid).ok_or_else(overflow)?;
        self.due = next_bill.checked_sub(next_paid).ok_or_else(overflow)?;
        self.bill = next_bill;
        self.paid = next_paid;
        self.count += 1;
        Ok(())
    }
}

/// Summary figures for one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentRollup {
    /// Hajj packages.
    pub hajj: Totals,
    /// Umrah packages.
    pub umrah: Totals,
    /// Every package, including unclassified ones.
    pub total: Totals,
}

impl AgentRollup {
    /// Sum a set of packages.
    ///
    /// # Errors
    ///
    /// [`CoreError::Overflow`] naming the category whose totals left the
    /// decimal range.
    pub fn compute<'a, I>(packages: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        let mut rollup = Self::default();
        for package in packages {
            let bill = package_billed(package);
            let paid = package_paid(package);
            match PackageKind::of(package) {
                PackageKind::Hajj => rollup.hajj.add(bill, paid, "hajj")?,
                PackageKind::Umrah => rollup.umrah.add(bill, paid, "umrah")?,
                PackageKind::Other => {}
            }
            rollup.total.add(bill, paid, "total")?;
        }
        Ok(rollup)
    }

    /// The agent fields this rollup overwrites.
    pub fn to_fields(&self, updated_at: &str) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("hajjBill".into(), to_json(self.hajj.bill));
        fields.insert("hajjPaid".into(), to_json(self.hajj.paid));
        fields.insert("hajjDue".into(), to_json(self.hajj.due));
        fields.insert("umrahBill".into(), to_json(self.umrah.bill));
        fields.insert("umrahPaid".into(), to_json(self.umrah.paid));
        fields.insert("umrahDue".into(), to_json(self.umrah.due));
        fields.insert("totalBill".into(), to_json(self.total.bill));
        fields.insert("totalPaid".into(), to_json(self.total.paid));
        fields.insert("totalDue".into(), to_json(self.total.due));
        fields.insert("totalHajjPackages".into(), Value::from(self.hajj.count));
        fields.insert("totalUmrahPackages".into(), Value::from(self.umrah.count));
        fields.insert("totalPackages".into(), Value::from(self.total.count));
        fields.insert("summaryUpdatedAt".into(), Value::String(updated_at.to_string()));
        fields
    }
}
