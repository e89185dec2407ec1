//! Overlap calculation and billing aggregation
//!
//! Pure arithmetic over [`CalendarMonth`] intervals. Nothing here performs
//! I/O or fails: inverted records and inverted windows contribute zero.

use super::{BillingRecord, QueryWindow};
use serde::Serialize;
use std::iter::Sum;

/// Number of whole calendar months shared by a record and a window
///
/// An open-ended record is clipped at the window's own end. Both ends are
/// inclusive, so a single shared month counts as 1.
pub fn overlap_months<O>(record: &BillingRecord<O>, window: &QueryWindow<O>) -> u32 {
    let effective_end = record.end_month.unwrap_or(window.to);

    let overlap_start = record.start_month.max(window.from);
    let overlap_end = effective_end.min(window.to);

    if overlap_start > overlap_end {
        return 0;
    }

    u32::try_from(overlap_end.diff(overlap_start) + 1).unwrap_or(u32::MAX)
}

/// Amount a single record bills inside the window, ignoring filters
#[inline]
pub fn record_amount<O>(record: &BillingRecord<O>, window: &QueryWindow<O>) -> u64 {
    u64::from(overlap_months(record, window)) * u64::from(record.monthly_price)
}

/// Running billing total in the smallest currency unit
///
/// Addition saturates instead of wrapping. Partial totals computed over
/// disjoint chunks of a record set can be merged in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BillingTotal(u64);

impl BillingTotal {
    pub const ZERO: BillingTotal = BillingTotal(0);

    /// Fold one record into the total, applying the window's filters
    pub fn add<O: PartialEq>(self, record: &BillingRecord<O>, window: &QueryWindow<O>) -> Self {
        if !window.matches(record) {
            return self;
        }
        BillingTotal(self.0.saturating_add(record_amount(record, window)))
    }

    /// Combine two partial totals
    #[inline]
    pub fn merge(self, other: BillingTotal) -> Self {
        BillingTotal(self.0.saturating_add(other.0))
    }

    /// The accumulated amount
    #[inline]
    pub fn amount(self) -> u64 {
        self.0
    }
}

impl Sum for BillingTotal {
    fn sum<I: Iterator<Item = BillingTotal>>(iter: I) -> Self {
        iter.fold(BillingTotal::ZERO, BillingTotal::merge)
    }
}

impl From<BillingTotal> for u64 {
    fn from(total: BillingTotal) -> Self {
        total.0
    }
}

/// Total amount billable for `records` inside `window`
///
/// Single linear pass; the input may be any superset of the genuinely
/// overlapping records, in any order.
pub fn total_billable<'a, O, I>(records: I, window: &QueryWindow<O>) -> u64
where
    O: PartialEq + 'a,
    I: IntoIterator<Item = &'a BillingRecord<O>>,
{
    records
        .into_iter()
        .fold(BillingTotal::ZERO, |acc, record| acc.add(record, window))
        .amount()
}
