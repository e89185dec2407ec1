//! Billing-period aggregation engine
//!
//! Computes how much a set of subscriptions bills over a window of calendar
//! months. Billing is whole-month only: both ends of every interval are
//! inclusive and there is no proration.
//!
//! The engine is a pure function from `(records, window)` to a total. It
//! holds no state and never fails; a zero total is a normal result.

mod aggregate;
mod month;
mod period;

pub use aggregate::{overlap_months, record_amount, total_billable, BillingTotal};
pub use month::{CalendarMonth, MonthError};
pub use period::{BillingRecord, QueryWindow};
