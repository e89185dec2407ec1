//! Billing period model
//!
//! A subscription's billable window and the query window it is billed
//! against, both expressed as inclusive calendar-month intervals.

use super::CalendarMonth;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One subscription's billable facts, as seen by the aggregation engine
///
/// `end_month` of `None` means the subscription is open-ended. A record whose
/// `end_month` precedes its `start_month` is tolerated and bills nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRecord<O = Uuid> {
    /// Subscription owner
    pub owner: O,

    /// Service name, matched exactly by the service filter
    pub service_name: String,

    /// Price per calendar month in the smallest currency unit
    pub monthly_price: u32,

    /// First billable month (inclusive)
    pub start_month: CalendarMonth,

    /// Last billable month (inclusive), if the subscription has ended
    pub end_month: Option<CalendarMonth>,
}

impl<O> BillingRecord<O> {
    /// Whether the subscription has no known termination month
    #[inline]
    pub fn is_open_ended(&self) -> bool {
        self.end_month.is_none()
    }
}

/// An aggregation request: an inclusive month range plus optional filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow<O = Uuid> {
    /// First month of the window (inclusive)
    pub from: CalendarMonth,

    /// Last month of the window (inclusive)
    pub to: CalendarMonth,

    /// When set, only records owned by this owner contribute
    pub owner_filter: Option<O>,

    /// When set, only records with exactly this service name contribute
    pub service_name_filter: Option<String>,
}

impl<O> QueryWindow<O> {
    /// Unfiltered window over `[from, to]`
    pub fn new(from: CalendarMonth, to: CalendarMonth) -> Self {
        Self {
            from,
            to,
            owner_filter: None,
            service_name_filter: None,
        }
    }

    /// Restrict the window to a single owner
    pub fn with_owner(mut self, owner: O) -> Self {
        self.owner_filter = Some(owner);
        self
    }

    /// Restrict the window to a single service name
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name_filter = Some(service_name.into());
        self
    }

    /// An inverted window (`from > to`) covers no months
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }

    /// Number of months the window spans (0 when inverted)
    pub fn span_months(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            u32::try_from(self.to.diff(self.from) + 1).unwrap_or(u32::MAX)
        }
    }
}

impl<O: PartialEq> QueryWindow<O> {
    /// Whether a record passes the owner and service-name filters
    ///
    /// Dates are not considered here; see [`super::overlap_months`].
    pub fn matches(&self, record: &BillingRecord<O>) -> bool {
        let owner_ok = self
            .owner_filter
            .as_ref()
            .map_or(true, |owner| *owner == record.owner);
        let service_ok = self
            .service_name_filter
            .as_deref()
            .map_or(true, |name| name == record.service_name);

        owner_ok && service_ok
    }
}
