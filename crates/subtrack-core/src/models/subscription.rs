//! Subscription model
//!
//! A user's recurring subscription to a named service, billed per calendar
//! month from `start_month` until `end_month` (or indefinitely).

use crate::billing::{BillingRecord, CalendarMonth};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted length for a service name
pub const MAX_SERVICE_NAME_LEN: usize = 255;

/// Subscription entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier (assigned by storage on create)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Subscribed service (e.g., "Netflix")
    pub service_name: String,

    /// Monthly price in the smallest currency unit
    pub price: u32,

    /// First billed month
    pub start_month: CalendarMonth,

    /// Last billed month; `None` while the subscription is still running
    pub end_month: Option<CalendarMonth>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Build a not-yet-persisted subscription
    pub fn new(
        user_id: Uuid,
        service_name: impl Into<String>,
        price: u32,
        start_month: CalendarMonth,
        end_month: Option<CalendarMonth>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            user_id,
            service_name: service_name.into(),
            price,
            start_month,
            end_month,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate subscription fields
    pub fn validate(&self) -> Result<(), String> {
        if self.service_name.trim().is_empty() {
            return Err("Service name cannot be empty".to_string());
        }

        if self.service_name.chars().count() > MAX_SERVICE_NAME_LEN {
            return Err(format!(
                "Service name cannot exceed {} characters",
                MAX_SERVICE_NAME_LEN
            ));
        }

        if let Some(end) = self.end_month {
            if end < self.start_month {
                return Err(format!(
                    "End month {} is before start month {}",
                    end, self.start_month
                ));
            }
        }

        Ok(())
    }

    /// Project the billable facts consumed by the aggregation engine
    pub fn billing_record(&self) -> BillingRecord {
        BillingRecord {
            owner: self.user_id,
            service_name: self.service_name.clone(),
            monthly_price: self.price,
            start_month: self.start_month,
            end_month: self.end_month,
        }
    }
}

impl From<Subscription> for BillingRecord {
    fn from(sub: Subscription) -> Self {
        BillingRecord {
            owner: sub.user_id,
            service_name: sub.service_name,
            monthly_price: sub.price,
            start_month: sub.start_month,
            end_month: sub.end_month,
        }
    }
}

/// Partial change set for an existing subscription
///
/// Absent fields keep their stored value. The owner cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub service_name: Option<String>,
    pub price: Option<u32>,
    pub start_month: Option<CalendarMonth>,
    pub end_month: Option<CalendarMonth>,
}

impl SubscriptionUpdate {
    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.service_name.is_none()
            && self.price.is_none()
            && self.start_month.is_none()
            && self.end_month.is_none()
    }

    /// Apply the changes on top of `current`, returning the merged entity
    pub fn apply_to(&self, current: &Subscription) -> Subscription {
        let mut merged = current.clone();

        if let Some(name) = &self.service_name {
            merged.service_name = name.clone();
        }
        if let Some(price) = self.price {
            merged.price = price;
        }
        if let Some(start) = self.start_month {
            merged.start_month = start;
        }
        if let Some(end) = self.end_month {
            merged.end_month = Some(end);
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> CalendarMonth {
        s.parse().unwrap()
    }

    fn create_test_subscription() -> Subscription {
        Subscription::new(Uuid::new_v4(), "Netflix", 500, month("01-2025"), None)
    }

    #[test]
    fn test_valid_subscription() {
        let sub = create_test_subscription();
        assert!(sub.validate().is_ok());
        assert!(sub.id.is_nil());
    }

    #[test]
    fn test_blank_service_name_rejected() {
        let mut sub = create_test_subscription();
        sub.service_name = "   ".to_string();
        assert!(sub.validate().is_err());
    }

    #[test]
    fn test_oversized_service_name_rejected() {
        let mut sub = create_test_subscription();
        sub.service_name = "x".repeat(MAX_SERVICE_NAME_LEN + 1);
        assert!(sub.validate().is_err());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut sub = create_test_subscription();
        sub.end_month = Some(month("12-2024"));
        assert!(sub.validate().is_err());

        sub.end_month = Some(month("01-2025"));
        assert!(sub.validate().is_ok());
    }

    #[test]
    fn test_service_name_limit_counts_characters() {
        let mut sub = create_test_subscription();

        // Two bytes per character in UTF-8
        sub.service_name = "я".repeat(200);
        assert!(sub.validate().is_ok());

        sub.service_name = "я".repeat(MAX_SERVICE_NAME_LEN);
        assert!(sub.validate().is_ok());

        sub.service_name = "я".repeat(MAX_SERVICE_NAME_LEN + 1);
        assert!(sub.validate().is_err());
    }

    #[test]
    fn test_billing_record_projection() {
        let mut sub = create_test_subscription();
        sub.end_month = Some(month("03-2025"));

        let record = sub.billing_record();
        assert_eq!(record.owner, sub.user_id);
        assert_eq!(record.service_name, "Netflix");
        assert_eq!(record.monthly_price, 500);
        assert_eq!(record.end_month, Some(month("03-2025")));
        assert_eq!(BillingRecord::from(sub), record);
    }

    #[test]
    fn test_update_keeps_absent_fields() {
        let sub = create_test_subscription();
        let update = SubscriptionUpdate {
            price: Some(650),
            end_month: Some(month("09-2025")),
            ..Default::default()
        };

        let merged = update.apply_to(&sub);
        assert_eq!(merged.price, 650);
        assert_eq!(merged.end_month, Some(month("09-2025")));
        assert_eq!(merged.service_name, sub.service_name);
        assert_eq!(merged.start_month, sub.start_month);
        assert_eq!(merged.user_id, sub.user_id);
    }

    #[test]
    fn test_empty_update() {
        assert!(SubscriptionUpdate::default().is_empty());
        assert!(!SubscriptionUpdate {
            service_name: Some("Hulu".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
