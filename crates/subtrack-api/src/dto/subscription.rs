//! Subscription DTOs
//!
//! Request and response types for subscription endpoints. Months travel as
//! `MM-YYYY` strings and ids as UUID strings; both are parsed here so a
//! malformed value is reported as a 400 naming the offending field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtrack_core::billing::{CalendarMonth, QueryWindow};
use subtrack_core::models::{Subscription, SubscriptionUpdate, MAX_SERVICE_NAME_LEN};
use subtrack_core::{AppError, AppResult};
use uuid::Uuid;
use validator::Validate;

/// Parse a required `MM-YYYY` field
fn parse_month(field: &'static str, value: &str) -> AppResult<CalendarMonth> {
    value
        .trim()
        .parse()
        .map_err(AppError::invalid_month(field))
}

/// Parse an optional `MM-YYYY` field; blank counts as absent
fn parse_optional_month(
    field: &'static str,
    value: Option<&str>,
) -> AppResult<Option<CalendarMonth>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_month(field, v).map(Some),
    }
}

fn parse_uuid(field: &str, value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::InvalidInput(format!("{}: '{}' is not a valid UUID", field, value)))
}

fn parse_price(value: i64) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::Validation(format!("price must be a non-negative integer, got {}", value)))
}

/// Subscription creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscriptionCreateRequest {
    /// Subscribed service
    #[validate(length(min = 1, max = 255, message = "service_name must be 1-255 characters"))]
    pub service_name: String,

    /// Monthly price in the smallest currency unit
    #[validate(range(min = 0, max = 2147483647, message = "price must be a non-negative integer"))]
    pub price: i64,

    /// Owning user (UUID)
    pub user_id: String,

    /// First billed month, `MM-YYYY`
    pub start_date: String,

    /// Last billed month, `MM-YYYY`; omitted for open-ended subscriptions
    #[serde(default)]
    pub end_date: Option<String>,
}

impl SubscriptionCreateRequest {
    /// Parse into a not-yet-persisted subscription
    pub fn into_subscription(self) -> AppResult<Subscription> {
        let user_id = parse_uuid("user_id", &self.user_id)?;
        let start = parse_month("start_date", &self.start_date)?;
        let end = parse_optional_month("end_date", self.end_date.as_deref())?;
        let price = parse_price(self.price)?;

        let subscription = Subscription::new(user_id, self.service_name.trim(), price, start, end);
        subscription.validate().map_err(AppError::Validation)?;

        Ok(subscription)
    }
}

/// Subscription update request
///
/// Every field is optional; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubscriptionUpdateRequest {
    #[validate(length(min = 1, max = 255, message = "service_name must be 1-255 characters"))]
    pub service_name: Option<String>,

    #[validate(range(min = 0, max = 2147483647, message = "price must be a non-negative integer"))]
    pub price: Option<i64>,

    pub start_date: Option<String>,

    pub end_date: Option<String>,
}

impl SubscriptionUpdateRequest {
    /// Parse into a partial change set
    pub fn into_update(self) -> AppResult<SubscriptionUpdate> {
        let service_name = match self.service_name.as_deref().map(str::trim) {
            Some("") => {
                return Err(AppError::Validation(
                    "service_name cannot be blank".to_string(),
                ))
            }
            Some(name) if name.chars().count() > MAX_SERVICE_NAME_LEN => {
                return Err(AppError::Validation(format!(
                    "service_name cannot exceed {} characters",
                    MAX_SERVICE_NAME_LEN
                )))
            }
            other => other.map(str::to_string),
        };

        Ok(SubscriptionUpdate {
            service_name,
            price: self.price.map(parse_price).transpose()?,
            start_month: parse_optional_month("start_date", self.start_date.as_deref())?,
            end_month: parse_optional_month("end_date", self.end_date.as_deref())?,
        })
    }
}

/// Subscription response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_name: String,
    pub price: u32,
    pub start_date: CalendarMonth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<CalendarMonth>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id,
            user_id: sub.user_id,
            service_name: sub.service_name,
            price: sub.price,
            start_date: sub.start_month,
            end_date: sub.end_month,
            created_at: sub.created_at,
            updated_at: sub.updated_at,
        }
    }
}

/// Query parameters for the billing total
#[derive(Debug, Clone, Deserialize)]
pub struct TotalSumQuery {
    /// First month of the window, `MM-YYYY`
    pub start_date: String,

    /// Last month of the window, `MM-YYYY`
    pub end_date: String,

    /// Restrict to one user (UUID)
    pub user_id: Option<String>,

    /// Restrict to one service name (exact match)
    pub service_name: Option<String>,
}

impl TotalSumQuery {
    /// Parse into an aggregation window; blank filters count as absent
    pub fn into_window(self) -> AppResult<QueryWindow> {
        let from = parse_month("start_date", &self.start_date)?;
        let to = parse_month("end_date", &self.end_date)?;
        let mut window = QueryWindow::new(from, to);

        if let Some(user) = self.user_id.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            window = window.with_owner(parse_uuid("user_id", user)?);
        }

        if let Some(name) = self.service_name.filter(|n| !n.trim().is_empty()) {
            window = window.with_service_name(name);
        }

        Ok(window)
    }
}

/// Billing total response
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TotalSumResponse {
    pub total_sum: u64,
}
