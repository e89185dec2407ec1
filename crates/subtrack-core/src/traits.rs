//! Common traits for repositories
//!
//! Defines the storage abstraction the service layer is written against.

use crate::billing::{BillingRecord, QueryWindow};
use crate::error::AppError;
use crate::models::{Subscription, SubscriptionUpdate};
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Delete entity by ID
    async fn delete(&self, id: ID) -> Result<bool, AppError>;
}

/// Subscription repository trait with specialized methods
#[async_trait]
pub trait SubscriptionRepository: Repository<Subscription, Uuid> {
    /// Fetch candidate billing records for an aggregation window
    ///
    /// Implementations may push the window's date range and filters down to
    /// storage, but must return at least every record that genuinely
    /// overlaps the window and matches its filters. Returning a superset is
    /// always correct.
    async fn find_billable(&self, window: &QueryWindow) -> Result<Vec<BillingRecord>, AppError>;

    /// Apply a partial update to the stored subscription `id`
    ///
    /// Read, merge and write happen as one atomic step, so concurrent
    /// partial updates to different fields never overwrite each other. The
    /// merged entity must pass `Subscription::validate`, otherwise nothing
    /// is written and `AppError::Validation` is returned.
    async fn apply_update(
        &self,
        id: Uuid,
        changes: &SubscriptionUpdate,
    ) -> Result<Subscription, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(0, 10); // page 0 becomes 1
        assert_eq!(p.page, 1);

        let p = Pagination::new(1, 2000); // per_page capped at 1000
        assert_eq!(p.per_page, 1000);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(95, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(0, 1, 10);
        assert_eq!(meta.total_pages, 0);

        let meta = PaginationMeta::new(101, 1, 10);
        assert_eq!(meta.total_pages, 11);
    }
}
