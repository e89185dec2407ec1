//! Subscription service
//!
//! Orchestrates subscription CRUD over a `SubscriptionRepository` and answers
//! billing-period questions with the aggregation engine in
//! `subtrack_core::billing`.

use std::sync::Arc;
use subtrack_core::{
    billing::{total_billable, QueryWindow},
    models::{Subscription, SubscriptionUpdate},
    traits::{Pagination, SubscriptionRepository},
    AppError, AppResult,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Subscription management and billing totals
#[derive(Clone)]
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    /// Create a new subscription service
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repo }
    }

    /// Validate and persist a new subscription
    #[instrument(skip(self, subscription), fields(user_id = %subscription.user_id))]
    pub async fn add(&self, subscription: Subscription) -> AppResult<Subscription> {
        subscription.validate().map_err(AppError::Validation)?;

        let created = self.repo.create(&subscription).await?;
        info!(
            "Created subscription {} to {} at {}/month",
            created.id, created.service_name, created.price
        );

        Ok(created)
    }

    /// Fetch a subscription by id
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> AppResult<Subscription> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::SubscriptionNotFound(id.to_string()))
    }

    /// One page of subscriptions plus the total count
    #[instrument(skip(self))]
    pub async fn list(&self, pagination: &Pagination) -> AppResult<(Vec<Subscription>, i64)> {
        let items = self
            .repo
            .find_all(pagination.limit(), pagination.offset())
            .await?;
        let total = self.repo.count().await?;

        debug!("Listed {} of {} subscriptions", items.len(), total);
        Ok((items, total))
    }

    /// Apply a partial update to an existing subscription
    ///
    /// The merged entity is re-validated, so an update that moves the start
    /// month past the stored end month is rejected.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: Uuid, changes: SubscriptionUpdate) -> AppResult<Subscription> {
        if changes.is_empty() {
            return Err(AppError::InvalidInput(
                "update must change at least one field".to_string(),
            ));
        }

        let updated = self.repo.apply_update(id, &changes).await?;
        info!("Updated subscription {}", updated.id);

        Ok(updated)
    }

    /// Remove a subscription
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            warn!("Delete requested for unknown subscription {}", id);
            return Err(AppError::SubscriptionNotFound(id.to_string()));
        }

        info!("Deleted subscription {}", id);
        Ok(())
    }

    /// Total amount billed over the window, honoring its filters
    #[instrument(
        skip(self, window),
        fields(from = %window.from, to = %window.to)
    )]
    pub async fn total_sum(&self, window: &QueryWindow) -> AppResult<u64> {
        if window.is_empty() {
            debug!("Inverted window, nothing to bill");
            return Ok(0);
        }

        let records = self.repo.find_billable(window).await?;
        let total = total_billable(&records, window);

        info!(
            records = records.len(),
            total, "Computed subscription total"
        );

        Ok(total)
    }
}
