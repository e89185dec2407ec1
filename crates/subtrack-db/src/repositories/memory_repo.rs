//! In-memory subscription repository
//!
//! Keeps subscriptions in a `HashMap` behind an async `RwLock`. Enforces the
//! same uniqueness rule as the database schema: one subscription per
//! (user, service, start month).

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use subtrack_core::{
    billing::{BillingRecord, QueryWindow},
    models::{Subscription, SubscriptionUpdate},
    traits::{Repository, SubscriptionRepository},
    AppError, AppResult,
};
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

/// In-memory implementation of SubscriptionRepository
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    items: RwLock<HashMap<Uuid, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn conflicts(existing: &Subscription, entity: &Subscription) -> bool {
        existing.id != entity.id
            && existing.user_id == entity.user_id
            && existing.service_name == entity.service_name
            && existing.start_month == entity.start_month
    }

    fn already_exists(entity: &Subscription) -> AppError {
        AppError::AlreadyExists(format!(
            "Subscription to {} starting {} already exists for user {}",
            entity.service_name, entity.start_month, entity.user_id
        ))
    }
}

#[async_trait]
impl Repository<Subscription, Uuid> for InMemorySubscriptionRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Subscription>> {
        let items = self.items.read().await;
        let mut all: Vec<Subscription> = items.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(all
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.items.read().await.len() as i64)
    }

    #[instrument(skip(self, entity), fields(user_id = %entity.user_id))]
    async fn create(&self, entity: &Subscription) -> AppResult<Subscription> {
        let mut items = self.items.write().await;

        if items.values().any(|existing| Self::conflicts(existing, entity)) {
            return Err(Self::already_exists(entity));
        }

        let now = Utc::now();
        let mut stored = entity.clone();
        stored.id = Uuid::new_v4();
        stored.created_at = now;
        stored.updated_at = now;

        debug!("Stored subscription {}", stored.id);
        items.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.items.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_billable(&self, _window: &QueryWindow) -> AppResult<Vec<BillingRecord>> {
        // Unfiltered superset; the billing engine applies window and filters.
        Ok(self
            .items
            .read()
            .await
            .values()
            .map(Subscription::billing_record)
            .collect())
    }

    #[instrument(skip(self, changes))]
    async fn apply_update(
        &self,
        id: Uuid,
        changes: &SubscriptionUpdate,
    ) -> AppResult<Subscription> {
        // The write lock spans read, merge and write
        let mut items = self.items.write().await;

        let current = items
            .get(&id)
            .ok_or_else(|| AppError::SubscriptionNotFound(id.to_string()))?;

        let mut merged = changes.apply_to(current);
        merged.validate().map_err(AppError::Validation)?;

        if items.values().any(|existing| Self::conflicts(existing, &merged)) {
            return Err(Self::already_exists(&merged));
        }

        merged.updated_at = Utc::now();
        items.insert(id, merged.clone());

        debug!("Updated subscription {}", id);
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtrack_core::billing::CalendarMonth;

    fn month(s: &str) -> CalendarMonth {
        s.parse().unwrap()
    }

    fn sample(user: Uuid, name: &str, start: &str) -> Subscription {
        Subscription::new(user, name, 400, month(start), None)
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let repo = InMemorySubscriptionRepository::new();
        let created = repo
            .create(&sample(Uuid::new_v4(), "Netflix", "01-2025"))
            .await
            .unwrap();

        assert!(!created.id.is_nil());
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();
        repo.create(&sample(user, "Netflix", "01-2025")).await.unwrap();

        let result = repo.create(&sample(user, "Netflix", "01-2025")).await;
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));

        // Same service with a different start month is a separate subscription
        assert!(repo.create(&sample(user, "Netflix", "02-2025")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemorySubscriptionRepository::new();
        let changes = SubscriptionUpdate {
            price: Some(1),
            ..Default::default()
        };

        let result = repo.apply_update(Uuid::new_v4(), &changes).await;
        assert!(matches!(result, Err(AppError::SubscriptionNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let repo = InMemorySubscriptionRepository::new();
        let created = repo
            .create(&sample(Uuid::new_v4(), "Hulu", "01-2025"))
            .await
            .unwrap();

        let changes = SubscriptionUpdate {
            price: Some(999),
            ..Default::default()
        };
        let updated = repo.apply_update(created.id, &changes).await.unwrap();

        assert_eq!(updated.price, 999);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_onto_existing_key_conflicts() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();
        repo.create(&sample(user, "Netflix", "01-2025")).await.unwrap();
        let spotify = repo.create(&sample(user, "Spotify", "01-2025")).await.unwrap();

        let rename = SubscriptionUpdate {
            service_name: Some("Netflix".to_string()),
            ..Default::default()
        };
        let result = repo.apply_update(spotify.id, &rename).await;
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));

        // Nothing was written
        let stored = repo.find_by_id(spotify.id).await.unwrap().unwrap();
        assert_eq!(stored.service_name, "Spotify");
    }

    #[tokio::test]
    async fn test_invalid_merge_is_not_written() {
        let repo = InMemorySubscriptionRepository::new();
        let created = repo
            .create(&sample(Uuid::new_v4(), "Hulu", "03-2025"))
            .await
            .unwrap();

        let changes = SubscriptionUpdate {
            end_month: Some(month("01-2025")),
            ..Default::default()
        };
        let result = repo.apply_update(created.id, &changes).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_concurrent_partial_updates_both_land() {
        let repo = std::sync::Arc::new(InMemorySubscriptionRepository::new());
        let created = repo
            .create(&sample(Uuid::new_v4(), "Hulu", "01-2025"))
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for i in 0..20u32 {
            let repo = repo.clone();
            let changes = if i % 2 == 0 {
                SubscriptionUpdate {
                    price: Some(500),
                    ..Default::default()
                }
            } else {
                SubscriptionUpdate {
                    end_month: Some(month("12-2025")),
                    ..Default::default()
                }
            };
            tasks.push(tokio::spawn(async move {
                repo.apply_update(created.id, &changes).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.price, 500);
        assert_eq!(stored.end_month, Some(month("12-2025")));
    }

    #[tokio::test]
    async fn test_pagination_and_delete() {
        let repo = InMemorySubscriptionRepository::new();
        let user = Uuid::new_v4();
        for name in ["A", "B", "C"] {
            repo.create(&sample(user, name, "01-2025")).await.unwrap();
        }

        assert_eq!(repo.find_all(2, 0).await.unwrap().len(), 2);
        assert_eq!(repo.find_all(2, 2).await.unwrap().len(), 1);
        assert!(repo.find_all(2, 4).await.unwrap().is_empty());

        let first = repo.find_all(1, 0).await.unwrap().remove(0);
        assert!(repo.delete(first.id).await.unwrap());
        assert!(!repo.delete(first.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_billable_returns_all_records() {
        let repo = InMemorySubscriptionRepository::new();
        repo.create(&sample(Uuid::new_v4(), "A", "01-2020")).await.unwrap();
        repo.create(&sample(Uuid::new_v4(), "B", "01-2030")).await.unwrap();

        let window = QueryWindow::new(month("01-2025"), month("02-2025"));
        assert_eq!(repo.find_billable(&window).await.unwrap().len(), 2);
    }
}
