//! Subscription repository implementation
//!
//! Provides PostgreSQL-backed storage for subscriptions. Months are persisted
//! as the first day of the month in `DATE` columns.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use subtrack_core::{
    billing::{BillingRecord, CalendarMonth, QueryWindow},
    models::{Subscription, SubscriptionUpdate},
    traits::{Repository, SubscriptionRepository},
    AppError, AppResult,
};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of SubscriptionRepository
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Convert a price to the `INTEGER` column type
    fn price_to_db(price: u32) -> AppResult<i32> {
        i32::try_from(price)
            .map_err(|_| AppError::InvalidInput(format!("price {} is too large", price)))
    }

    /// Map a write error, turning unique violations into `AlreadyExists`
    fn write_error(e: sqlx::Error, entity: &Subscription, action: &str) -> AppError {
        let duplicate = matches!(
            &e,
            sqlx::Error::Database(db) if db.is_unique_violation()
        );

        if duplicate {
            AppError::AlreadyExists(format!(
                "Subscription to {} starting {} already exists for user {}",
                entity.service_name, entity.start_month, entity.user_id
            ))
        } else {
            error!("Database error trying to {} subscription: {}", action, e);
            AppError::Database(format!("Failed to {} subscription: {}", action, e))
        }
    }
}

#[async_trait]
impl Repository<Subscription, Uuid> for PgSubscriptionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        debug!("Finding subscription by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            SELECT
                id, user_id, service_name, price,
                start_date, end_date,
                created_at, updated_at
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding subscription {}: {}", id, e);
            AppError::Database(format!("Failed to find subscription: {}", e))
        })?;

        result.map(Subscription::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Subscription>> {
        debug!(
            "Finding all subscriptions with limit {} offset {}",
            limit, offset
        );

        let rows = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            SELECT
                id, user_id, service_name, price,
                start_date, end_date,
                created_at, updated_at
            FROM subscriptions
            ORDER BY created_at, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing subscriptions: {}", e);
            AppError::Database(format!("Failed to fetch subscriptions: {}", e))
        })?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting subscriptions: {}", e);
                AppError::Database(format!("Failed to count subscriptions: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity), fields(user_id = %entity.user_id))]
    async fn create(&self, entity: &Subscription) -> AppResult<Subscription> {
        debug!("Creating subscription to {}", entity.service_name);

        let row = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (
                user_id, service_name, price, start_date, end_date
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
                id, user_id, service_name, price,
                start_date, end_date,
                created_at, updated_at
            "#,
        )
        .bind(entity.user_id)
        .bind(&entity.service_name)
        .bind(Self::price_to_db(entity.price)?)
        .bind(entity.start_month.first_day())
        .bind(entity.end_month.map(|m| m.first_day()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, entity, "create"))?;

        row.try_into()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting subscription: {}", id);

        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting subscription {}: {}", id, e);
                AppError::Database(format!("Failed to delete subscription: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    #[instrument(skip(self), fields(from = %window.from, to = %window.to))]
    async fn find_billable(&self, window: &QueryWindow) -> AppResult<Vec<BillingRecord>> {
        // Coarse range filter only; the billing engine computes exact overlap.
        let rows = sqlx::query_as::<sqlx::Postgres, BillableRow>(
            r#"
            SELECT user_id, service_name, price, start_date, end_date
            FROM subscriptions
            WHERE start_date <= $2
              AND (end_date IS NULL OR end_date >= $1)
              AND ($3::uuid IS NULL OR user_id = $3)
              AND ($4::text IS NULL OR service_name = $4)
            "#,
        )
        .bind(window.from.first_day())
        .bind(window.to.first_day())
        .bind(window.owner_filter)
        .bind(window.service_name_filter.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching billable subscriptions: {}", e);
            AppError::Database(format!("Failed to fetch billable subscriptions: {}", e))
        })?;

        debug!("Fetched {} candidate billing records", rows.len());

        rows.into_iter().map(BillingRecord::try_from).collect()
    }

    #[instrument(skip(self, changes))]
    async fn apply_update(
        &self,
        id: Uuid,
        changes: &SubscriptionUpdate,
    ) -> AppResult<Subscription> {
        debug!("Updating subscription: {}", id);

        let tx_error = |e: sqlx::Error| {
            error!("Transaction error updating subscription {}: {}", id, e);
            AppError::Database(format!("Failed to update subscription: {}", e))
        };

        let mut tx = self.pool.begin().await.map_err(tx_error)?;

        // Row lock held until commit, so concurrent updates serialize here
        let current = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            SELECT
                id, user_id, service_name, price,
                start_date, end_date,
                created_at, updated_at
            FROM subscriptions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(tx_error)?
        .ok_or_else(|| AppError::SubscriptionNotFound(id.to_string()))?;

        let merged = changes.apply_to(&Subscription::try_from(current)?);
        merged.validate().map_err(AppError::Validation)?;

        let row = sqlx::query_as::<sqlx::Postgres, SubscriptionRow>(
            r#"
            UPDATE subscriptions
            SET service_name = $2,
                price = $3,
                start_date = $4,
                end_date = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, user_id, service_name, price,
                start_date, end_date,
                created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&merged.service_name)
        .bind(Self::price_to_db(merged.price)?)
        .bind(merged.start_month.first_day())
        .bind(merged.end_month.map(|m| m.first_day()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::write_error(e, &merged, "update"))?;

        tx.commit().await.map_err(tx_error)?;

        row.try_into()
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    service_name: String,
    price: i32,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Projection used by aggregation queries
#[derive(Debug, sqlx::FromRow)]
struct BillableRow {
    user_id: Uuid,
    service_name: String,
    price: i32,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
}

fn price_from_db(price: i32) -> AppResult<u32> {
    u32::try_from(price)
        .map_err(|_| AppError::Database(format!("negative price {} in storage", price)))
}

fn month_from_db(date: NaiveDate) -> AppResult<CalendarMonth> {
    CalendarMonth::try_from(date)
        .map_err(|e| AppError::Database(format!("unrepresentable month {} in storage: {}", date, e)))
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = AppError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            service_name: row.service_name,
            price: price_from_db(row.price)?,
            start_month: month_from_db(row.start_date)?,
            end_month: row.end_date.map(month_from_db).transpose()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<BillableRow> for BillingRecord {
    type Error = AppError;

    fn try_from(row: BillableRow) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: row.user_id,
            service_name: row.service_name,
            monthly_price: price_from_db(row.price)?,
            start_month: month_from_db(row.start_date)?,
            end_month: row.end_date.map(month_from_db).transpose()?,
        })
    }
}
