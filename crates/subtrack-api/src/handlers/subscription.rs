//! Subscription handlers
//!
//! HTTP handlers for subscription CRUD and the billing total.

use crate::dto::subscription::{
    SubscriptionCreateRequest, SubscriptionResponse, SubscriptionUpdateRequest, TotalSumQuery,
    TotalSumResponse,
};
use crate::dto::{ApiResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use subtrack_core::AppError;
use subtrack_services::SubscriptionService;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Parse the `{id}` path segment
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::InvalidInput(format!("invalid subscription id: {}", raw)))
}

/// Create a subscription
///
/// POST /api/v1/subscriptions
#[instrument(skip(service, req))]
pub async fn add_subscription(
    service: web::Data<SubscriptionService>,
    req: web::Json<SubscriptionCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()
        .inspect_err(|e| warn!("Subscription creation validation failed: {}", e))?;

    let subscription = req.into_inner().into_subscription()?;
    debug!(service_name = %subscription.service_name, "Creating subscription");

    let created = service.add(subscription).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        SubscriptionResponse::from(created),
        "Subscription created successfully",
    )))
}

/// List subscriptions
///
/// GET /api/v1/subscriptions?page=&per_page=
#[instrument(skip(service))]
pub async fn list_subscriptions(
    service: web::Data<SubscriptionService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query
        .validate()
        .inspect_err(|e| warn!("Invalid pagination: {}", e))?;

    let (items, total) = service.list(&query.to_pagination()).await?;
    let data: Vec<SubscriptionResponse> = items.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(query.paginate(data, total)))
}

/// Get a single subscription by ID
///
/// GET /api/v1/subscriptions/{id}
#[instrument(skip(service))]
pub async fn get_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    let subscription = service.get(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SubscriptionResponse::from(
        subscription,
    ))))
}

/// Partially update a subscription
///
/// PUT /api/v1/subscriptions/{id}
#[instrument(skip(service, req))]
pub async fn update_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    req: web::Json<SubscriptionUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;

    req.validate()
        .inspect_err(|e| warn!("Subscription update validation failed: {}", e))?;

    let changes = req.into_inner().into_update()?;
    let updated = service.update(id, changes).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        SubscriptionResponse::from(updated),
        "Subscription updated successfully",
    )))
}

/// Delete a subscription
///
/// DELETE /api/v1/subscriptions/{id}
#[instrument(skip(service))]
pub async fn delete_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    service.delete(id).await?;

    info!(%id, "Subscription deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Total billed over a month range
///
/// GET /api/v1/subscriptions/total?start_date=MM-YYYY&end_date=MM-YYYY&user_id=&service_name=
#[instrument(skip(service))]
pub async fn total_sum(
    service: web::Data<SubscriptionService>,
    query: web::Query<TotalSumQuery>,
) -> Result<HttpResponse, AppError> {
    let window = query.into_inner().into_window()?;
    let total_sum = service.total_sum(&window).await?;

    Ok(HttpResponse::Ok().json(TotalSumResponse { total_sum }))
}

/// Configure subscription routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::get().to(list_subscriptions))
            .route("", web::post().to(add_subscription))
            // Registered before /{id} so "total" is not taken as an id
            .route("/total", web::get().to(total_sum))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::put().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert!(parse_id("60601fee-2bf1-4721-ae6f-7636e79a0cba").is_ok());
        assert!(matches!(parse_id("total"), Err(AppError::InvalidInput(_))));
    }
}
