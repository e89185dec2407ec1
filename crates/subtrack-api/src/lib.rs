//! API layer for Subtrack
//!
//! HTTP handlers for subscription management and billing totals.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

use actix_web::web;
use subtrack_core::AppError;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{configure_subscriptions, health_check};

/// Mount every versioned route under `/api/v1`
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(configure_subscriptions),
    );
}

/// JSON extractor config rendering body errors as `AppError` responses
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::InvalidInput(format!("invalid JSON body: {}", err)).into())
}

/// Query extractor config rendering query-string errors as `AppError` responses
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(format!("invalid query: {}", err)).into())
}
