//! Error type shared by every Subtrack layer
//!
//! `AppError` doubles as the HTTP error response: each variant knows its
//! status and a stable machine-readable code, rendered as
//! `{"error": code, "message": text, "status": n}`.

use crate::billing::MonthError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// A storage query failed
    #[error("Database error: {0}")]
    Database(String),

    /// No connection could be obtained from the pool
    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),

    /// Another subscription already holds the (user, service, start month) key
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Well-formed input that breaks a business rule
    #[error("Validation error: {0}")]
    Validation(String),

    /// Field constraints declared on request DTOs
    #[error("Validation error: {0}")]
    Constraints(#[from] validator::ValidationErrors),

    /// Input that could not be parsed at all
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A month field that is not a valid `MM-YYYY` value
    #[error("Invalid input: {field}: {source}")]
    InvalidMonth {
        field: &'static str,
        source: MonthError,
    },
}

impl AppError {
    /// Wrap a month parse failure with the name of the offending field
    pub fn invalid_month(field: &'static str) -> impl FnOnce(MonthError) -> Self {
        move |source| AppError::InvalidMonth { field, source }
    }

    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::InvalidMonth { .. }
            | AppError::Validation(_)
            | AppError::Constraints(_) => StatusCode::BAD_REQUEST,
            AppError::SubscriptionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Pool(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable code for the `error` field of the response body
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Migration(_) => "migration_error",
            AppError::SubscriptionNotFound(_) => "subscription_not_found",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::Validation(_) | AppError::Constraints(_) => "validation_error",
            AppError::InvalidInput(_) | AppError::InvalidMonth { .. } => "invalid_input",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::CalendarMonth;
    use validator::Validate;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1))]
        name: String,
    }

    fn check(named: &Named) -> Result<(), AppError> {
        named.validate()?;
        Ok(())
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AppError::SubscriptionNotFound("123".into()), StatusCode::NOT_FOUND),
            (AppError::AlreadyExists("dup".into()), StatusCode::CONFLICT),
            (AppError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::Pool("timeout".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Database("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{}", err);
        }
    }

    #[test]
    fn test_constraint_violations_convert() {
        let err = check(&Named {
            name: String::new(),
        })
        .unwrap_err();

        assert!(matches!(err, AppError::Constraints(_)));
        assert_eq!(err.error_code(), "validation_error");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        assert!(check(&Named {
            name: "Netflix".into()
        })
        .is_ok());
    }

    #[test]
    fn test_invalid_month_names_field() {
        let err = "13-2025"
            .parse::<CalendarMonth>()
            .map_err(AppError::invalid_month("start_date"))
            .unwrap_err();

        assert_eq!(err.error_code(), "invalid_input");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("Invalid input: start_date: "));
    }
}
