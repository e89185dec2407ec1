//! Common DTOs used across the API

use serde::{Deserialize, Serialize};
use subtrack_core::traits::{PaginatedResponse, Pagination, PaginationMeta};
use validator::Validate;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    /// Create a success response with data and message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 1000, message = "per_page must be between 1 and 1000"))]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Convert to the service-layer pagination
    pub fn to_pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    /// Create pagination metadata
    pub fn metadata(&self, total: i64) -> PaginationMeta {
        PaginationMeta::new(total, self.page, self.per_page)
    }

    /// Create paginated response
    pub fn paginate<T>(&self, data: Vec<T>, total: i64) -> PaginatedResponse<T> {
        PaginatedResponse {
            data,
            pagination: self.metadata(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_validation() {
        assert!(PaginationParams::default().validate().is_ok());

        let zero_page = PaginationParams {
            page: 0,
            per_page: 10,
        };
        assert!(zero_page.validate().is_err());

        let huge = PaginationParams {
            page: 1,
            per_page: 5000,
        };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_paginate() {
        let params = PaginationParams {
            page: 2,
            per_page: 2,
        };
        let page = params.paginate(vec!["c", "d"], 5);

        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(params.to_pagination().offset(), 2);
    }

    #[test]
    fn test_api_response_omits_empty_message() {
        let json = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(json, serde_json::json!({ "data": 1 }));

        let json = serde_json::to_value(ApiResponse::with_message(1, "ok")).unwrap();
        assert_eq!(json["message"], "ok");
    }
}
