//! Subtrack Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Subtrack subscription service. It includes:
//!
//! - The billing-period engine (calendar months, overlap, aggregation)
//! - Domain models (Subscription and its partial update set)
//! - Repository traits and pagination types
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod billing;
pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
