//! Subtrack Database Layer
//!
//! This crate provides subscription storage for the Subtrack service. It includes:
//!
//! - Connection pool management and embedded migrations with sqlx
//! - A PostgreSQL repository with date-range pushdown for aggregation queries
//! - An in-memory repository for tests and local runs without a database

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use sqlx::PgPool;
pub use subtrack_core::{AppError, AppResult};
