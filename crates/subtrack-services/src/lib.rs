//! Business logic services for Subtrack
//!
//! Services own their collaborators (repositories) through `Arc<dyn Trait>`
//! handles supplied at construction, so the same service runs against
//! PostgreSQL in production and an in-memory store in tests.
//!
//! # Services
//!
//! - `SubscriptionService` - Subscription CRUD and billing-period totals

pub mod subscription_service;

pub use subscription_service::SubscriptionService;
