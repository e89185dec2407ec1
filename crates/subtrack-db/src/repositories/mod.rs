//! Repository implementations
//!
//! Concrete implementations of the subscription repository trait defined in
//! subtrack-core: PostgreSQL via sqlx, and an in-memory map.

pub mod memory_repo;
pub mod subscription_repo;

pub use memory_repo::InMemorySubscriptionRepository;
pub use subscription_repo::PgSubscriptionRepository;
