//! Domain models for Subtrack

pub mod subscription;

pub use subscription::{Subscription, SubscriptionUpdate, MAX_SERVICE_NAME_LEN};
