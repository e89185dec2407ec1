//! HTTP request handlers

pub mod health;
pub mod subscription;

pub use health::health_check;
pub use subscription::configure as configure_subscriptions;
