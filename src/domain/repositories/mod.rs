pub mod gateway;
pub mod notifications;
pub mod payments;
pub mod subscriptions;
