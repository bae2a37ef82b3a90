use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity};

/// Narrow store interface for billing agreements. `mark_charged` and
/// `mark_failed` are single update-by-key statements so the outcome of a
/// charge attempt lands atomically even with the webhook path writing the
/// same row.
#[automock]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Rows with a usable saved method and no pending failure.
    async fn list_active(&self) -> Result<Vec<SubscriptionEntity>>;

    /// Rows whose most recent charge attempt failed.
    async fn list_failed(&self) -> Result<Vec<SubscriptionEntity>>;

    /// First-seen wins: inserting an existing `payment_method_id` is a
    /// no-op. Returns whether a row was created.
    async fn insert_if_absent(&self, subscription: InsertSubscriptionEntity) -> Result<bool>;

    /// Successful charge: advance `last_payment`, clear the failure state.
    async fn mark_charged(&self, payment_method_id: &str, charged_at: DateTime<Utc>)
    -> Result<()>;

    /// Failed charge: set the failure state and the retry clock.
    async fn mark_failed(&self, payment_method_id: &str, failed_at: DateTime<Utc>) -> Result<()>;
}
