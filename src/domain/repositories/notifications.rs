use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::notifications::NotificationMessage;

/// Outbound user notification sink. Bounded timeout, no retry, no ordering
/// guarantee relative to store writes; callers log failures and move on.
#[automock]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, message: NotificationMessage) -> Result<()>;
}
