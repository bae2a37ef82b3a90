use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::payments::{PaymentEntity, UpsertPaymentEntity};

#[automock]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert-or-replace by gateway id; the stored row always reflects the
    /// latest known status for that transaction.
    async fn upsert_payment(&self, payment: UpsertPaymentEntity) -> Result<()>;

    async fn find_payment(&self, payment_id: &str) -> Result<Option<PaymentEntity>>;

    async fn mark_payment_refunded(&self, payment_id: &str) -> Result<()>;
}
