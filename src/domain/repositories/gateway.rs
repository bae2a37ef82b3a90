use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::charges::{ChargeRequest, ChargeResult, RefundResult};

/// Capability boundary to the payment provider. Every call carries a fresh
/// idempotency key minted by the implementation, one per logical attempt.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a charge. With a saved `payment_method_id` this is an
    /// unattended charge and no confirmation redirect is requested;
    /// without one the result carries a redirect URL for checkout.
    async fn create_charge(&self, request: ChargeRequest) -> Result<ChargeResult>;

    /// Refunds an existing payment. Gateway-level failures propagate to the
    /// caller, they are not swallowed here.
    async fn create_refund(
        &self,
        payment_id: &str,
        amount_minor: i64,
        currency: &str,
    ) -> Result<RefundResult>;
}
