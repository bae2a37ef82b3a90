use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{
    repositories::{gateway::PaymentGateway, payments::PaymentRepository},
    value_objects::{charges::RefundResult, enums::payment_statuses::PaymentStatus},
};

#[derive(Debug, Error)]
pub enum RefundError {
    #[error("payment not found")]
    PaymentNotFound,
    #[error("payment is not refundable in status {0}")]
    NotRefundable(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Refunds a succeeded ledger payment in full. Gateway failures propagate to
/// the caller; the ledger row is only marked refunded after the gateway
/// accepted the refund.
pub struct RefundUseCase<P, G>
where
    P: PaymentRepository + 'static,
    G: PaymentGateway + 'static,
{
    payment_repo: Arc<P>,
    gateway: Arc<G>,
}

impl<P, G> RefundUseCase<P, G>
where
    P: PaymentRepository + 'static,
    G: PaymentGateway + 'static,
{
    pub fn new(payment_repo: Arc<P>, gateway: Arc<G>) -> Self {
        Self {
            payment_repo,
            gateway,
        }
    }

    pub async fn refund_payment(&self, payment_id: &str) -> Result<RefundResult, RefundError> {
        let payment = self
            .payment_repo
            .find_payment(payment_id)
            .await
            .map_err(|err| {
                error!(
                    %payment_id,
                    db_error = ?err,
                    "refunds: failed to load payment"
                );
                RefundError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%payment_id, "refunds: payment not found");
                RefundError::PaymentNotFound
            })?;

        if PaymentStatus::from_str(&payment.status) != Some(PaymentStatus::Succeeded) {
            warn!(
                %payment_id,
                status = %payment.status,
                "refunds: payment is not refundable"
            );
            return Err(RefundError::NotRefundable(payment.status));
        }

        let refund = self
            .gateway
            .create_refund(payment_id, payment.amount_minor, &payment.currency)
            .await
            .map_err(|err| {
                error!(
                    %payment_id,
                    error = ?err,
                    "refunds: gateway refund failed"
                );
                RefundError::Internal(err)
            })?;

        self.payment_repo
            .mark_payment_refunded(payment_id)
            .await
            .map_err(|err| {
                error!(
                    %payment_id,
                    refund_id = %refund.id,
                    db_error = ?err,
                    "refunds: gateway accepted the refund but the ledger update failed"
                );
                RefundError::Internal(err)
            })?;

        info!(
            %payment_id,
            refund_id = %refund.id,
            status = %refund.status,
            "refunds: refund completed"
        );

        Ok(refund)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::payments::PaymentEntity,
        repositories::{gateway::MockPaymentGateway, payments::MockPaymentRepository},
    };
    use chrono::Utc;

    fn payment(id: &str, status: &str) -> PaymentEntity {
        PaymentEntity {
            id: id.to_string(),
            chat_id: "chat_1".to_string(),
            amount_minor: 20000,
            currency: "RUB".to_string(),
            status: status.to_string(),
            description: "Monthly plan".to_string(),
            payment_method_id: Some("pm_1".to_string()),
            is_recurrent: true,
            created_at: Utc::now(),
        }
    }

    fn refund_result(payment_id: &str) -> RefundResult {
        RefundResult {
            id: "rf_1".to_string(),
            payment_id: payment_id.to_string(),
            status: "succeeded".to_string(),
            amount_minor: 20000,
        }
    }

    #[tokio::test]
    async fn test_refund_marks_ledger_row_refunded() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_payment()
            .withf(|id| id == "pay_1")
            .times(1)
            .returning(|id| Ok(Some(payment(id, "succeeded"))));
        payment_repo
            .expect_mark_payment_refunded()
            .withf(|id| id == "pay_1")
            .times(1)
            .returning(|_| Ok(()));

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_refund()
            .withf(|id, amount_minor, currency| {
                id == "pay_1" && *amount_minor == 20000 && currency == "RUB"
            })
            .times(1)
            .returning(|id, _, _| Ok(refund_result(id)));

        let usecase = RefundUseCase::new(Arc::new(payment_repo), Arc::new(gateway));
        let refund = usecase.refund_payment("pay_1").await.unwrap();

        assert_eq!(refund.payment_id, "pay_1");
    }

    #[tokio::test]
    async fn test_missing_payment_is_rejected() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_payment()
            .times(1)
            .returning(|_| Ok(None));

        let gateway = MockPaymentGateway::new();

        let usecase = RefundUseCase::new(Arc::new(payment_repo), Arc::new(gateway));
        let result = usecase.refund_payment("pay_missing").await;

        assert!(matches!(result, Err(RefundError::PaymentNotFound)));
    }

    #[tokio::test]
    async fn test_non_succeeded_payment_is_not_refundable() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_payment()
            .times(1)
            .returning(|id| Ok(Some(payment(id, "refunded"))));

        let gateway = MockPaymentGateway::new();

        let usecase = RefundUseCase::new(Arc::new(payment_repo), Arc::new(gateway));
        let result = usecase.refund_payment("pay_1").await;

        assert!(matches!(result, Err(RefundError::NotRefundable(_))));
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_ledger_untouched() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_payment()
            .times(1)
            .returning(|id| Ok(Some(payment(id, "succeeded"))));
        payment_repo.expect_mark_payment_refunded().times(0);

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_refund()
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("refund rejected")));

        let usecase = RefundUseCase::new(Arc::new(payment_repo), Arc::new(gateway));
        let result = usecase.refund_payment("pay_1").await;

        assert!(matches!(result, Err(RefundError::Internal(_))));
    }
}
