use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::{
    entities::{payments::UpsertPaymentEntity, subscriptions::InsertSubscriptionEntity},
    repositories::{payments::PaymentRepository, subscriptions::SubscriptionRepository},
    value_objects::{
        enums::{payment_statuses::PaymentStatus, subscription_statuses::SubscriptionStatus},
        payment_events::PaymentEvent,
    },
};

#[derive(Debug, Error)]
pub enum PaymentEventError {
    #[error("saved payment method event is missing the billing interval")]
    MissingInterval,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Applies a gateway transaction event to the ledger and, when the event
/// reports a newly saved payment method, opens the billing agreement.
/// Redelivered events overwrite the ledger row by id and leave an existing
/// agreement untouched (first-seen wins).
pub struct PaymentEventUseCase<S, P>
where
    S: SubscriptionRepository + 'static,
    P: PaymentRepository + 'static,
{
    subscription_repo: Arc<S>,
    payment_repo: Arc<P>,
}

impl<S, P> PaymentEventUseCase<S, P>
where
    S: SubscriptionRepository + 'static,
    P: PaymentRepository + 'static,
{
    pub fn new(subscription_repo: Arc<S>, payment_repo: Arc<P>) -> Self {
        Self {
            subscription_repo,
            payment_repo,
        }
    }

    pub async fn record_payment_event(
        &self,
        event: PaymentEvent,
    ) -> Result<(), PaymentEventError> {
        info!(
            payment_id = %event.payment_id,
            chat_id = %event.chat_id,
            status = %event.status,
            "payments: recording gateway event"
        );

        let payment = UpsertPaymentEntity {
            id: event.payment_id.clone(),
            chat_id: event.chat_id.clone(),
            amount_minor: event.amount_minor,
            currency: event.currency.clone(),
            status: event.status.to_string(),
            description: event.description.clone(),
            payment_method_id: event.payment_method_id.clone(),
            is_recurrent: event.is_recurrent,
            created_at: event.occurred_at,
        };

        self.payment_repo.upsert_payment(payment).await.map_err(|err| {
            error!(
                payment_id = %event.payment_id,
                db_error = ?err,
                "payments: failed to upsert ledger row"
            );
            PaymentEventError::Internal(err)
        })?;

        if event.status != PaymentStatus::Succeeded || !event.payment_method_saved {
            return Ok(());
        }
        let Some(payment_method_id) = event.payment_method_id.clone() else {
            return Ok(());
        };

        let interval_seconds = event
            .interval_seconds
            .ok_or(PaymentEventError::MissingInterval)?;

        let subscription = InsertSubscriptionEntity {
            payment_method_id: payment_method_id.clone(),
            chat_id: event.chat_id.clone(),
            saved: true,
            status: SubscriptionStatus::Active.to_string(),
            last_payment: Some(event.occurred_at),
            last_failure_at: None,
            started: event.occurred_at,
            interval_seconds,
            amount_minor: event.amount_minor,
            currency: event.currency.clone(),
            description: event.description.clone(),
        };

        let created = self
            .subscription_repo
            .insert_if_absent(subscription)
            .await
            .map_err(|err| {
                error!(
                    %payment_method_id,
                    db_error = ?err,
                    "payments: failed to create subscription"
                );
                PaymentEventError::Internal(err)
            })?;

        if created {
            info!(
                %payment_method_id,
                chat_id = %event.chat_id,
                interval_seconds,
                "payments: subscription opened for saved method"
            );
        } else {
            debug!(
                %payment_method_id,
                "payments: subscription already exists, creation skipped"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{
        payments::MockPaymentRepository, subscriptions::MockSubscriptionRepository,
    };
    use chrono::Utc;

    fn event(payment_id: &str, status: PaymentStatus, saved: bool) -> PaymentEvent {
        PaymentEvent {
            payment_id: payment_id.to_string(),
            chat_id: "chat_1".to_string(),
            status,
            amount_minor: 20000,
            currency: "RUB".to_string(),
            description: "Monthly plan".to_string(),
            payment_method_id: Some("pm_9".to_string()),
            payment_method_saved: saved,
            is_recurrent: false,
            interval_seconds: Some(2_592_000),
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_redelivered_event_overwrites_ledger_row() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_upsert_payment()
            .withf(|payment| payment.id == "pay_9" && payment.status == "pending")
            .times(1)
            .returning(|_| Ok(()));
        payment_repo
            .expect_upsert_payment()
            .withf(|payment| payment.id == "pay_9" && payment.status == "succeeded")
            .times(1)
            .returning(|_| Ok(()));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_insert_if_absent()
            .times(1)
            .returning(|_| Ok(true));

        let usecase = PaymentEventUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(payment_repo),
        );

        usecase
            .record_payment_event(event("pay_9", PaymentStatus::Pending, true))
            .await
            .unwrap();
        usecase
            .record_payment_event(event("pay_9", PaymentStatus::Succeeded, true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_subscription_opened_on_saved_method_success() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_upsert_payment()
            .times(1)
            .returning(|_| Ok(()));

        let occurred_at = Utc::now();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_insert_if_absent()
            .withf(move |sub| {
                sub.payment_method_id == "pm_9"
                    && sub.saved
                    && sub.status == "active"
                    && sub.last_failure_at.is_none()
                    && sub.last_payment.is_some()
                    && sub.interval_seconds == 2_592_000
            })
            .times(1)
            .returning(|_| Ok(true));

        let usecase = PaymentEventUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(payment_repo),
        );

        let mut ev = event("pay_10", PaymentStatus::Succeeded, true);
        ev.occurred_at = occurred_at;
        usecase.record_payment_event(ev).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_subscription_without_saved_method() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_upsert_payment()
            .times(2)
            .returning(|_| Ok(()));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_insert_if_absent().times(0);

        let usecase = PaymentEventUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(payment_repo),
        );

        // Not saved for reuse.
        usecase
            .record_payment_event(event("pay_11", PaymentStatus::Succeeded, false))
            .await
            .unwrap();
        // Saved flag set but the payment did not succeed.
        usecase
            .record_payment_event(event("pay_12", PaymentStatus::Canceled, true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_subscription_creation_is_a_noop() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_upsert_payment()
            .times(1)
            .returning(|_| Ok(()));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_insert_if_absent()
            .times(1)
            .returning(|_| Ok(false));

        let usecase = PaymentEventUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(payment_repo),
        );

        usecase
            .record_payment_event(event("pay_13", PaymentStatus::Succeeded, true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_saved_method_without_interval_is_rejected() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_upsert_payment()
            .times(1)
            .returning(|_| Ok(()));

        let subscription_repo = MockSubscriptionRepository::new();

        let usecase = PaymentEventUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(payment_repo),
        );

        let mut ev = event("pay_14", PaymentStatus::Succeeded, true);
        ev.interval_seconds = None;
        let result = usecase.record_payment_event(ev).await;

        assert!(matches!(result, Err(PaymentEventError::MissingInterval)));
    }
}
