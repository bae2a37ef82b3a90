use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::domain::{
    entities::{payments::UpsertPaymentEntity, subscriptions::SubscriptionEntity},
    repositories::{
        gateway::PaymentGateway, notifications::NotificationSink, payments::PaymentRepository,
        subscriptions::SubscriptionRepository,
    },
    value_objects::{
        charges::{ChargeRequest, ChargeResult, FailureReason},
        enums::payment_statuses::PaymentStatus,
        notifications::{NotificationKind, NotificationMessage},
    },
};

/// Exactly one of these is applied per invocation of the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
    Success,
    Failed(FailureReason),
}

/// Performs one charge attempt for one subscription and applies its outcome.
/// Every error is contained here: the scheduler loop is never interrupted by
/// a single subscription's failure, so `execute` returns an outcome, not a
/// `Result`.
pub struct ChargeExecutor<S, P, G, N>
where
    S: SubscriptionRepository + 'static,
    P: PaymentRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSink + 'static,
{
    subscription_repo: Arc<S>,
    payment_repo: Arc<P>,
    gateway: Arc<G>,
    notifier: Arc<N>,
}

impl<S, P, G, N> ChargeExecutor<S, P, G, N>
where
    S: SubscriptionRepository + 'static,
    P: PaymentRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        subscription_repo: Arc<S>,
        payment_repo: Arc<P>,
        gateway: Arc<G>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            subscription_repo,
            payment_repo,
            gateway,
            notifier,
        }
    }

    /// One charge attempt. `is_retry` marks attempts driven by the retry
    /// list; it only changes the notification kind, never the billing
    /// semantics.
    pub async fn execute(
        &self,
        subscription: &SubscriptionEntity,
        is_retry: bool,
    ) -> ChargeOutcome {
        let payment_method_id = subscription.payment_method_id.as_str();
        info!(
            %payment_method_id,
            chat_id = %subscription.chat_id,
            amount_minor = subscription.amount_minor,
            currency = %subscription.currency,
            is_retry,
            "billing: charge attempt started"
        );

        let request = ChargeRequest::recurring(subscription);
        let result = match self.gateway.create_charge(request).await {
            Ok(result) => result,
            Err(err) => {
                error!(
                    %payment_method_id,
                    error = ?err,
                    "billing: gateway charge failed"
                );
                self.apply_failure(subscription, FailureReason::GatewayError, is_retry)
                    .await;
                return ChargeOutcome::Failed(FailureReason::GatewayError);
            }
        };

        // The gateway produced a transaction either way; the ledger gets the
        // row before the subscription state is settled.
        self.record_transaction(subscription, &result).await;

        if result.status == PaymentStatus::Canceled.as_str() {
            info!(
                %payment_method_id,
                gateway_payment_id = %result.id,
                "billing: gateway reported the order as canceled"
            );
            self.apply_failure(subscription, FailureReason::OrderCancelled, is_retry)
                .await;
            return ChargeOutcome::Failed(FailureReason::OrderCancelled);
        }

        let charged_at = Utc::now();
        if let Err(err) = self
            .subscription_repo
            .mark_charged(payment_method_id, charged_at)
            .await
        {
            // Re-evaluated next tick; the idempotency key makes a duplicate
            // transport retry of this attempt harmless.
            error!(
                %payment_method_id,
                db_error = ?err,
                "billing: failed to persist successful charge"
            );
        }

        // Success is logged only; no user notification on this path.
        info!(
            %payment_method_id,
            gateway_payment_id = %result.id,
            status = %result.status,
            "billing: charge succeeded"
        );

        ChargeOutcome::Success
    }

    async fn record_transaction(&self, subscription: &SubscriptionEntity, result: &ChargeResult) {
        let payment = UpsertPaymentEntity {
            id: result.id.clone(),
            chat_id: subscription.chat_id.clone(),
            amount_minor: subscription.amount_minor,
            currency: subscription.currency.clone(),
            status: result.status.clone(),
            description: subscription.description.clone(),
            payment_method_id: Some(subscription.payment_method_id.clone()),
            is_recurrent: true,
            created_at: Utc::now(),
        };

        if let Err(err) = self.payment_repo.upsert_payment(payment).await {
            error!(
                payment_method_id = %subscription.payment_method_id,
                gateway_payment_id = %result.id,
                db_error = ?err,
                "billing: failed to record gateway transaction"
            );
        }
    }

    async fn apply_failure(
        &self,
        subscription: &SubscriptionEntity,
        reason: FailureReason,
        is_retry: bool,
    ) {
        let failed_at = Utc::now();
        if let Err(err) = self
            .subscription_repo
            .mark_failed(&subscription.payment_method_id, failed_at)
            .await
        {
            error!(
                payment_method_id = %subscription.payment_method_id,
                db_error = ?err,
                "billing: failed to persist charge failure"
            );
        }

        let kind = if is_retry {
            NotificationKind::Retry
        } else {
            NotificationKind::Failure
        };
        let message = NotificationMessage {
            chat_id: subscription.chat_id.clone(),
            kind,
            payment_method_id: subscription.payment_method_id.clone(),
            error: reason.to_string(),
            amount_minor: subscription.amount_minor,
            currency: subscription.currency.clone(),
        };

        // The failure marker in the store is authoritative; delivery is
        // best-effort only.
        if let Err(err) = self.notifier.notify(message).await {
            error!(
                payment_method_id = %subscription.payment_method_id,
                error = ?err,
                "billing: failed to send failure notification"
            );
        }
    }
}
