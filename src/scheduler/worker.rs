use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, error, info};

use crate::application::usecases::{
    charge_executor::ChargeExecutor,
    due_payments::{DueSelection, select_due},
};
use crate::domain::repositories::{
    gateway::PaymentGateway, notifications::NotificationSink, payments::PaymentRepository,
    subscriptions::SubscriptionRepository,
};

/// Perpetual billing loop. Started once at process startup and runs for the
/// process lifetime; it has no caller to propagate errors to, so every tick
/// failure is logged and the next tick proceeds.
pub async fn run<S, P, G, N>(
    subscription_repo: Arc<S>,
    executor: Arc<ChargeExecutor<S, P, G, N>>,
    check_interval: Duration,
    retry_interval: chrono::Duration,
) -> Result<()>
where
    S: SubscriptionRepository + 'static,
    P: PaymentRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSink + 'static,
{
    info!(
        check_interval_seconds = check_interval.as_secs(),
        retry_interval_seconds = retry_interval.num_seconds(),
        "billing scheduler started"
    );

    loop {
        if let Err(err) = process_due_subscriptions(&subscription_repo, &executor, retry_interval).await
        {
            error!(error = ?err, "billing: tick failed");
        }

        tokio::time::sleep(check_interval).await;
    }
}

/// One tick: snapshot the due sets and charge them sequentially. Gateway
/// calls stay serialized within the process; a slow call delays, but never
/// drops, the remaining due subscriptions of this tick.
pub async fn process_due_subscriptions<S, P, G, N>(
    subscription_repo: &Arc<S>,
    executor: &ChargeExecutor<S, P, G, N>,
    retry_interval: chrono::Duration,
) -> Result<()>
where
    S: SubscriptionRepository + 'static,
    P: PaymentRepository + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSink + 'static,
{
    let active = subscription_repo.list_active().await?;
    let failed = subscription_repo.list_failed().await?;

    let DueSelection { regular, retries } = select_due(active, failed, Utc::now(), retry_interval);

    if regular.is_empty() && retries.is_empty() {
        debug!("billing: nothing due this tick");
        return Ok(());
    }

    info!(
        regular = regular.len(),
        retries = retries.len(),
        "billing: processing due subscriptions"
    );

    for subscription in &regular {
        executor.execute(subscription, false).await;
    }
    for subscription in &retries {
        executor.execute(subscription, true).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::subscriptions::SubscriptionEntity,
        repositories::{
            gateway::MockPaymentGateway, notifications::MockNotificationSink,
            payments::MockPaymentRepository, subscriptions::MockSubscriptionRepository,
        },
        value_objects::{
            charges::ChargeResult,
            enums::subscription_statuses::SubscriptionStatus,
        },
    };
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn due_subscription(payment_method_id: &str) -> SubscriptionEntity {
        let started = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        SubscriptionEntity {
            payment_method_id: payment_method_id.to_string(),
            chat_id: "chat_1".to_string(),
            saved: true,
            status: SubscriptionStatus::Active.to_string(),
            last_payment: Some(started),
            last_failure_at: None,
            started,
            interval_seconds: 60,
            amount_minor: 20000,
            currency: "RUB".to_string(),
            description: "Monthly plan".to_string(),
        }
    }

    #[tokio::test]
    async fn test_one_failing_subscription_does_not_block_the_rest() {
        let mut listing_repo = MockSubscriptionRepository::new();
        listing_repo
            .expect_list_active()
            .times(1)
            .returning(|| Ok(vec![due_subscription("pm_bad"), due_subscription("pm_good")]));
        listing_repo
            .expect_list_failed()
            .times(1)
            .returning(|| Ok(vec![]));

        let mut writing_repo = MockSubscriptionRepository::new();
        writing_repo
            .expect_mark_failed()
            .withf(|id, _| id == "pm_bad")
            .times(1)
            .returning(|_, _| Ok(()));
        writing_repo
            .expect_mark_charged()
            .withf(|id, _| id == "pm_good")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_charge()
            .times(2)
            .returning(|request| {
                if request.payment_method_id.as_deref() == Some("pm_bad") {
                    Err(anyhow::anyhow!("gateway outage"))
                } else {
                    Ok(ChargeResult {
                        id: "pay_good".to_string(),
                        status: "succeeded".to_string(),
                        confirmation_url: None,
                        payment_method_id: request.payment_method_id.clone(),
                        payment_method_saved: true,
                    })
                }
            });

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_upsert_payment()
            .times(1)
            .returning(|_| Ok(()));

        let mut notifier = MockNotificationSink::new();
        notifier
            .expect_notify()
            .withf(|message| message.payment_method_id == "pm_bad")
            .times(1)
            .returning(|_| Ok(()));

        let listing_repo = Arc::new(listing_repo);
        let executor = ChargeExecutor::new(
            Arc::new(writing_repo),
            Arc::new(payment_repo),
            Arc::new(gateway),
            Arc::new(notifier),
        );

        process_due_subscriptions(&listing_repo, &executor, ChronoDuration::seconds(300))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_store_read_failure_surfaces_as_tick_error() {
        let mut listing_repo = MockSubscriptionRepository::new();
        listing_repo
            .expect_list_active()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("connection refused")));

        let listing_repo = Arc::new(listing_repo);
        let executor = ChargeExecutor::new(
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(MockPaymentRepository::new()),
            Arc::new(MockPaymentGateway::new()),
            Arc::new(MockNotificationSink::new()),
        );

        let result =
            process_due_subscriptions(&listing_repo, &executor, ChronoDuration::seconds(300))
                .await;

        assert!(result.is_err());
    }
}
