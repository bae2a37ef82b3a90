use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::subscriptions::SubscriptionEntity;

/// Disjoint by construction: `regular` is drawn from active subscriptions,
/// `retries` from failed ones, and a subscription is in exactly one state.
#[derive(Debug, Default)]
pub struct DueSelection {
    pub regular: Vec<SubscriptionEntity>,
    pub retries: Vec<SubscriptionEntity>,
}

/// Read-only selection of the subscriptions requiring a charge attempt now.
/// `active` and `failed` are the store snapshots taken by the caller.
pub fn select_due(
    active: Vec<SubscriptionEntity>,
    failed: Vec<SubscriptionEntity>,
    now: DateTime<Utc>,
    retry_interval: Duration,
) -> DueSelection {
    DueSelection {
        regular: active
            .into_iter()
            .filter(|subscription| is_due_for_charge(subscription, now))
            .collect(),
        retries: failed
            .into_iter()
            .filter(|subscription| is_due_for_retry(subscription, now, retry_interval))
            .collect(),
    }
}

/// A subscription is due once `now >= last_payment + interval`. A row that
/// was never charged is due immediately, and a non-positive interval makes
/// it due on every tick.
pub fn is_due_for_charge(subscription: &SubscriptionEntity, now: DateTime<Utc>) -> bool {
    let Some(last_payment) = subscription.last_payment else {
        return true;
    };

    match Duration::try_seconds(subscription.interval_seconds)
        .and_then(|period| last_payment.checked_add_signed(period))
    {
        Some(next_payment) => now >= next_payment,
        // The next charge time is not representable, so it never arrives.
        None => false,
    }
}

/// A failed subscription is retried once the retry interval has elapsed
/// since the recorded failure. A failed row without a failure timestamp
/// violates the state invariant; it is retried immediately rather than
/// stranded forever.
pub fn is_due_for_retry(
    subscription: &SubscriptionEntity,
    now: DateTime<Utc>,
    retry_interval: Duration,
) -> bool {
    match subscription.last_failure_at {
        Some(failed_at) => now.signed_duration_since(failed_at) >= retry_interval,
        None => true,
    }
}
