use std::collections::HashMap;
use std::fmt::Display;

use crate::domain::entities::subscriptions::SubscriptionEntity;

/// One charge attempt against the gateway. The idempotency key is minted by
/// the gateway client per call, so every logical attempt is a distinct
/// charge while transport-level retries of the same call are not.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub chat_id: String,
    pub start_recurrent: bool,
    pub payment_method_id: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl ChargeRequest {
    /// Builds the unattended charge for a scheduled or retried billing
    /// attempt: reuse of the saved method, never a new save.
    pub fn recurring(subscription: &SubscriptionEntity) -> Self {
        let metadata = HashMap::from([
            (
                "payment_interval".to_string(),
                subscription.interval_seconds.to_string(),
            ),
            ("chat_id".to_string(), subscription.chat_id.clone()),
        ]);

        Self {
            amount_minor: subscription.amount_minor,
            currency: subscription.currency.clone(),
            description: subscription.description.clone(),
            chat_id: subscription.chat_id.clone(),
            start_recurrent: false,
            payment_method_id: Some(subscription.payment_method_id.clone()),
            metadata,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChargeResult {
    pub id: String,
    pub status: String,
    pub confirmation_url: Option<String>,
    pub payment_method_id: Option<String>,
    pub payment_method_saved: bool,
}

#[derive(Debug, Clone)]
pub struct RefundResult {
    pub id: String,
    pub payment_id: String,
    pub status: String,
    pub amount_minor: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    GatewayError,
    OrderCancelled,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::GatewayError => "gateway error",
            FailureReason::OrderCancelled => "order cancelled",
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
