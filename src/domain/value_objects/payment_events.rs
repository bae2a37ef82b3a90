use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

/// A gateway transaction event as handed over by the webhook ingestion
/// surface. Redelivery of the same `payment_id` must be harmless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub payment_id: String,
    pub chat_id: String,
    pub status: PaymentStatus,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub payment_method_id: Option<String>,
    pub payment_method_saved: bool,
    pub is_recurrent: bool,
    pub interval_seconds: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}
