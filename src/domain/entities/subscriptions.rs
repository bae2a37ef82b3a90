use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infrastructure::postgres::schema::subscriptions;

/// One billing agreement per saved payment method. The gateway token is the
/// primary key; the row is mutated only by the charge executor and the
/// payment event ingestion path, never deleted.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions, primary_key(payment_method_id))]
pub struct SubscriptionEntity {
    pub payment_method_id: String,
    pub chat_id: String,
    pub saved: bool,
    pub status: String,
    pub last_payment: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub started: DateTime<Utc>,
    pub interval_seconds: i64,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub payment_method_id: String,
    pub chat_id: String,
    pub saved: bool,
    pub status: String,
    pub last_payment: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub started: DateTime<Utc>,
    pub interval_seconds: i64,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
}
