use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infrastructure::postgres::schema::payments;

/// Ledger row for one gateway transaction. Keyed by the gateway-issued id;
/// writes are idempotent overwrites so a redelivered event never creates a
/// duplicate financial record.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: String,
    pub chat_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub description: String,
    pub payment_method_id: Option<String>,
    pub is_recurrent: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct UpsertPaymentEntity {
    pub id: String,
    pub chat_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub description: String,
    pub payment_method_id: Option<String>,
    pub is_recurrent: bool,
    pub created_at: DateTime<Utc>,
}
