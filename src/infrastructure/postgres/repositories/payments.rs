use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};

use crate::{
    domain::{
        entities::payments::{PaymentEntity, UpsertPaymentEntity},
        repositories::payments::PaymentRepository,
        value_objects::enums::payment_statuses::PaymentStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payments},
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn upsert_payment(&self, payment: UpsertPaymentEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(payments::table)
            .values(&payment)
            .on_conflict(payments::id)
            .do_update()
            .set((
                payments::status.eq(payment.status.clone()),
                payments::payment_method_id.eq(payment.payment_method_id.clone()),
                payments::is_recurrent.eq(payment.is_recurrent),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn find_payment(&self, payment_id: &str) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .filter(payments::id.eq(payment_id))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn mark_payment_refunded(&self, payment_id: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(payments::table)
            .filter(payments::id.eq(payment_id))
            .set(payments::status.eq(PaymentStatus::Refunded.to_string()))
            .execute(&mut conn)?;

        Ok(())
    }
}
