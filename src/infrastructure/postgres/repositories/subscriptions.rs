use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};

use crate::{
    domain::{
        entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
        repositories::subscriptions::SubscriptionRepository,
        value_objects::enums::subscription_statuses::SubscriptionStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::subscriptions},
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn list_active(&self) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = subscriptions::table
            .filter(subscriptions::saved.eq(true))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_failed(&self) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = subscriptions::table
            .filter(subscriptions::status.eq(SubscriptionStatus::Failed.to_string()))
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn insert_if_absent(&self, subscription: InsertSubscriptionEntity) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let inserted = insert_into(subscriptions::table)
            .values(&subscription)
            .on_conflict(subscriptions::payment_method_id)
            .do_nothing()
            .execute(&mut conn)?;

        Ok(inserted == 1)
    }

    async fn mark_charged(
        &self,
        payment_method_id: &str,
        charged_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(subscriptions::table)
            .filter(subscriptions::payment_method_id.eq(payment_method_id))
            .set((
                subscriptions::last_payment.eq(Some(charged_at)),
                subscriptions::status.eq(SubscriptionStatus::Active.to_string()),
                subscriptions::last_failure_at.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_failed(&self, payment_method_id: &str, failed_at: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(subscriptions::table)
            .filter(subscriptions::payment_method_id.eq(payment_method_id))
            .set((
                subscriptions::status.eq(SubscriptionStatus::Failed.to_string()),
                subscriptions::last_failure_at.eq(Some(failed_at)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
