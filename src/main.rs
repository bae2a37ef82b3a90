use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rebill::application::usecases::charge_executor::ChargeExecutor;
use rebill::config::config_loader;
use rebill::infrastructure::{
    notifications::http_sink::HttpNotificationSink,
    postgres::{
        postgres_connection,
        repositories::{payments::PaymentPostgres, subscriptions::SubscriptionPostgres},
    },
    yookassa::client::YookassaClient,
};
use rebill::scheduler;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Billing scheduler exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let subscription_repo = Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool_arc)));
    let payment_repo = Arc::new(PaymentPostgres::new(Arc::clone(&db_pool_arc)));

    let yookassa = &dotenvy_env.yookassa;
    let gateway = Arc::new(YookassaClient::new(
        yookassa.shop_id.clone(),
        yookassa.secret_key.clone(),
        yookassa.api_base_url.clone(),
        yookassa.return_url.clone(),
        Duration::from_secs(yookassa.timeout_seconds),
    )?);

    let notifier = Arc::new(HttpNotificationSink::new(
        dotenvy_env.notifications.base_url.clone(),
        Duration::from_secs(dotenvy_env.notifications.timeout_seconds),
    )?);

    let executor = Arc::new(ChargeExecutor::new(
        Arc::clone(&subscription_repo),
        payment_repo,
        gateway,
        notifier,
    ));

    let billing_loop = tokio::spawn(scheduler::worker::run(
        subscription_repo,
        executor,
        Duration::from_secs(dotenvy_env.billing.check_interval_seconds),
        chrono::Duration::seconds(dotenvy_env.billing.retry_interval_seconds),
    ));

    billing_loop.await??;

    Ok(())
}
