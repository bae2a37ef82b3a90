use anyhow::{Ok, Result};

use super::config_model::{Billing, Database, DotEnvyConfig, Notifications, Yookassa};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let yookassa = Yookassa {
        shop_id: std::env::var("YOOKASSA_SHOP_ID").expect("YOOKASSA_SHOP_ID is invalid"),
        secret_key: std::env::var("YOOKASSA_SECRET_KEY").expect("YOOKASSA_SECRET_KEY is invalid"),
        api_base_url: std::env::var("YOOKASSA_API_BASE_URL")
            .unwrap_or("https://api.yookassa.ru/v3".to_string()),
        return_url: std::env::var("YOOKASSA_RETURN_URL").expect("YOOKASSA_RETURN_URL is invalid"),
        timeout_seconds: std::env::var("YOOKASSA_TIMEOUT_SECONDS")
            .unwrap_or("30".to_string())
            .parse()?,
    };

    let notifications = Notifications {
        base_url: std::env::var("NOTIFICATION_API_URL").expect("NOTIFICATION_API_URL is invalid"),
        timeout_seconds: std::env::var("NOTIFICATION_TIMEOUT_SECONDS")
            .unwrap_or("5".to_string())
            .parse()?,
    };

    let billing = Billing {
        check_interval_seconds: std::env::var("BILLING_CHECK_INTERVAL_SECONDS")
            .expect("BILLING_CHECK_INTERVAL_SECONDS is invalid")
            .parse()?,
        retry_interval_seconds: std::env::var("BILLING_RETRY_INTERVAL_SECONDS")
            .expect("BILLING_RETRY_INTERVAL_SECONDS is invalid")
            .parse()?,
    };

    Ok(DotEnvyConfig {
        database,
        yookassa,
        notifications,
        billing,
    })
}
