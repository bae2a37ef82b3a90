use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::domain::{
    repositories::notifications::NotificationSink,
    value_objects::notifications::NotificationMessage,
};
use crate::infrastructure::yookassa::client::format_minor_amount;

/// Fire-and-forget POST to the notification service. The request timeout is
/// the only bound on how long a charge attempt can wait on delivery.
pub struct HttpNotificationSink {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct NotificationBody {
    chat_id: String,
    message_type: String,
    details: NotificationDetails,
}

#[derive(Debug, Serialize)]
struct NotificationDetails {
    payment_id: String,
    error: String,
    amount: String,
    currency: String,
}

impl HttpNotificationSink {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl NotificationSink for HttpNotificationSink {
    async fn notify(&self, message: NotificationMessage) -> Result<()> {
        let body = NotificationBody {
            chat_id: message.chat_id.clone(),
            message_type: message.kind.to_string(),
            details: NotificationDetails {
                payment_id: message.payment_method_id,
                error: message.error,
                amount: format_minor_amount(message.amount_minor),
                currency: message.currency,
            },
        };

        let resp = self
            .http
            .post(format!("{}/send-notification", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!(
                "notification service responded with status {}",
                resp.status()
            );
        }

        info!(
            chat_id = %message.chat_id,
            message_type = %message.kind,
            "notification dispatched"
        );

        Ok(())
    }
}
