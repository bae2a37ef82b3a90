use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
    repositories::gateway::PaymentGateway,
    value_objects::charges::{ChargeRequest, ChargeResult, RefundResult},
};

/// Minimal YooKassa client built on reqwest. Shop credentials go out as
/// HTTP basic auth; every create call carries a fresh `Idempotence-Key`.
pub struct YookassaClient {
    http: reqwest::Client,
    shop_id: String,
    secret_key: String,
    api_base_url: String,
    return_url: String,
}

#[derive(Debug, Serialize)]
struct AmountBody {
    value: String,
    currency: String,
}

#[derive(Debug, Serialize)]
struct ConfirmationBody {
    #[serde(rename = "type")]
    type_: &'static str,
    return_url: String,
}

#[derive(Debug, Serialize)]
struct CreatePaymentBody {
    amount: AmountBody,
    description: String,
    merchant_customer_id: String,
    capture: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirmation: Option<ConfirmationBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    save_payment_method: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method_id: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct CreateRefundBody {
    payment_id: String,
    amount: AmountBody,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: String,
    status: String,
    confirmation: Option<ConfirmationResponse>,
    payment_method: Option<PaymentMethodResponse>,
}

#[derive(Debug, Deserialize)]
struct ConfirmationResponse {
    confirmation_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentMethodResponse {
    id: String,
    #[serde(default)]
    saved: bool,
}

#[derive(Debug, Deserialize)]
struct RefundResponse {
    id: String,
    payment_id: String,
    status: String,
    amount: AmountResponse,
}

#[derive(Debug, Deserialize)]
struct AmountResponse {
    value: String,
}

#[derive(Debug, Deserialize)]
struct YookassaErrorBody {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    description: Option<String>,
    parameter: Option<String>,
}

impl YookassaClient {
    pub fn new(
        shop_id: String,
        secret_key: String,
        api_base_url: String,
        return_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            shop_id,
            secret_key,
            api_base_url,
            return_url,
        })
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (error_type, error_code, error_parameter, error_description) =
            match serde_json::from_str::<YookassaErrorBody>(&body) {
                Ok(details) => (
                    details.type_,
                    details.code,
                    details.parameter,
                    details.description,
                ),
                Err(_) => (None, None, None, None),
            };

        error!(
            status = %status,
            error_type = ?error_type,
            error_code = ?error_code,
            error_parameter = ?error_parameter,
            error_description = ?error_description,
            response_body = %body,
            context = %context,
            "yookassa api request failed"
        );

        anyhow::bail!(
            "YooKassa API request failed: {} (status {}, code {:?})",
            context,
            status,
            error_code
        );
    }
}

#[async_trait]
impl PaymentGateway for YookassaClient {
    async fn create_charge(&self, request: ChargeRequest) -> Result<ChargeResult> {
        // https://yookassa.ru/developers/api#create_payment
        // A saved method means an unattended charge, so no confirmation
        // redirect is requested for it.
        let confirmation = match request.payment_method_id {
            Some(_) => None,
            None => Some(ConfirmationBody {
                type_: "redirect",
                return_url: self.return_url.clone(),
            }),
        };

        let unattended = request.payment_method_id.is_some();
        let body = CreatePaymentBody {
            amount: AmountBody {
                value: format_minor_amount(request.amount_minor),
                currency: request.currency.clone(),
            },
            description: request.description,
            merchant_customer_id: request.chat_id,
            capture: true,
            confirmation,
            save_payment_method: request.start_recurrent.then_some(true),
            payment_method_id: request.payment_method_id,
            metadata: request.metadata,
        };

        let resp = self
            .http
            .post(format!("{}/payments", self.api_base_url))
            .basic_auth(&self.shop_id, Some(&self.secret_key))
            .header("Idempotence-Key", Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create payment").await?;

        let parsed: PaymentResponse = resp.json().await?;
        info!(
            payment_id = %parsed.id,
            status = %parsed.status,
            "yookassa payment created"
        );

        Ok(ChargeResult {
            id: parsed.id,
            status: parsed.status,
            confirmation_url: if unattended {
                None
            } else {
                parsed.confirmation.and_then(|c| c.confirmation_url)
            },
            payment_method_id: parsed.payment_method.as_ref().map(|m| m.id.clone()),
            payment_method_saved: parsed.payment_method.map(|m| m.saved).unwrap_or(false),
        })
    }

    async fn create_refund(
        &self,
        payment_id: &str,
        amount_minor: i64,
        currency: &str,
    ) -> Result<RefundResult> {
        // https://yookassa.ru/developers/api#create_refund
        let body = CreateRefundBody {
            payment_id: payment_id.to_string(),
            amount: AmountBody {
                value: format_minor_amount(amount_minor),
                currency: currency.to_string(),
            },
        };

        let resp = self
            .http
            .post(format!("{}/refunds", self.api_base_url))
            .basic_auth(&self.shop_id, Some(&self.secret_key))
            .header("Idempotence-Key", Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create refund").await?;

        let parsed: RefundResponse = resp.json().await?;
        info!(
            refund_id = %parsed.id,
            payment_id = %parsed.payment_id,
            status = %parsed.status,
            "yookassa refund created"
        );

        Ok(RefundResult {
            id: parsed.id,
            payment_id: parsed.payment_id,
            status: parsed.status,
            amount_minor: parse_minor_amount(&parsed.amount.value).unwrap_or(amount_minor),
        })
    }
}

/// Formats minor units as the gateway's two-decimal string, e.g. 20000 -> "200.00".
pub fn format_minor_amount(amount_minor: i64) -> String {
    format!("{}.{:02}", amount_minor / 100, amount_minor % 100)
}

/// Parses a gateway decimal string back to minor units, e.g. "200.00" -> 20000.
pub fn parse_minor_amount(value: &str) -> Option<i64> {
    let (whole, frac) = match value.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (value, ""),
    };

    let whole = whole.parse::<i64>().ok()?;
    let frac_minor = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        2 => frac.parse::<i64>().ok()?,
        _ => return None,
    };

    Some(whole * 100 + frac_minor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minor_amount() {
        assert_eq!(format_minor_amount(20000), "200.00");
        assert_eq!(format_minor_amount(199), "1.99");
        assert_eq!(format_minor_amount(5), "0.05");
        assert_eq!(format_minor_amount(100), "1.00");
    }

    #[test]
    fn test_parse_minor_amount() {
        assert_eq!(parse_minor_amount("200.00"), Some(20000));
        assert_eq!(parse_minor_amount("1.99"), Some(199));
        assert_eq!(parse_minor_amount("1.9"), Some(190));
        assert_eq!(parse_minor_amount("15"), Some(1500));
        assert_eq!(parse_minor_amount("1.999"), None);
        assert_eq!(parse_minor_amount("abc"), None);
    }

    #[test]
    fn test_format_parse_round_trip() {
        for amount in [0, 1, 99, 100, 20000, 1_234_567] {
            assert_eq!(parse_minor_amount(&format_minor_amount(amount)), Some(amount));
        }
    }
}
