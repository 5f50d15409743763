use serde_json::json;

use crate::domain::payment::PaymentStatus;
use crate::gateways::{
    ConnectionCheck, GatewayConfig, PaymentGateway, PaymentInit, PaymentQuery, PaymentRequestData,
    WebhookOutcome,
};

/// Hosted-checkout adapter: creates a checkout preference, polls payment
/// status, and treats webhooks as wake-up signals to be re-queried.
pub struct MercadoPagoGateway {
    pub client: reqwest::Client,
}

impl MercadoPagoGateway {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn base_url(config: &GatewayConfig) -> String {
        config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.mercadopago.com".to_string())
    }

    fn timeout(config: &GatewayConfig) -> std::time::Duration {
        std::time::Duration::from_millis(config.timeout_ms)
    }
}

impl Default for MercadoPagoGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider status vocabulary normalized to the internal one.
pub fn map_provider_status(status: &str) -> PaymentStatus {
    match status {
        "approved" => PaymentStatus::Success,
        "in_process" | "authorized" => PaymentStatus::Processing,
        "rejected" => PaymentStatus::Failed,
        "cancelled" => PaymentStatus::Cancelled,
        "refunded" | "charged_back" => PaymentStatus::Refunded,
        _ => PaymentStatus::Pending,
    }
}

/// Extracts the payment id from a webhook body of the form
/// `{"type": "payment", "data": {"id": "..."}}`. `action` is accepted as an
/// alias for `type`. Returns `None` for any other event shape.
pub fn parse_payment_webhook(payload: &serde_json::Value) -> Option<String> {
    let event = payload
        .get("type")
        .or_else(|| payload.get("action"))
        .and_then(|v| v.as_str())?;
    if !event.starts_with("payment") {
        return None;
    }

    let id = payload.get("data").and_then(|d| d.get("id"))?;
    match id {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MercadoPagoGateway {
    fn name(&self) -> &'static str {
        "mercadopago"
    }

    async fn test_connection(&self, config: &GatewayConfig) -> ConnectionCheck {
        let Some(token) = config.access_token.as_deref() else {
            return ConnectionCheck {
                success: false,
                message: "access token is not configured".to_string(),
            };
        };

        let url = format!("{}/v1/payment_methods", Self::base_url(config));
        let resp = self
            .client
            .get(url)
            .bearer_auth(token)
            .timeout(Self::timeout(config))
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => ConnectionCheck {
                success: true,
                message: "ok".to_string(),
            },
            Ok(r) => ConnectionCheck {
                success: false,
                message: format!("provider returned HTTP {}", r.status().as_u16()),
            },
            Err(e) => ConnectionCheck {
                success: false,
                message: format!("provider unreachable: {e}"),
            },
        }
    }

    async fn create_payment(
        &self,
        config: &GatewayConfig,
        data: &PaymentRequestData,
    ) -> PaymentInit {
        let Some(token) = config.access_token.as_deref() else {
            return PaymentInit::failed(&data.order_number, "access token is not configured");
        };

        let url = format!("{}/checkout/preferences", Self::base_url(config));
        let body = json!({
            "items": [{
                "title": data.description,
                "quantity": 1,
                "currency_id": data.currency,
                "unit_price": data.amount_minor as f64 / 100.0,
            }],
            "external_reference": data.order_number,
            "payer": { "email": data.customer_email },
            "back_urls": {
                "success": config.success_url,
                "failure": config.failure_url,
            },
            "auto_return": "approved",
        });

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .timeout(Self::timeout(config))
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => {
                let v: serde_json::Value = r.json().await.unwrap_or_default();
                let init_point = v
                    .get("init_point")
                    .and_then(|u| u.as_str())
                    .map(ToString::to_string);

                if init_point.is_none() {
                    return PaymentInit::failed(
                        &data.order_number,
                        "provider response had no checkout url",
                    );
                }

                // The preference id in this response is not a payment id and
                // must not be stored as one; it stays in `raw`. The payment
                // id arrives with the first webhook, correlated back to us
                // by the external reference.
                PaymentInit {
                    success: true,
                    checkout_url: init_point,
                    external_id: None,
                    external_reference: data.order_number.clone(),
                    instructions: None,
                    error_message: None,
                    raw: v,
                }
            }
            Ok(r) => {
                let status = r.status();
                let body = r.text().await.unwrap_or_default();
                PaymentInit::failed(
                    &data.order_number,
                    format!(
                        "HTTP_{}: {}",
                        status.as_u16(),
                        body.chars().take(200).collect::<String>()
                    ),
                )
            }
            Err(e) if e.is_timeout() => {
                PaymentInit::failed(&data.order_number, "provider timed out")
            }
            Err(e) => PaymentInit::failed(&data.order_number, format!("network error: {e}")),
        }
    }

    async fn query_payment(&self, config: &GatewayConfig, external_id: &str) -> PaymentQuery {
        let Some(token) = config.access_token.as_deref() else {
            return PaymentQuery {
                success: false,
                status: PaymentStatus::Pending,
                amount_minor: None,
                external_reference: None,
                detail: Some("access token is not configured".to_string()),
                raw: serde_json::Value::Null,
            };
        };

        let url = format!("{}/v1/payments/{}", Self::base_url(config), external_id);
        let resp = self
            .client
            .get(url)
            .bearer_auth(token)
            .timeout(Self::timeout(config))
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => {
                let v: serde_json::Value = r.json().await.unwrap_or_default();
                let status = v
                    .get("status")
                    .and_then(|s| s.as_str())
                    .map(map_provider_status)
                    .unwrap_or(PaymentStatus::Pending);
                let amount_minor = v
                    .get("transaction_amount")
                    .and_then(|a| a.as_f64())
                    .map(|a| (a * 100.0).round() as i64);
                let external_reference = v
                    .get("external_reference")
                    .and_then(|r| r.as_str())
                    .map(ToString::to_string);

                PaymentQuery {
                    success: true,
                    status,
                    amount_minor,
                    external_reference,
                    detail: None,
                    raw: v,
                }
            }
            Ok(r) => PaymentQuery {
                success: false,
                status: PaymentStatus::Pending,
                amount_minor: None,
                external_reference: None,
                detail: Some(format!("provider returned HTTP {}", r.status().as_u16())),
                raw: serde_json::Value::Null,
            },
            Err(e) => PaymentQuery {
                success: false,
                status: PaymentStatus::Pending,
                amount_minor: None,
                external_reference: None,
                detail: Some(format!("provider unreachable: {e}")),
                raw: serde_json::Value::Null,
            },
        }
    }

    async fn process_webhook(
        &self,
        config: &GatewayConfig,
        payload: &serde_json::Value,
    ) -> WebhookOutcome {
        let Some(payment_id) = parse_payment_webhook(payload) else {
            return WebhookOutcome::ignored("unsupported event type or missing payment id");
        };

        // The webhook body is only a wake-up signal; amounts and status are
        // re-read from the provider.
        let query = self.query_payment(config, &payment_id).await;
        if !query.success {
            return WebhookOutcome {
                success: false,
                external_id: Some(payment_id),
                external_reference: None,
                status: None,
                detail: query.detail,
            };
        }

        WebhookOutcome {
            success: true,
            external_id: Some(payment_id),
            external_reference: query.external_reference,
            status: Some(query.status),
            detail: None,
        }
    }
}
