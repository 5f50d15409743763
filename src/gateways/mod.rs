use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment::PaymentStatus;
use crate::error::ServiceError;

pub mod bank_transfer;
pub mod card;
pub mod mercadopago;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentProvider {
    MercadoPago,
    BankTransfer,
    CreditCard,
    DebitCard,
}

impl PaymentProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentProvider::MercadoPago => "MERCADO_PAGO",
            PaymentProvider::BankTransfer => "BANK_TRANSFER",
            PaymentProvider::CreditCard => "CREDIT_CARD",
            PaymentProvider::DebitCard => "DEBIT_CARD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MERCADO_PAGO" | "mercadopago" => Some(PaymentProvider::MercadoPago),
            "BANK_TRANSFER" | "bank-transfer" => Some(PaymentProvider::BankTransfer),
            "CREDIT_CARD" | "credit-card" => Some(PaymentProvider::CreditCard),
            "DEBIT_CARD" | "debit-card" => Some(PaymentProvider::DebitCard),
            _ => None,
        }
    }
}

/// Per-provider credential bag, filled from the environment at startup.
/// Which fields are populated depends on the provider.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub provider: PaymentProvider,
    pub access_token: Option<String>,
    pub base_url: Option<String>,
    pub success_url: Option<String>,
    pub failure_url: Option<String>,
    pub bank_account: Option<String>,
    pub cbu: Option<String>,
    pub alias: Option<String>,
    pub holder: Option<String>,
    pub timeout_ms: u64,
}

impl GatewayConfig {
    pub fn new(provider: PaymentProvider, timeout_ms: u64) -> Self {
        Self {
            provider,
            access_token: None,
            base_url: None,
            success_url: None,
            failure_url: None,
            bank_account: None,
            cbu: None,
            alias: None,
            holder: None,
            timeout_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentRequestData {
    pub order_id: Uuid,
    pub order_number: String,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConnectionCheck {
    pub success: bool,
    pub message: String,
}

/// Offline payment instructions for providers without a hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInstructions {
    pub bank_account: String,
    pub cbu: String,
    pub alias: String,
    pub holder: Option<String>,
    pub amount_minor: i64,
    pub reference: String,
}

/// Outcome of `create_payment`. Provider failures are carried in
/// `error_message`; adapters never surface them as errors.
/// `external_id` is the provider's *payment* id, populated only when the
/// provider issues one at creation time; hosted-checkout providers issue it
/// later, with the first webhook.
#[derive(Debug, Clone)]
pub struct PaymentInit {
    pub success: bool,
    pub checkout_url: Option<String>,
    pub external_id: Option<String>,
    pub external_reference: String,
    pub instructions: Option<TransferInstructions>,
    pub error_message: Option<String>,
    pub raw: serde_json::Value,
}

impl PaymentInit {
    pub fn failed(reference: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            checkout_url: None,
            external_id: None,
            external_reference: reference.to_string(),
            instructions: None,
            error_message: Some(message.into()),
            raw: serde_json::Value::Null,
        }
    }
}

/// `external_reference` is the merchant reference (our order number) echoed
/// back by the provider; it is how a provider payment id is correlated with
/// a stored payment the first time it is seen.
#[derive(Debug, Clone)]
pub struct PaymentQuery {
    pub success: bool,
    pub status: PaymentStatus,
    pub amount_minor: Option<i64>,
    pub external_reference: Option<String>,
    pub detail: Option<String>,
    pub raw: serde_json::Value,
}

impl PaymentQuery {
    /// Best-effort answer for providers without a query API.
    pub fn pending(detail: impl Into<String>) -> Self {
        Self {
            success: true,
            status: PaymentStatus::Pending,
            amount_minor: None,
            external_reference: None,
            detail: Some(detail.into()),
            raw: serde_json::Value::Null,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookOutcome {
    pub success: bool,
    pub external_id: Option<String>,
    pub external_reference: Option<String>,
    pub status: Option<PaymentStatus>,
    pub detail: Option<String>,
}

impl WebhookOutcome {
    pub fn ignored(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            external_id: None,
            external_reference: None,
            status: None,
            detail: Some(detail.into()),
        }
    }
}

/// Uniform capability set every payment provider implements. All four
/// operations report failures through their result shapes so the caller
/// never has to branch on provider type or catch provider errors.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn test_connection(&self, config: &GatewayConfig) -> ConnectionCheck;

    async fn create_payment(&self, config: &GatewayConfig, data: &PaymentRequestData)
        -> PaymentInit;

    async fn query_payment(&self, config: &GatewayConfig, external_id: &str) -> PaymentQuery;

    async fn process_webhook(
        &self,
        config: &GatewayConfig,
        payload: &serde_json::Value,
    ) -> WebhookOutcome;
}

/// Provider-id to adapter mapping, built once in `main` and shared read-only
/// behind an `Arc`. Several provider ids may share one adapter instance
/// (credit and debit cards share the generic card adapter).
#[derive(Default)]
pub struct GatewayRegistry {
    adapters: HashMap<PaymentProvider, Arc<dyn PaymentGateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: PaymentProvider, adapter: Arc<dyn PaymentGateway>) {
        self.adapters.insert(provider, adapter);
    }

    pub fn get(&self, provider: PaymentProvider) -> Result<Arc<dyn PaymentGateway>, ServiceError> {
        self.adapters.get(&provider).cloned().ok_or_else(|| {
            ServiceError::Configuration(format!(
                "no adapter registered for provider {}",
                provider.as_str()
            ))
        })
    }

    pub fn has(&self, provider: PaymentProvider) -> bool {
        self.adapters.contains_key(&provider)
    }
}
