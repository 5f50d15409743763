use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::{Fulfillment, OrderItem};
use crate::gateways::{PaymentProvider, TransferInstructions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Success,
    Failed,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PaymentStatus::Pending),
            "PROCESSING" => Some(PaymentStatus::Processing),
            "SUCCESS" => Some(PaymentStatus::Success),
            "FAILED" => Some(PaymentStatus::Failed),
            "CANCELLED" => Some(PaymentStatus::Cancelled),
            "REFUNDED" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    // lattice: PENDING < PROCESSING < {SUCCESS, FAILED, CANCELLED} < REFUNDED
    pub fn rank(self) -> u8 {
        match self {
            PaymentStatus::Pending => 0,
            PaymentStatus::Processing => 1,
            PaymentStatus::Success | PaymentStatus::Failed | PaymentStatus::Cancelled => 2,
            PaymentStatus::Refunded => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() >= 2
    }

    /// Whether a webhook or poll result is allowed to replace the current
    /// status. Stale or duplicate deliveries never move a payment backward.
    pub fn accepts(self, next: PaymentStatus) -> bool {
        next.rank() > self.rank()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub provider: PaymentProvider,
    pub external_id: Option<String>,
    pub external_reference: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckoutRequest {
    pub provider: PaymentProvider,
    pub items: Vec<OrderItem>,
    pub fulfillment: Fulfillment,
    pub customer_email: Option<String>,
    pub courier: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    pub order_number: String,
    pub payment_id: Uuid,
    pub provider: PaymentProvider,
    pub status: PaymentStatus,
    pub checkout_url: Option<String>,
    pub instructions: Option<TransferInstructions>,
}

#[derive(Debug, Serialize)]
pub struct PaymentView {
    pub payment_id: Uuid,
    pub order_id: Uuid,
    pub provider: PaymentProvider,
    pub status: PaymentStatus,
    pub amount_minor: i64,
    pub currency: String,
    pub external_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentView {
    pub fn from_payment(p: &Payment) -> Self {
        Self {
            payment_id: p.id,
            order_id: p.order_id,
            provider: p.provider,
            status: p.status,
            amount_minor: p.amount_minor,
            currency: p.currency.clone(),
            external_id: p.external_id.clone(),
            updated_at: p.updated_at,
        }
    }
}
