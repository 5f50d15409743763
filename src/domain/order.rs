use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse commercial status. Wire and database values keep the store's
/// original Spanish vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "EN_PROCESO")]
    InProcess,
    #[serde(rename = "ENTREGADO")]
    Delivered,
    #[serde(rename = "CANCELADO")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::InProcess => "EN_PROCESO",
            OrderStatus::Delivered => "ENTREGADO",
            OrderStatus::Cancelled => "CANCELADO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EN_PROCESO" => Some(OrderStatus::InProcess),
            "ENTREGADO" => Some(OrderStatus::Delivered),
            "CANCELADO" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// Fine-grained fulfillment status, distinct from the payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "VISITADO_NO_ENTREGADO")]
    VisitedNotDelivered,
    #[serde(rename = "RETIRO_EN_LOCAL")]
    PickupInStore,
    #[serde(rename = "ENTREGADO")]
    Delivered,
    #[serde(rename = "CANCELADO")]
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDIENTE",
            DeliveryStatus::VisitedNotDelivered => "VISITADO_NO_ENTREGADO",
            DeliveryStatus::PickupInStore => "RETIRO_EN_LOCAL",
            DeliveryStatus::Delivered => "ENTREGADO",
            DeliveryStatus::Cancelled => "CANCELADO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDIENTE" => Some(DeliveryStatus::Pending),
            "VISITADO_NO_ENTREGADO" => Some(DeliveryStatus::VisitedNotDelivered),
            "RETIRO_EN_LOCAL" => Some(DeliveryStatus::PickupInStore),
            "ENTREGADO" => Some(DeliveryStatus::Delivered),
            "CANCELADO" => Some(DeliveryStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Fulfillment {
    Shipping,
    Pickup,
}

impl Fulfillment {
    pub fn as_str(self) -> &'static str {
        match self {
            Fulfillment::Shipping => "SHIPPING",
            Fulfillment::Pickup => "PICKUP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SHIPPING" => Some(Fulfillment::Shipping),
            "PICKUP" => Some(Fulfillment::Pickup),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub unit_price_minor: i64,
}

impl OrderItem {
    pub fn line_total_minor(&self) -> i64 {
        self.unit_price_minor * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: String,
    pub items: Vec<OrderItem>,
    pub total_minor: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub delivery_status: DeliveryStatus,
    pub delivery_attempts: i32,
    pub receipt_confirmed: bool,
    pub receipt_confirmed_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub fulfillment: Fulfillment,
    pub courier: Option<String>,
    pub tracking_code: Option<String>,
    pub invoice_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One appended row of the delivery audit trail. Append-only: rows are
/// never updated or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub previous_status: DeliveryStatus,
    pub new_status: DeliveryStatus,
    pub actor_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
