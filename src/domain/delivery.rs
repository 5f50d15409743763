use chrono::{DateTime, Utc};

use crate::domain::order::{DeliveryStatus, OrderStatus};

/// Failed courier visits allowed before the order is forced to in-store
/// pickup.
pub const MAX_DELIVERY_ATTEMPTS: i32 = 2;

pub const MAX_ATTEMPTS_NOTE: &str = "maximum delivery attempts reached";
pub const CUSTOMER_PICKUP_NOTE: &str =
    "customer opted for in-store pickup after failed delivery attempts";

/// The delivery-relevant slice of an order, used as input to the pure
/// transition functions below.
#[derive(Debug, Clone)]
pub struct DeliverySnapshot {
    pub status: DeliveryStatus,
    pub attempts: i32,
    pub receipt_confirmed: bool,
}

/// The effective transition to persist. `to` may differ from the requested
/// status (escalation); `order_status` carries the coarse commercial status
/// to sync when the transition reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTransition {
    pub from: DeliveryStatus,
    pub to: DeliveryStatus,
    pub attempts: i32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub system_note: Option<&'static str>,
    pub order_status: Option<OrderStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    AlreadyConfirmed,
    OrderCancelled,
    AlreadyDelivered,
    InvalidTarget(DeliveryStatus),
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::AlreadyConfirmed => {
                write!(f, "customer already confirmed receipt of this order")
            }
            TransitionError::OrderCancelled => write!(f, "order is cancelled"),
            TransitionError::AlreadyDelivered => write!(f, "order is already delivered"),
            TransitionError::InvalidTarget(s) => {
                write!(f, "cannot move order to {}", s.as_str())
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Staff-driven transition table.
///
/// Escalation is explicit here: a `VISITADO_NO_ENTREGADO` request against an
/// order that already burned its delivery attempts resolves to
/// `RETIRO_EN_LOCAL` without a further increment.
pub fn apply_delivery_transition(
    snapshot: &DeliverySnapshot,
    requested: DeliveryStatus,
    now: DateTime<Utc>,
) -> Result<DeliveryTransition, TransitionError> {
    if snapshot.status == DeliveryStatus::Cancelled {
        return Err(TransitionError::OrderCancelled);
    }

    if snapshot.receipt_confirmed {
        if requested == DeliveryStatus::Delivered {
            return Ok(reaffirm_delivered(snapshot));
        }
        return Err(TransitionError::AlreadyConfirmed);
    }

    if snapshot.status == DeliveryStatus::Delivered {
        if requested == DeliveryStatus::Delivered {
            return Ok(reaffirm_delivered(snapshot));
        }
        return Err(TransitionError::AlreadyDelivered);
    }

    match requested {
        DeliveryStatus::Pending => Err(TransitionError::InvalidTarget(requested)),
        DeliveryStatus::Delivered => Ok(DeliveryTransition {
            from: snapshot.status,
            to: DeliveryStatus::Delivered,
            attempts: snapshot.attempts,
            last_attempt_at: None,
            system_note: None,
            order_status: Some(OrderStatus::Delivered),
        }),
        DeliveryStatus::VisitedNotDelivered => {
            if snapshot.attempts >= MAX_DELIVERY_ATTEMPTS {
                Ok(DeliveryTransition {
                    from: snapshot.status,
                    to: DeliveryStatus::PickupInStore,
                    attempts: snapshot.attempts,
                    last_attempt_at: None,
                    system_note: Some(MAX_ATTEMPTS_NOTE),
                    order_status: None,
                })
            } else {
                Ok(DeliveryTransition {
                    from: snapshot.status,
                    to: DeliveryStatus::VisitedNotDelivered,
                    attempts: snapshot.attempts + 1,
                    last_attempt_at: Some(now),
                    system_note: None,
                    order_status: None,
                })
            }
        }
        DeliveryStatus::PickupInStore => Ok(DeliveryTransition {
            from: snapshot.status,
            to: DeliveryStatus::PickupInStore,
            attempts: snapshot.attempts,
            last_attempt_at: None,
            system_note: None,
            order_status: None,
        }),
        DeliveryStatus::Cancelled => Ok(DeliveryTransition {
            from: snapshot.status,
            to: DeliveryStatus::Cancelled,
            attempts: snapshot.attempts,
            last_attempt_at: None,
            system_note: None,
            order_status: Some(OrderStatus::Cancelled),
        }),
    }
}

/// Customer-driven receipt confirmation. Ownership is checked by the caller;
/// this resolves only what the confirmed state should be.
pub fn resolve_confirmation(
    snapshot: &DeliverySnapshot,
) -> Result<DeliveryTransition, TransitionError> {
    if snapshot.status == DeliveryStatus::Cancelled {
        return Err(TransitionError::OrderCancelled);
    }
    if snapshot.receipt_confirmed {
        return Err(TransitionError::AlreadyConfirmed);
    }

    if snapshot.status == DeliveryStatus::VisitedNotDelivered
        && snapshot.attempts >= MAX_DELIVERY_ATTEMPTS
    {
        return Ok(DeliveryTransition {
            from: snapshot.status,
            to: DeliveryStatus::PickupInStore,
            attempts: snapshot.attempts,
            last_attempt_at: None,
            system_note: Some(CUSTOMER_PICKUP_NOTE),
            order_status: None,
        });
    }

    Ok(DeliveryTransition {
        from: snapshot.status,
        to: DeliveryStatus::Delivered,
        attempts: snapshot.attempts,
        last_attempt_at: None,
        system_note: None,
        order_status: Some(OrderStatus::Delivered),
    })
}

fn reaffirm_delivered(snapshot: &DeliverySnapshot) -> DeliveryTransition {
    DeliveryTransition {
        from: snapshot.status,
        to: DeliveryStatus::Delivered,
        attempts: snapshot.attempts,
        last_attempt_at: None,
        system_note: None,
        order_status: Some(OrderStatus::Delivered),
    }
}
