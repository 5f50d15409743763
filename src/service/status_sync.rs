use chrono::Utc;
use sqlx::PgPool;

use crate::domain::delivery::{apply_delivery_transition, DeliverySnapshot};
use crate::domain::order::{DeliveryStatus, Order};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::repo::orders_repo::{DeliveryRowUpdate, OrdersRepo};
use crate::repo::payments_repo::PaymentsRepo;
use crate::repo::status_history_repo::StatusHistoryRepo;

const PAYMENT_CANCELLED_NOTE: &str = "payment failed or was cancelled by the provider";

/// Applies a provider-reported status to a payment, guarding the monotonic
/// lattice: stale or duplicate reports never move a payment backward. A
/// failed or cancelled payment also cancels the order, in the same
/// transaction. Returns whether the update was applied.
pub async fn apply_payment_status(
    pool: &PgPool,
    order: &Order,
    payment: &Payment,
    new_status: PaymentStatus,
    external_id: Option<&str>,
    metadata: Option<&serde_json::Value>,
) -> anyhow::Result<bool> {
    let mut tx = pool.begin().await?;

    // the guard runs against the row as locked inside this transaction, not
    // against the caller's snapshot; two concurrent deliveries serialize
    // here and the slower one is rejected
    let Some(current) = PaymentsRepo::lock_status_tx(&mut tx, payment.id).await? else {
        anyhow::bail!("payment {} disappeared", payment.id);
    };
    if !current.accepts(new_status) {
        if current != new_status {
            tracing::warn!(
                "rejected payment status regression for {}: {} -> {}",
                payment.id,
                current.as_str(),
                new_status.as_str()
            );
        }
        return Ok(false);
    }

    PaymentsRepo::update_status_tx(&mut tx, payment.id, new_status, external_id, metadata).await?;

    if matches!(new_status, PaymentStatus::Failed | PaymentStatus::Cancelled) {
        let snapshot = DeliverySnapshot {
            status: order.delivery_status,
            attempts: order.delivery_attempts,
            receipt_confirmed: order.receipt_confirmed,
        };

        match apply_delivery_transition(&snapshot, DeliveryStatus::Cancelled, Utc::now()) {
            Ok(transition) => {
                OrdersRepo::apply_delivery_tx(
                    &mut tx,
                    order.id,
                    &DeliveryRowUpdate {
                        delivery_status: transition.to,
                        delivery_attempts: transition.attempts,
                        last_attempt_at: None,
                        order_status: transition.order_status,
                        cancellation_reason: Some(PAYMENT_CANCELLED_NOTE.to_string()),
                        receipt_confirmed_at: None,
                    },
                )
                .await?;
                StatusHistoryRepo::insert_tx(
                    &mut tx,
                    order.id,
                    transition.from,
                    transition.to,
                    None,
                    Some(PAYMENT_CANCELLED_NOTE),
                )
                .await?;
            }
            Err(e) => {
                // delivered or already-cancelled orders are left alone
                tracing::warn!(
                    "payment {} moved to {} but order {} was not cancelled: {e}",
                    payment.id,
                    new_status.as_str(),
                    order.id
                );
            }
        }
    }

    tx.commit().await?;
    Ok(true)
}
