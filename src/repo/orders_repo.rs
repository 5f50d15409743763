use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::order::{DeliveryStatus, Fulfillment, Order, OrderStatus};

#[derive(Clone)]
pub struct OrdersRepo {
    pub pool: PgPool,
}

/// Column set written by one delivery transition. `order_status` and the
/// confirmation timestamp are applied only when present so unrelated columns
/// keep their value.
pub struct DeliveryRowUpdate {
    pub delivery_status: DeliveryStatus,
    pub delivery_attempts: i32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub order_status: Option<OrderStatus>,
    pub cancellation_reason: Option<String>,
    pub receipt_confirmed_at: Option<DateTime<Utc>>,
}

impl OrdersRepo {
    pub async fn insert_tx(tx: &mut Transaction<'_, Postgres>, order: &Order) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, customer_id, items, total_minor, currency,
                status, delivery_status, delivery_attempts, receipt_confirmed,
                fulfillment, courier, tracking_code, invoice_url, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9, $10,
                $11, $12, $13, $14, $15
            )
            "#,
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(&order.customer_id)
        .bind(serde_json::to_value(&order.items)?)
        .bind(order.total_minor)
        .bind(&order.currency)
        .bind(order.status.as_str())
        .bind(order.delivery_status.as_str())
        .bind(order.delivery_attempts)
        .bind(order.receipt_confirmed)
        .bind(order.fulfillment.as_str())
        .bind(order.courier.clone())
        .bind(order.tracking_code.clone())
        .bind(order.invoice_url.clone())
        .bind(order.created_at)
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_order).transpose()
    }

    pub async fn apply_delivery_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        update: &DeliveryRowUpdate,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE orders SET
                delivery_status = $2,
                delivery_attempts = $3,
                last_attempt_at = COALESCE($4, last_attempt_at),
                status = COALESCE($5, status),
                cancellation_reason = COALESCE($6, cancellation_reason),
                receipt_confirmed = (receipt_confirmed OR $7::timestamptz IS NOT NULL),
                receipt_confirmed_at = COALESCE($7, receipt_confirmed_at)
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .bind(update.delivery_status.as_str())
        .bind(update.delivery_attempts)
        .bind(update.last_attempt_at)
        .bind(update.order_status.map(OrderStatus::as_str))
        .bind(update.cancellation_reason.clone())
        .bind(update.receipt_confirmed_at)
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }

    pub async fn set_status_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        status: OrderStatus,
        cancellation_reason: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE orders SET
                status = $2,
                cancellation_reason = COALESCE($3, cancellation_reason)
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .bind(status.as_str())
        .bind(cancellation_reason)
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }
}

fn row_to_order(r: sqlx::postgres::PgRow) -> anyhow::Result<Order> {
    let status: String = r.get("status");
    let delivery_status: String = r.get("delivery_status");
    let fulfillment: String = r.get("fulfillment");
    let items: serde_json::Value = r.get("items");

    Ok(Order {
        id: r.get("id"),
        order_number: r.get("order_number"),
        customer_id: r.get("customer_id"),
        items: serde_json::from_value(items).context("malformed order items")?,
        total_minor: r.get("total_minor"),
        currency: r.get("currency"),
        status: OrderStatus::parse(&status)
            .with_context(|| format!("unknown order status {status}"))?,
        delivery_status: DeliveryStatus::parse(&delivery_status)
            .with_context(|| format!("unknown delivery status {delivery_status}"))?,
        delivery_attempts: r.get("delivery_attempts"),
        receipt_confirmed: r.get("receipt_confirmed"),
        receipt_confirmed_at: r.get("receipt_confirmed_at"),
        last_attempt_at: r.get("last_attempt_at"),
        cancellation_reason: r.get("cancellation_reason"),
        fulfillment: Fulfillment::parse(&fulfillment)
            .with_context(|| format!("unknown fulfillment {fulfillment}"))?,
        courier: r.get("courier"),
        tracking_code: r.get("tracking_code"),
        invoice_url: r.get("invoice_url"),
        created_at: r.get("created_at"),
    })
}
