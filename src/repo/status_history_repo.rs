use anyhow::Context;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::order::{DeliveryStatus, StatusHistoryEntry};

#[derive(Clone)]
pub struct StatusHistoryRepo {
    pub pool: PgPool,
}

impl StatusHistoryRepo {
    /// Appended in the same transaction as the order update so the trail can
    /// never diverge from the order's current state.
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        previous: DeliveryStatus,
        new: DeliveryStatus,
        actor_id: Option<&str>,
        notes: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_status_history (
                id, order_id, previous_status, new_status, actor_id, notes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(previous.as_str())
        .bind(new.as_str())
        .bind(actor_id)
        .bind(notes)
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }

    pub async fn list_for_order(&self, order_id: Uuid) -> anyhow::Result<Vec<StatusHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, previous_status, new_status, actor_id, notes, created_at
            FROM order_status_history
            WHERE order_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let previous: String = r.get("previous_status");
                let new: String = r.get("new_status");
                Ok(StatusHistoryEntry {
                    id: r.get("id"),
                    order_id: r.get("order_id"),
                    previous_status: DeliveryStatus::parse(&previous)
                        .with_context(|| format!("unknown delivery status {previous}"))?,
                    new_status: DeliveryStatus::parse(&new)
                        .with_context(|| format!("unknown delivery status {new}"))?,
                    actor_id: r.get("actor_id"),
                    notes: r.get("notes"),
                    created_at: r.get("created_at"),
                })
            })
            .collect()
    }
}
