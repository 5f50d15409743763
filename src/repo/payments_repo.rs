use anyhow::Context;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::payment::{Payment, PaymentStatus};
use crate::gateways::PaymentProvider;

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

impl PaymentsRepo {
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        payment: &Payment,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, provider, external_id, external_reference,
                amount_minor, currency, status, metadata, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(payment.id)
        .bind(payment.order_id)
        .bind(payment.provider.as_str())
        .bind(payment.external_id.clone())
        .bind(&payment.external_reference)
        .bind(payment.amount_minor)
        .bind(&payment.currency)
        .bind(payment.status.as_str())
        .bind(&payment.metadata)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Payment>> {
        let row = sqlx::query("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_payment).transpose()
    }

    /// Lookup by the id the provider issued. Webhooks identify payments this
    /// way; falls back to the external reference (order number) for
    /// providers that echo it instead.
    pub async fn find_by_external(
        &self,
        provider: PaymentProvider,
        external_id: &str,
    ) -> anyhow::Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM payments
            WHERE provider = $1 AND (external_id = $2 OR external_reference = $2)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(provider.as_str())
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_payment).transpose()
    }

    /// Re-reads the current status under a row lock so a concurrent update
    /// cannot slip between the lattice check and the write.
    pub async fn lock_status_tx(
        tx: &mut Transaction<'_, Postgres>,
        payment_id: Uuid,
    ) -> anyhow::Result<Option<PaymentStatus>> {
        let row = sqlx::query("SELECT status FROM payments WHERE id = $1 FOR UPDATE")
            .bind(payment_id)
            .fetch_optional(tx.as_mut())
            .await?;

        row.map(|r| {
            let status: String = r.get("status");
            PaymentStatus::parse(&status)
                .with_context(|| format!("unknown payment status {status}"))
        })
        .transpose()
    }

    pub async fn update_status_tx(
        tx: &mut Transaction<'_, Postgres>,
        payment_id: Uuid,
        status: PaymentStatus,
        external_id: Option<&str>,
        metadata: Option<&serde_json::Value>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                external_id = COALESCE($3, external_id),
                metadata = COALESCE($4, metadata),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(payment_id)
        .bind(status.as_str())
        .bind(external_id)
        .bind(metadata)
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }
}

fn row_to_payment(r: sqlx::postgres::PgRow) -> anyhow::Result<Payment> {
    let provider: String = r.get("provider");
    let status: String = r.get("status");

    Ok(Payment {
        id: r.get("id"),
        order_id: r.get("order_id"),
        provider: PaymentProvider::parse(&provider)
            .with_context(|| format!("unknown provider {provider}"))?,
        external_id: r.get("external_id"),
        external_reference: r.get("external_reference"),
        amount_minor: r.get("amount_minor"),
        currency: r.get("currency"),
        status: PaymentStatus::parse(&status)
            .with_context(|| format!("unknown payment status {status}"))?,
        metadata: r.get("metadata"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}
