use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::gateways::{GatewayRegistry, PaymentProvider};
use crate::repo::orders_repo::OrdersRepo;
use crate::repo::payments_repo::PaymentsRepo;
use crate::service::notifier::Notifier;
use crate::service::status_sync::apply_payment_status;

#[derive(Clone)]
pub struct WebhookService {
    pub pool: PgPool,
    pub payments_repo: PaymentsRepo,
    pub orders_repo: OrdersRepo,
    pub registry: Arc<GatewayRegistry>,
    pub app_config: AppConfig,
    pub notifier: Notifier,
}

impl WebhookService {
    /// Providers always get an acknowledgement; processing failures are
    /// logged here so a provider-side retry storm is never triggered.
    pub async fn ingest(&self, provider: PaymentProvider, payload: serde_json::Value) {
        if let Err(e) = self.try_ingest(provider, payload).await {
            tracing::warn!("webhook processing failed for {}: {e:#}", provider.as_str());
        }
    }

    async fn try_ingest(
        &self,
        provider: PaymentProvider,
        payload: serde_json::Value,
    ) -> anyhow::Result<()> {
        let adapter = self.registry.get(provider)?;
        let gateway_config = self.app_config.gateway_config(provider);

        let outcome = adapter.process_webhook(&gateway_config, &payload).await;
        if !outcome.success {
            tracing::info!(
                "webhook ignored for {}: {}",
                provider.as_str(),
                outcome.detail.as_deref().unwrap_or("no detail")
            );
            return Ok(());
        }
        let Some(external_id) = outcome.external_id else {
            tracing::info!("webhook for {} carried no reference id", provider.as_str());
            return Ok(());
        };

        // a payment id is first seen here; the provider's echoed merchant
        // reference (the order number) is what correlates it with our row
        let lookup_key = outcome
            .external_reference
            .clone()
            .unwrap_or_else(|| external_id.clone());
        let Some(payment) = self
            .payments_repo
            .find_by_external(provider, &lookup_key)
            .await?
        else {
            tracing::info!(
                "webhook for {} references unknown payment {lookup_key}",
                provider.as_str()
            );
            return Ok(());
        };

        // adapters that cannot normalize status from the payload fall back
        // to a synchronous query
        let status = match outcome.status {
            Some(s) => s,
            None => {
                let query = adapter.query_payment(&gateway_config, &external_id).await;
                if !query.success {
                    tracing::info!(
                        "could not resolve status for payment {external_id}: {}",
                        query.detail.as_deref().unwrap_or("no detail")
                    );
                    return Ok(());
                }
                query.status
            }
        };

        let Some(order) = self.orders_repo.find_by_id(payment.order_id).await? else {
            anyhow::bail!("payment {} references missing order", payment.id);
        };

        let applied = apply_payment_status(
            &self.pool,
            &order,
            &payment,
            status,
            Some(&external_id),
            None,
        )
        .await?;

        if applied {
            self.notifier
                .emit(
                    "payment.status_changed",
                    serde_json::json!({
                        "payment_id": payment.id,
                        "order_id": payment.order_id,
                        "status": status.as_str(),
                    }),
                )
                .await;
        }

        Ok(())
    }
}
