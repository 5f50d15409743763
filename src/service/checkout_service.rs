use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::order::{DeliveryStatus, Order, OrderStatus};
use crate::domain::payment::{
    CheckoutResponse, CreateCheckoutRequest, Payment, PaymentStatus, PaymentView,
};
use crate::error::ServiceError;
use crate::gateways::{GatewayRegistry, PaymentProvider, PaymentRequestData};
use crate::http::middleware::identity::Actor;
use crate::repo::orders_repo::OrdersRepo;
use crate::repo::payments_repo::PaymentsRepo;
use crate::service::notifier::Notifier;
use crate::service::status_sync::apply_payment_status;

#[derive(Clone)]
pub struct CheckoutService {
    pub pool: PgPool,
    pub orders_repo: OrdersRepo,
    pub payments_repo: PaymentsRepo,
    pub registry: Arc<GatewayRegistry>,
    pub app_config: AppConfig,
    pub notifier: Notifier,
}

impl CheckoutService {
    pub async fn create_payment(
        &self,
        actor: &Actor,
        req: CreateCheckoutRequest,
    ) -> Result<CheckoutResponse, ServiceError> {
        validate_request(&req)?;

        if !self.registry.has(req.provider) {
            return Err(ServiceError::Validation(format!(
                "payment method {} is not supported",
                req.provider.as_str()
            )));
        }
        let adapter = self.registry.get(req.provider)?;

        let total_minor: i64 = req.items.iter().map(|i| i.line_total_minor()).sum();
        let order_id = Uuid::new_v4();
        let order_number = new_order_number();

        let gateway_config = self.app_config.gateway_config(req.provider);
        let init = adapter
            .create_payment(
                &gateway_config,
                &PaymentRequestData {
                    order_id,
                    order_number: order_number.clone(),
                    amount_minor: total_minor,
                    currency: self.app_config.currency.clone(),
                    description: format!("Order {order_number}"),
                    customer_email: req.customer_email.clone(),
                },
            )
            .await;

        if !init.success {
            tracing::warn!(
                "payment init failed for order {} via {}: {}",
                order_number,
                req.provider.as_str(),
                init.error_message.as_deref().unwrap_or("unknown error")
            );
            return Err(ServiceError::PaymentInit);
        }

        let now = Utc::now();
        let order = Order {
            id: order_id,
            order_number: order_number.clone(),
            customer_id: actor.user_id.clone(),
            items: req.items,
            total_minor,
            currency: self.app_config.currency.clone(),
            status: OrderStatus::InProcess,
            delivery_status: DeliveryStatus::Pending,
            delivery_attempts: 0,
            receipt_confirmed: false,
            receipt_confirmed_at: None,
            last_attempt_at: None,
            cancellation_reason: None,
            fulfillment: req.fulfillment,
            courier: req.courier,
            tracking_code: None,
            invoice_url: None,
            created_at: now,
        };

        let payment = Payment {
            id: Uuid::new_v4(),
            order_id,
            provider: req.provider,
            external_id: init.external_id.clone(),
            external_reference: init.external_reference.clone(),
            amount_minor: total_minor,
            currency: self.app_config.currency.clone(),
            status: PaymentStatus::Pending,
            metadata: init.raw.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;
        OrdersRepo::insert_tx(&mut tx, &order).await?;
        PaymentsRepo::insert_tx(&mut tx, &payment).await?;
        tx.commit().await.map_err(anyhow::Error::from)?;

        self.notifier
            .emit(
                "payment.created",
                serde_json::json!({
                    "order_id": order_id,
                    "payment_id": payment.id,
                    "provider": req.provider.as_str(),
                }),
            )
            .await;

        Ok(CheckoutResponse {
            order_id,
            order_number,
            payment_id: payment.id,
            provider: req.provider,
            status: payment.status,
            checkout_url: init.checkout_url,
            instructions: init.instructions,
        })
    }

    /// Stored view, refreshed through the provider's query API when the
    /// payment is still in flight. The same lattice guard as webhook
    /// ingestion applies.
    pub async fn get_payment(
        &self,
        actor: &Actor,
        payment_id: Uuid,
    ) -> Result<PaymentView, ServiceError> {
        let payment = self
            .payments_repo
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("payment not found".to_string()))?;

        let order = self
            .orders_repo
            .find_by_id(payment.order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("order not found".to_string()))?;

        if !actor.is_staff() && order.customer_id != actor.user_id {
            return Err(ServiceError::Forbidden(
                "payment belongs to another customer".to_string(),
            ));
        }

        if payment.status.is_terminal() || payment.provider != PaymentProvider::MercadoPago {
            return Ok(PaymentView::from_payment(&payment));
        }
        let Some(external_id) = payment.external_id.clone() else {
            return Ok(PaymentView::from_payment(&payment));
        };

        let adapter = self.registry.get(payment.provider)?;
        let gateway_config = self.app_config.gateway_config(payment.provider);
        let query = adapter.query_payment(&gateway_config, &external_id).await;

        if query.success
            && apply_payment_status(
                &self.pool,
                &order,
                &payment,
                query.status,
                None,
                Some(&query.raw),
            )
            .await?
        {
            let refreshed = self
                .payments_repo
                .find_by_id(payment_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound("payment not found".to_string()))?;
            return Ok(PaymentView::from_payment(&refreshed));
        }

        Ok(PaymentView::from_payment(&payment))
    }
}

fn validate_request(req: &CreateCheckoutRequest) -> Result<(), ServiceError> {
    if req.items.is_empty() {
        return Err(ServiceError::Validation("order has no items".to_string()));
    }
    for item in &req.items {
        if item.quantity == 0 {
            return Err(ServiceError::Validation(
                "item quantity must be > 0".to_string(),
            ));
        }
        if item.unit_price_minor <= 0 {
            return Err(ServiceError::Validation(
                "item unit price must be > 0".to_string(),
            ));
        }
    }
    Ok(())
}

fn new_order_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "ORD-{}-{}",
        Utc::now().format("%Y%m%d"),
        suffix[..8].to_uppercase()
    )
}
