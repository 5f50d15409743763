use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::delivery::{
    apply_delivery_transition, resolve_confirmation, DeliverySnapshot, TransitionError,
};
use crate::domain::order::{DeliveryStatus, Order, StatusHistoryEntry};
use crate::error::ServiceError;
use crate::http::middleware::identity::Actor;
use crate::repo::orders_repo::{DeliveryRowUpdate, OrdersRepo};
use crate::repo::status_history_repo::StatusHistoryRepo;
use crate::service::notifier::Notifier;

#[derive(Clone)]
pub struct DeliveryService {
    pub pool: PgPool,
    pub orders_repo: OrdersRepo,
    pub history_repo: StatusHistoryRepo,
    pub notifier: Notifier,
}

impl DeliveryService {
    /// Staff-driven transition. The requested status may be substituted by
    /// the transition table (escalation to in-store pickup); the history row
    /// records what actually happened.
    pub async fn set_delivery_status(
        &self,
        actor: &Actor,
        order_id: Uuid,
        requested: DeliveryStatus,
        notes: Option<String>,
        reason: Option<String>,
    ) -> Result<Order, ServiceError> {
        if !actor.is_staff() {
            return Err(ServiceError::Forbidden(
                "only staff can update delivery status".to_string(),
            ));
        }

        let order = self.load_order(order_id).await?;
        let snapshot = snapshot_of(&order);
        let transition =
            apply_delivery_transition(&snapshot, requested, Utc::now()).map_err(conflict)?;

        let mut note_parts: Vec<String> = Vec::new();
        if let Some(n) = notes.filter(|n| !n.is_empty()) {
            note_parts.push(n);
        }
        if let Some(r) = reason.clone().filter(|r| !r.is_empty()) {
            note_parts.push(format!("reason: {r}"));
        }
        if let Some(s) = transition.system_note {
            note_parts.push(s.to_string());
        }
        let history_notes = if note_parts.is_empty() {
            None
        } else {
            Some(note_parts.join("; "))
        };

        let cancellation_reason = (transition.to == DeliveryStatus::Cancelled)
            .then(|| reason.unwrap_or_else(|| "cancelled by staff".to_string()));

        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;
        OrdersRepo::apply_delivery_tx(
            &mut tx,
            order_id,
            &DeliveryRowUpdate {
                delivery_status: transition.to,
                delivery_attempts: transition.attempts,
                last_attempt_at: transition.last_attempt_at,
                order_status: transition.order_status,
                cancellation_reason,
                receipt_confirmed_at: None,
            },
        )
        .await?;
        StatusHistoryRepo::insert_tx(
            &mut tx,
            order_id,
            transition.from,
            transition.to,
            Some(&actor.user_id),
            history_notes.as_deref(),
        )
        .await?;
        tx.commit().await.map_err(anyhow::Error::from)?;

        self.notifier
            .emit(
                "order.status_changed",
                serde_json::json!({
                    "order_id": order_id,
                    "previous": transition.from.as_str(),
                    "new": transition.to.as_str(),
                }),
            )
            .await;

        self.load_order(order_id).await
    }

    /// Customer confirmation of receipt. After two failed visits the order
    /// resolves to in-store pickup instead of delivered.
    pub async fn confirm_receipt(&self, actor: &Actor, order_id: Uuid) -> Result<Order, ServiceError> {
        let order = self.load_order(order_id).await?;
        if order.customer_id != actor.user_id {
            return Err(ServiceError::Forbidden(
                "order belongs to another customer".to_string(),
            ));
        }

        let snapshot = snapshot_of(&order);
        let transition = resolve_confirmation(&snapshot).map_err(conflict)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;
        OrdersRepo::apply_delivery_tx(
            &mut tx,
            order_id,
            &DeliveryRowUpdate {
                delivery_status: transition.to,
                delivery_attempts: transition.attempts,
                last_attempt_at: None,
                order_status: transition.order_status,
                cancellation_reason: None,
                receipt_confirmed_at: Some(now),
            },
        )
        .await?;
        StatusHistoryRepo::insert_tx(
            &mut tx,
            order_id,
            transition.from,
            transition.to,
            Some(&actor.user_id),
            Some(
                transition
                    .system_note
                    .unwrap_or("customer confirmed receipt"),
            ),
        )
        .await?;
        tx.commit().await.map_err(anyhow::Error::from)?;

        self.notifier
            .emit(
                "order.status_changed",
                serde_json::json!({
                    "order_id": order_id,
                    "previous": transition.from.as_str(),
                    "new": transition.to.as_str(),
                    "receipt_confirmed": true,
                }),
            )
            .await;

        self.load_order(order_id).await
    }

    pub async fn tracking(
        &self,
        actor: &Actor,
        order_id: Uuid,
    ) -> Result<(Order, Vec<StatusHistoryEntry>), ServiceError> {
        let order = self.load_order(order_id).await?;
        if !actor.is_staff() && order.customer_id != actor.user_id {
            return Err(ServiceError::Forbidden(
                "order belongs to another customer".to_string(),
            ));
        }

        let history = self.history_repo.list_for_order(order_id).await?;
        Ok((order, history))
    }

    async fn load_order(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        self.orders_repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("order not found".to_string()))
    }
}

fn snapshot_of(order: &Order) -> DeliverySnapshot {
    DeliverySnapshot {
        status: order.delivery_status,
        attempts: order.delivery_attempts,
        receipt_confirmed: order.receipt_confirmed,
    }
}

fn conflict(e: TransitionError) -> ServiceError {
    match e {
        TransitionError::InvalidTarget(_) => ServiceError::Validation(e.to_string()),
        _ => ServiceError::StateConflict(e.to_string()),
    }
}
