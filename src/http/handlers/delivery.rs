use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::{DeliveryStatus, Order, StatusHistoryEntry};
use crate::error::ServiceError;
use crate::http::middleware::identity::Actor;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryRequest {
    pub status: String,
    pub notes: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrackingView {
    pub order: Order,
    pub history: Vec<StatusHistoryEntry>,
}

pub async fn set_delivery_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateDeliveryRequest>,
) -> impl IntoResponse {
    // parsed by hand so an unknown status yields a 400 with the bad value
    let Some(requested) = DeliveryStatus::parse(&req.status) else {
        return ServiceError::Validation(format!("unknown delivery status {}", req.status))
            .into_response();
    };

    match state
        .delivery_service
        .set_delivery_status(&actor, order_id, requested, req.notes, req.reason)
        .await
    {
        Ok(order) => (axum::http::StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn confirm_receipt(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.delivery_service.confirm_receipt(&actor, order_id).await {
        Ok(order) => (axum::http::StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn tracking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.delivery_service.tracking(&actor, order_id).await {
        Ok((order, history)) => {
            (axum::http::StatusCode::OK, Json(TrackingView { order, history })).into_response()
        }
        Err(e) => e.into_response(),
    }
}
