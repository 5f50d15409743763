use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::domain::payment::CreateCheckoutRequest;
use crate::http::middleware::identity::Actor;
use crate::AppState;

pub async fn create_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateCheckoutRequest>,
) -> impl IntoResponse {
    match state.checkout_service.create_payment(&actor, req).await {
        Ok(resp) => (axum::http::StatusCode::CREATED, Json(resp)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.checkout_service.get_payment(&actor, payment_id).await {
        Ok(view) => (axum::http::StatusCode::OK, Json(view)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}
