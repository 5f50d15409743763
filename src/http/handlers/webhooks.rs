use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::gateways::PaymentProvider;
use crate::AppState;

/// Lenient body parse: providers send whatever they send, and a body we
/// cannot read is logged and dropped, never bounced back as a 4xx.
pub fn parse_body(body: &[u8]) -> Option<serde_json::Value> {
    match serde_json::from_slice(body) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::info!("unparseable webhook body ignored: {e}");
            None
        }
    }
}

fn ack() -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "received": true })),
    )
}

/// MercadoPago's configured notification endpoint. Acknowledged no matter
/// what the body contains, so the provider never enters a retry storm.
pub async fn mercadopago_webhook(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    if let Some(payload) = parse_body(&body) {
        state
            .webhook_service
            .ingest(PaymentProvider::MercadoPago, payload)
            .await;
    }
    ack()
}

/// Generic per-provider endpoint. Unknown provider segments are still
/// acknowledged; there is nothing useful to tell the caller.
pub async fn provider_webhook(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    match (PaymentProvider::parse(&provider), parse_body(&body)) {
        (Some(p), Some(payload)) => state.webhook_service.ingest(p, payload).await,
        (None, _) => tracing::info!("webhook for unknown provider {provider} ignored"),
        (_, None) => {}
    }
    ack()
}
