use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use storefront_payments::domain::payment::PaymentStatus;
use storefront_payments::gateways::mercadopago::MercadoPagoGateway;
use storefront_payments::gateways::{
    GatewayConfig, PaymentGateway, PaymentProvider, PaymentRequestData,
};
use uuid::Uuid;

const ORDER_NUMBER: &str = "ORD-20260827-AB12CD34";
const PAYMENT_ID: &str = "987654321";

async fn payment_by_id(Path(id): Path<String>) -> axum::response::Response {
    if id == PAYMENT_ID {
        Json(json!({
            "id": 987654321,
            "status": "approved",
            "external_reference": ORDER_NUMBER,
            "transaction_amount": 1250.0,
        }))
        .into_response()
    } else {
        // the provider knows nothing but payment ids on this endpoint;
        // preference ids 404 here
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Payment not found" })),
        )
            .into_response()
    }
}

async fn spawn_provider() -> String {
    let app = Router::new()
        .route(
            "/checkout/preferences",
            post(|| async {
                Json(json!({
                    "id": "pref-abc123",
                    "init_point": "https://checkout.example/start/pref-abc123",
                }))
            }),
        )
        .route("/v1/payments/:id", get(payment_by_id));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(base_url: &str) -> GatewayConfig {
    let mut cfg = GatewayConfig::new(PaymentProvider::MercadoPago, 5_000);
    cfg.access_token = Some("TEST-token".to_string());
    cfg.base_url = Some(base_url.to_string());
    cfg.success_url = Some("https://shop.example/checkout/success".to_string());
    cfg.failure_url = Some("https://shop.example/checkout/failure".to_string());
    cfg
}

fn request() -> PaymentRequestData {
    PaymentRequestData {
        order_id: Uuid::new_v4(),
        order_number: ORDER_NUMBER.to_string(),
        amount_minor: 1_250_00,
        currency: "ARS".to_string(),
        description: format!("Order {ORDER_NUMBER}"),
        customer_email: Some("cliente@example.com".to_string()),
    }
}

#[tokio::test]
async fn preference_id_is_not_stored_as_payment_id() {
    let base = spawn_provider().await;
    let gw = MercadoPagoGateway::new();

    let init = gw.create_payment(&config(&base), &request()).await;

    assert!(init.success);
    assert_eq!(
        init.checkout_url.as_deref(),
        Some("https://checkout.example/start/pref-abc123")
    );
    assert_eq!(init.external_reference, ORDER_NUMBER);
    // the checkout preference id is not a payment id; no payment id exists
    // until the provider reports one
    assert_eq!(init.external_id, None);
}

#[tokio::test]
async fn webhook_payment_id_resolves_to_order_reference() {
    let base = spawn_provider().await;
    let gw = MercadoPagoGateway::new();

    let outcome = gw
        .process_webhook(
            &config(&base),
            &json!({ "type": "payment", "data": { "id": PAYMENT_ID } }),
        )
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.external_id.as_deref(), Some(PAYMENT_ID));
    assert_eq!(outcome.external_reference.as_deref(), Some(ORDER_NUMBER));
    assert_eq!(outcome.status, Some(PaymentStatus::Success));
}

#[tokio::test]
async fn query_surfaces_reference_and_amount() {
    let base = spawn_provider().await;
    let gw = MercadoPagoGateway::new();

    let query = gw.query_payment(&config(&base), PAYMENT_ID).await;

    assert!(query.success);
    assert_eq!(query.status, PaymentStatus::Success);
    assert_eq!(query.amount_minor, Some(1_250_00));
    assert_eq!(query.external_reference.as_deref(), Some(ORDER_NUMBER));
}

#[tokio::test]
async fn query_with_non_payment_id_fails_cleanly() {
    let base = spawn_provider().await;
    let gw = MercadoPagoGateway::new();

    let query = gw.query_payment(&config(&base), "pref-abc123").await;

    assert!(!query.success);
    assert!(query.detail.unwrap().contains("404"));
}
