use std::sync::Arc;

use storefront_payments::domain::payment::PaymentStatus;
use storefront_payments::error::ServiceError;
use storefront_payments::gateways::bank_transfer::BankTransferGateway;
use storefront_payments::gateways::card::CardGateway;
use storefront_payments::gateways::{
    GatewayConfig, GatewayRegistry, PaymentGateway, PaymentProvider, PaymentRequestData,
};
use uuid::Uuid;

fn bank_config() -> GatewayConfig {
    let mut cfg = GatewayConfig::new(PaymentProvider::BankTransfer, 10_000);
    cfg.bank_account = Some("0012345-6 001-9".to_string());
    cfg.cbu = Some("2850590940090418135201".to_string());
    cfg.alias = Some("tienda.zapatos.mp".to_string());
    cfg.holder = Some("Zapateria SRL".to_string());
    cfg
}

fn request(order_number: &str) -> PaymentRequestData {
    PaymentRequestData {
        order_id: Uuid::new_v4(),
        order_number: order_number.to_string(),
        amount_minor: 1_250_00,
        currency: "ARS".to_string(),
        description: format!("Order {order_number}"),
        customer_email: Some("cliente@example.com".to_string()),
    }
}

#[tokio::test]
async fn bank_transfer_emits_instructions() {
    let gw = BankTransferGateway;
    let cfg = bank_config();

    let init = gw.create_payment(&cfg, &request("ORD-20260827-AB12CD34")).await;

    assert!(init.success);
    assert!(init.checkout_url.is_none());
    assert_eq!(init.external_reference, "ORD-20260827-AB12CD34");

    let instructions = init.instructions.expect("instructions");
    assert_eq!(instructions.cbu, "2850590940090418135201");
    assert_eq!(instructions.alias, "tienda.zapatos.mp");
    assert_eq!(instructions.amount_minor, 1_250_00);
    assert_eq!(instructions.reference, "ORD-20260827-AB12CD34");
}

#[tokio::test]
async fn bank_transfer_without_account_fails_cleanly() {
    let gw = BankTransferGateway;
    let cfg = GatewayConfig::new(PaymentProvider::BankTransfer, 10_000);

    let check = gw.test_connection(&cfg).await;
    assert!(!check.success);

    let init = gw.create_payment(&cfg, &request("ORD-X")).await;
    assert!(!init.success);
    assert!(init.error_message.is_some());
    assert!(init.instructions.is_none());
    assert_eq!(init.external_reference, "ORD-X");
}

#[tokio::test]
async fn bank_transfer_query_is_best_effort_pending() {
    let gw = BankTransferGateway;
    let query = gw.query_payment(&bank_config(), "whatever").await;

    assert!(query.success);
    assert_eq!(query.status, PaymentStatus::Pending);
    assert!(query.detail.is_some());
}

#[tokio::test]
async fn bank_transfer_ignores_webhooks() {
    let gw = BankTransferGateway;
    let outcome = gw
        .process_webhook(&bank_config(), &serde_json::json!({"anything": true}))
        .await;
    assert!(!outcome.success);
}

#[tokio::test]
async fn card_placeholder_never_panics() {
    let gw = CardGateway;
    let cfg = GatewayConfig::new(PaymentProvider::CreditCard, 10_000);

    assert!(!gw.test_connection(&cfg).await.success);

    let init = gw.create_payment(&cfg, &request("ORD-C")).await;
    assert!(!init.success);
    assert!(init.error_message.is_some());
}

#[test]
fn registry_returns_the_registered_instance() {
    let mut registry = GatewayRegistry::new();
    let bank: Arc<dyn PaymentGateway> = Arc::new(BankTransferGateway);
    registry.register(PaymentProvider::BankTransfer, bank.clone());

    let resolved = registry.get(PaymentProvider::BankTransfer).unwrap();
    assert!(Arc::ptr_eq(&resolved, &bank));
    assert!(registry.has(PaymentProvider::BankTransfer));
}

#[test]
fn registry_rejects_unregistered_provider() {
    let registry = GatewayRegistry::new();
    assert!(!registry.has(PaymentProvider::MercadoPago));

    let err = registry
        .get(PaymentProvider::MercadoPago)
        .err()
        .expect("lookup must fail");
    match err {
        ServiceError::Configuration(msg) => assert!(msg.contains("no adapter registered")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn credit_and_debit_share_one_card_adapter() {
    let mut registry = GatewayRegistry::new();
    let card: Arc<dyn PaymentGateway> = Arc::new(CardGateway);
    registry.register(PaymentProvider::CreditCard, card.clone());
    registry.register(PaymentProvider::DebitCard, card);

    let credit = registry.get(PaymentProvider::CreditCard).unwrap();
    let debit = registry.get(PaymentProvider::DebitCard).unwrap();
    assert!(Arc::ptr_eq(&credit, &debit));
}
