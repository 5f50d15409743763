use std::sync::Arc;

use axum::middleware::from_fn;
use axum::routing::{get, post, put};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use storefront_payments::config::AppConfig;
use storefront_payments::gateways::bank_transfer::BankTransferGateway;
use storefront_payments::gateways::card::CardGateway;
use storefront_payments::gateways::mercadopago::MercadoPagoGateway;
use storefront_payments::gateways::{GatewayRegistry, PaymentGateway, PaymentProvider};
use storefront_payments::http::handlers::{checkout, delivery, webhooks};
use storefront_payments::http::middleware::identity::require_identity;
use storefront_payments::repo::orders_repo::OrdersRepo;
use storefront_payments::repo::payments_repo::PaymentsRepo;
use storefront_payments::repo::status_history_repo::StatusHistoryRepo;
use storefront_payments::service::checkout_service::CheckoutService;
use storefront_payments::service::delivery_service::DeliveryService;
use storefront_payments::service::notifier::Notifier;
use storefront_payments::service::webhook_service::WebhookService;
use storefront_payments::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let mut registry = GatewayRegistry::new();
    registry.register(
        PaymentProvider::MercadoPago,
        Arc::new(MercadoPagoGateway::new()),
    );
    registry.register(PaymentProvider::BankTransfer, Arc::new(BankTransferGateway));
    let card = Arc::new(CardGateway);
    registry.register(PaymentProvider::CreditCard, card.clone());
    registry.register(PaymentProvider::DebitCard, card);
    let registry = Arc::new(registry);

    for provider in [PaymentProvider::MercadoPago, PaymentProvider::BankTransfer] {
        if let Ok(adapter) = registry.get(provider) {
            let check = adapter.test_connection(&cfg.gateway_config(provider)).await;
            if check.success {
                tracing::info!("{} configuration ok", provider.as_str());
            } else {
                tracing::warn!("{} not usable: {}", provider.as_str(), check.message);
            }
        }
    }

    let orders_repo = OrdersRepo { pool: pool.clone() };
    let payments_repo = PaymentsRepo { pool: pool.clone() };
    let history_repo = StatusHistoryRepo { pool: pool.clone() };
    let notifier = Notifier {
        client: reqwest::Client::new(),
        target_url: cfg.notify_url.clone(),
    };

    let state = AppState {
        checkout_service: CheckoutService {
            pool: pool.clone(),
            orders_repo: orders_repo.clone(),
            payments_repo: payments_repo.clone(),
            registry: registry.clone(),
            app_config: cfg.clone(),
            notifier: notifier.clone(),
        },
        delivery_service: DeliveryService {
            pool: pool.clone(),
            orders_repo: orders_repo.clone(),
            history_repo,
            notifier: notifier.clone(),
        },
        webhook_service: WebhookService {
            pool,
            payments_repo,
            orders_repo,
            registry,
            app_config: cfg.clone(),
            notifier,
        },
    };

    let authed = Router::new()
        .route("/checkout/create-payment", post(checkout::create_payment))
        .route("/checkout/payment/:payment_id", get(checkout::get_payment))
        .route(
            "/orders/:order_id/delivery-status",
            put(delivery::set_delivery_status),
        )
        .route(
            "/orders/:order_id/confirm-receipt",
            post(delivery::confirm_receipt),
        )
        .route("/orders/:order_id/tracking", get(delivery::tracking))
        .route_layer(from_fn(require_identity));

    let app = Router::new()
        .route("/health", get(checkout::health))
        .route("/payments/webhook", post(webhooks::mercadopago_webhook))
        .route("/webhooks/:provider", post(webhooks::provider_webhook))
        .merge(authed)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
