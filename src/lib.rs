pub mod config;
pub mod domain {
    pub mod delivery;
    pub mod order;
    pub mod payment;
}
pub mod error;
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod checkout;
        pub mod delivery;
        pub mod webhooks;
    }
    pub mod middleware {
        pub mod identity;
    }
}
pub mod repo {
    pub mod orders_repo;
    pub mod payments_repo;
    pub mod status_history_repo;
}
pub mod service {
    pub mod checkout_service;
    pub mod delivery_service;
    pub mod notifier;
    pub mod status_sync;
    pub mod webhook_service;
}

#[derive(Clone)]
pub struct AppState {
    pub checkout_service: service::checkout_service::CheckoutService,
    pub delivery_service: service::delivery_service::DeliveryService,
    pub webhook_service: service::webhook_service::WebhookService,
}
