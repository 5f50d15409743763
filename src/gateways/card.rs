use crate::gateways::{
    ConnectionCheck, GatewayConfig, PaymentGateway, PaymentInit, PaymentQuery, PaymentRequestData,
    WebhookOutcome,
};

/// Placeholder for a card processor that is not yet integrated. Registered
/// under both the credit and debit provider ids so checkout can reject the
/// method with a clear message instead of a missing-adapter error.
pub struct CardGateway;

const NOT_INTEGRATED: &str = "card processor is not yet integrated";

#[async_trait::async_trait]
impl PaymentGateway for CardGateway {
    fn name(&self) -> &'static str {
        "card"
    }

    async fn test_connection(&self, _config: &GatewayConfig) -> ConnectionCheck {
        ConnectionCheck {
            success: false,
            message: NOT_INTEGRATED.to_string(),
        }
    }

    async fn create_payment(
        &self,
        _config: &GatewayConfig,
        data: &PaymentRequestData,
    ) -> PaymentInit {
        PaymentInit::failed(&data.order_number, NOT_INTEGRATED)
    }

    async fn query_payment(&self, _config: &GatewayConfig, _external_id: &str) -> PaymentQuery {
        PaymentQuery::pending(NOT_INTEGRATED)
    }

    async fn process_webhook(
        &self,
        _config: &GatewayConfig,
        _payload: &serde_json::Value,
    ) -> WebhookOutcome {
        WebhookOutcome::ignored(NOT_INTEGRATED)
    }
}
