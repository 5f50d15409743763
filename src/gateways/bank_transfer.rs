use crate::gateways::{
    ConnectionCheck, GatewayConfig, PaymentGateway, PaymentInit, PaymentQuery, PaymentRequestData,
    TransferInstructions, WebhookOutcome,
};

/// Offline provider: emits transfer instructions instead of a checkout url.
/// Settlement is confirmed manually by staff, so there is no query API and
/// no webhook callback.
pub struct BankTransferGateway;

fn account_fields(config: &GatewayConfig) -> Option<(String, String, String)> {
    match (&config.bank_account, &config.cbu, &config.alias) {
        (Some(account), Some(cbu), Some(alias)) => {
            Some((account.clone(), cbu.clone(), alias.clone()))
        }
        _ => None,
    }
}

#[async_trait::async_trait]
impl PaymentGateway for BankTransferGateway {
    fn name(&self) -> &'static str {
        "bank_transfer"
    }

    async fn test_connection(&self, config: &GatewayConfig) -> ConnectionCheck {
        match account_fields(config) {
            Some(_) => ConnectionCheck {
                success: true,
                message: "bank account configured".to_string(),
            },
            None => ConnectionCheck {
                success: false,
                message: "bank account, cbu and alias must all be configured".to_string(),
            },
        }
    }

    async fn create_payment(
        &self,
        config: &GatewayConfig,
        data: &PaymentRequestData,
    ) -> PaymentInit {
        let Some((bank_account, cbu, alias)) = account_fields(config) else {
            return PaymentInit::failed(
                &data.order_number,
                "bank account, cbu and alias must all be configured",
            );
        };

        let instructions = TransferInstructions {
            bank_account,
            cbu,
            alias,
            holder: config.holder.clone(),
            amount_minor: data.amount_minor,
            reference: data.order_number.clone(),
        };

        PaymentInit {
            success: true,
            checkout_url: None,
            external_id: None,
            external_reference: data.order_number.clone(),
            instructions: Some(instructions),
            error_message: None,
            raw: serde_json::Value::Null,
        }
    }

    async fn query_payment(&self, _config: &GatewayConfig, _external_id: &str) -> PaymentQuery {
        PaymentQuery::pending("bank transfers are confirmed manually by staff")
    }

    async fn process_webhook(
        &self,
        _config: &GatewayConfig,
        _payload: &serde_json::Value,
    ) -> WebhookOutcome {
        WebhookOutcome::ignored("bank transfer provider has no webhook callbacks")
    }
}
