use serde_json::json;

/// Best-effort emitter for the real-time layer. Delivery of the signal is
/// someone else's problem; failures here never block the primary operation.
#[derive(Clone)]
pub struct Notifier {
    pub client: reqwest::Client,
    pub target_url: Option<String>,
}

impl Notifier {
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            target_url: None,
        }
    }

    pub async fn emit(&self, event_type: &str, payload: serde_json::Value) {
        let Some(url) = &self.target_url else {
            return;
        };

        let result = self
            .client
            .post(url)
            .header("X-Event-Type", event_type)
            .json(&json!({ "type": event_type, "data": payload }))
            .send()
            .await;

        if let Err(e) = result {
            tracing::debug!("notification emit failed for {event_type}: {e}");
        }
    }
}
