use crate::components::events::EventRecord;
use crate::config::Config;
use crate::error::{notification_error, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use url::Url;

/// Outcome of one dispatch attempt, reported to observers
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub event_id: String,
    pub title: String,
    /// Ok on delivery, Err with the failure reason otherwise
    pub outcome: Result<(), String>,
}

/// Outbound reminder channel
///
/// Implementations send exactly one message per call; callers never retry a
/// failed send automatically.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, event: &EventRecord) -> AppResult<()>;
}

/// Notifier that posts reminder emails to a transactional email HTTP API
pub struct EmailNotifier {
    client: Client,
    endpoint: Url,
    api_key: String,
    from: String,
    to: String,
}

impl EmailNotifier {
    /// Build from configuration
    ///
    /// Returns None when the email settings are incomplete, in which case
    /// reminders stay disabled.
    pub fn from_config(config: &Config) -> AppResult<Option<Self>> {
        if !config.email_configured() {
            return Ok(None);
        }

        let (Some(api_url), Some(api_key), Some(from), Some(to)) = (
            config.email_api_url.clone(),
            config.email_api_key.clone(),
            config.email_from.clone(),
            config.email_to.clone(),
        ) else {
            return Ok(None);
        };

        let endpoint = Url::parse(&api_url)
            .map_err(|e| notification_error(&format!("Invalid EMAIL_API_URL: {}", e)))?;

        Ok(Some(Self {
            client: Client::new(),
            endpoint,
            api_key,
            from,
            to,
        }))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, event: &EventRecord) -> AppResult<()> {
        let subject = format!("Reminder: {}", event.title);
        let mut text = format!("\"{}\" is today ({}).", event.title, event.date);
        if !event.description.is_empty() {
            text.push_str("\n\n");
            text.push_str(&event.description);
        }

        let payload = json!({
            "from": self.from,
            "to": self.to,
            "subject": subject,
            "text": text,
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| notification_error(&format!("Failed to reach email API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(notification_error(&format!(
                "Email API rejected the request: HTTP {} - {}",
                status, error_text
            )));
        }

        Ok(())
    }
}
