use crate::config::DiscordConfig;
use crate::plugins::traits::notifier::COLOR_INFO;
use crate::plugins::traits::{EmbedField, Notification, NotificationResult, NotifierPlugin};
use crate::Result;
use async_trait::async_trait;
use chrono::{Local, Utc};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct DiscordNotifier {
    client: Client,
    config: DiscordConfig,
}

impl DiscordNotifier {
    pub fn new(config: DiscordConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    fn create_embed(&self, notification: &Notification) -> serde_json::Value {
        let mut embed = json!({
            "title": notification.title,
            "description": notification.description,
            "color": notification.color,
            "footer": { "text": self.config.footer_text },
        });

        if let Some(url) = &notification.url {
            embed["url"] = json!(url);
        }

        if let Some(timestamp) = &notification.timestamp {
            embed["timestamp"] = json!(timestamp.to_rfc3339());
        }

        if !notification.fields.is_empty() {
            embed["fields"] = json!(notification.fields);
        }

        embed
    }

    fn create_webhook_payload(&self, notification: &Notification) -> serde_json::Value {
        let mut payload = json!({
            "embeds": [self.create_embed(notification)],
            "username": self.config.username,
        });

        if let Some(avatar_url) = &self.config.avatar_url {
            payload["avatar_url"] = json!(avatar_url);
        }

        payload
    }

    pub fn test_notification() -> Notification {
        Notification {
            title: "🧪 Test Notification".to_string(),
            description: "Parking monitor is set up and working!".to_string(),
            color: COLOR_INFO,
            fields: vec![
                EmbedField::new("Status", "✅ Connected", true),
                EmbedField::new(
                    "Time",
                    Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                    true,
                ),
            ],
            url: None,
            timestamp: Some(Utc::now()),
        }
    }
}

#[async_trait]
impl NotifierPlugin for DiscordNotifier {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn notify(&self, notification: &Notification) -> Result<NotificationResult> {
        let Some(webhook_url) = &self.config.webhook_url else {
            warn!("No Discord webhook URL configured, skipping notification");
            return Ok(NotificationResult::failed("webhook URL not configured"));
        };

        let payload = self.create_webhook_payload(notification);

        let response = match self.client.post(webhook_url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Error sending Discord notification");
                return Ok(NotificationResult::failed(e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            info!(title = %notification.title, "Discord notification sent");
            return Ok(NotificationResult::delivered());
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "Discord rejected notification");
        Ok(NotificationResult::failed(format!("webhook returned {}", status)))
    }

    async fn test_connection(&self) -> Result<bool> {
        let result = self.notify(&Self::test_notification()).await?;
        Ok(result.success)
    }
}
