use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

pub const COLOR_AVAILABLE: u32 = 0x00ff00;
pub const COLOR_ERROR: u32 = 0xff0000;
pub const COLOR_INFO: u32 = 0x0099ff;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub url: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn field(&self, name: &str) -> Option<&EmbedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl NotificationResult {
    pub fn delivered() -> Self {
        Self {
            success: true,
            message_id: None,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Trait for implementing notification methods (Discord, ...)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Delivery problems are reported through `NotificationResult`;
    /// `Err` is reserved for failures to build the request.
    async fn notify(&self, notification: &Notification) -> Result<NotificationResult>;

    async fn test_connection(&self) -> Result<bool>;
}
