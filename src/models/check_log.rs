use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ListingStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckLogEntry {
    pub timestamp: DateTime<Utc>,
    pub status: ListingStatus,
    pub price: String,
    pub notification_sent: bool,
    pub human_time: String,
}

impl CheckLogEntry {
    pub fn new(status: ListingStatus, price: &str, notification_sent: bool) -> Self {
        let timestamp = Utc::now();
        Self {
            human_time: timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            timestamp,
            status,
            price: price.to_string(),
            notification_sent,
        }
    }

    /// `"<time> | <icon> <status> | <price> <notified?>"`
    pub fn summary_line(&self) -> String {
        let icon = if self.status.is_sold_out() { "❌" } else { "✅" };
        let notified = if self.notification_sent { "📨 NOTIFIED" } else { "" };
        format!(
            "{} | {} {} | {} {}",
            self.human_time, icon, self.status, self.price, notified
        )
    }
}
