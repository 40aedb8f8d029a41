//! One monitoring pass: render the reservation page, extract the listing,
//! compare it with the stored state and notify when it leaves `sold_out`.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::check_logger::CheckLogger;
use crate::config::AppConfig;
use crate::detector::{Detection, TransitionDetector, TransitionReason};
use crate::extractor::StatusExtractor;
use crate::models::{ListingStatus, StatusRecord};
use crate::plugins::traits::notifier::{COLOR_AVAILABLE, COLOR_ERROR};
use crate::plugins::traits::{EmbedField, Notification, NotifierPlugin};
use crate::scraper::PageRenderer;
use crate::state_store::StateStore;
use crate::Result;

/// Longest error detail carried into a degraded notification.
const MAX_ERROR_DETAIL: usize = 500;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum CheckFailure {
    /// The renderer failed or timed out.
    RenderFailure,
    /// The page rendered but the listing name was not on it.
    ListingNotFound,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum CheckOutcome {
    Checked {
        record: StatusRecord,
        detection: Detection,
        notification_sent: bool,
    },
    Failed {
        kind: CheckFailure,
        error_count: u32,
        escalated: bool,
    },
}

pub struct ParkingMonitor {
    renderer: Arc<dyn PageRenderer>,
    notifier: Arc<dyn NotifierPlugin>,
    extractor: StatusExtractor,
    detector: TransitionDetector,
    store: StateStore,
    history: CheckLogger,
    url: String,
    listing_name: String,
}

impl ParkingMonitor {
    pub fn new(
        config: &AppConfig,
        renderer: Arc<dyn PageRenderer>,
        notifier: Arc<dyn NotifierPlugin>,
    ) -> Self {
        Self {
            renderer,
            notifier,
            extractor: StatusExtractor::from_config(&config.monitor),
            detector: TransitionDetector::new(config.monitor.error_threshold),
            store: StateStore::new(config.storage.state_path()),
            history: CheckLogger::from_config(&config.storage),
            url: config.monitor.url.clone(),
            listing_name: config.monitor.listing_name.clone(),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn history(&self) -> &CheckLogger {
        &self.history
    }

    /// Runs a single check.
    ///
    /// Render and extraction problems end in [`CheckOutcome::Failed`] and
    /// notifier problems are only logged. `Err` means the state or history
    /// files could not be read or written.
    pub async fn run_check(&self) -> Result<CheckOutcome> {
        info!(url = %self.url, listing = %self.listing_name, "Starting parking monitor check");

        let rendered = match self.renderer.render(&self.url).await {
            Ok(rendered) => rendered,
            Err(e) => {
                error!(error = %e, "Failed to render reservation page");
                return self.handle_failure(CheckFailure::RenderFailure, e.to_string()).await;
            }
        };

        let Some(record) = self.extractor.extract(&rendered, &self.listing_name) else {
            error!(listing = %self.listing_name, "Listing not found on page");
            let detail = format!("Listing '{}' not found on page", self.listing_name);
            return self.handle_failure(CheckFailure::ListingNotFound, detail).await;
        };

        self.store.reset_error()?;
        let previous = self.store.load()?;
        let detection = self.detector.detect(&previous, &record);

        match detection.reason {
            TransitionReason::FirstRun => info!("First run, initializing state"),
            TransitionReason::BecameAvailable { .. } => info!("🎉 Parking is now available!"),
            _ => info!(reason = %detection.reason, status = %record.status, "No notification needed"),
        }

        self.store.save_record(record.clone())?;

        let notification_sent = if detection.should_notify {
            self.send(&availability_notification(&record, previous.status())).await
        } else {
            false
        };

        self.history.log_check(record.status, &record.price, notification_sent)?;

        Ok(CheckOutcome::Checked {
            record,
            detection,
            notification_sent,
        })
    }

    async fn handle_failure(&self, kind: CheckFailure, detail: String) -> Result<CheckOutcome> {
        let error_count = self.store.increment_error()?;
        warn!(?kind, error_count, "Check failed");

        let escalated = self.detector.should_escalate(error_count);
        if escalated {
            let notification = degraded_notification(error_count, &self.listing_name, &detail);
            self.send(&notification).await;
        }

        Ok(CheckOutcome::Failed {
            kind,
            error_count,
            escalated,
        })
    }

    /// Delivery failures never reach the caller.
    async fn send(&self, notification: &Notification) -> bool {
        match self.notifier.notify(notification).await {
            Ok(result) if result.success => {
                info!(notifier = self.notifier.name(), title = %notification.title, "Notification sent");
                true
            }
            Ok(result) => {
                warn!(
                    notifier = self.notifier.name(),
                    error = result.error.as_deref().unwrap_or("unknown"),
                    "Notification not delivered"
                );
                false
            }
            Err(e) => {
                error!(notifier = self.notifier.name(), error = %e, "Notification failed");
                false
            }
        }
    }
}

fn status_label(status: ListingStatus) -> &'static str {
    match status {
        ListingStatus::Available => "✅ AVAILABLE",
        ListingStatus::SoldOut => "❌ Sold Out",
        ListingStatus::Unknown => "❔ Unknown",
    }
}

pub fn availability_notification(record: &StatusRecord, previous: ListingStatus) -> Notification {
    Notification {
        title: "🚗 PARKING AVAILABLE!".to_string(),
        description: record.name.clone(),
        color: COLOR_AVAILABLE,
        fields: vec![
            EmbedField::new("Price", record.price.clone(), true),
            EmbedField::new("Status", status_label(record.status), true),
            EmbedField::new("Previous Status", status_label(previous), true),
        ],
        url: Some(record.url.clone()),
        timestamp: Some(record.observed_at),
    }
}

pub fn degraded_notification(error_count: u32, target: &str, last_error: &str) -> Notification {
    let last_error: String = last_error.chars().take(MAX_ERROR_DETAIL).collect();

    Notification {
        title: "⚠️ Monitoring Error".to_string(),
        description: "Failed to check parking status".to_string(),
        color: COLOR_ERROR,
        fields: vec![
            EmbedField::new("Error Count", error_count.to_string(), true),
            EmbedField::new("Target", target, false),
            EmbedField::new("Last Error", last_error, false),
        ],
        url: None,
        timestamp: Some(Utc::now()),
    }
}
