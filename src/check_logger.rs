use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::models::{CheckLogEntry, ListingStatus};
use crate::utils::fs::{append_line, load_json, save_json_atomic};
use crate::Result;

/// Bounded history of checks: a JSON array capped at `cap` entries plus an
/// append-only text mirror for people tailing the file.
pub struct CheckLogger {
    json_path: PathBuf,
    text_path: PathBuf,
    cap: usize,
}

impl CheckLogger {
    pub fn new(json_path: impl Into<PathBuf>, text_path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            json_path: json_path.into(),
            text_path: text_path.into(),
            cap,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.history_path(), config.history_text_path(), config.history_cap)
    }

    pub fn log_check(
        &self,
        status: ListingStatus,
        price: &str,
        notification_sent: bool,
    ) -> Result<CheckLogEntry> {
        let entry = CheckLogEntry::new(status, price, notification_sent);

        let mut entries = self.entries()?;
        entries.push(entry.clone());
        if entries.len() > self.cap {
            let overflow = entries.len() - self.cap;
            entries.drain(..overflow);
        }
        save_json_atomic(&self.json_path, &entries)?;

        info!(status = %entry.status, price = %entry.price, notification_sent, "Check logged");

        self.write_text_log(&entry)?;
        Ok(entry)
    }

    /// The last `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<CheckLogEntry>> {
        let entries = self.entries()?;
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.into_iter().skip(skip).collect())
    }

    /// When the listing was last seen in a definite non-sold-out state.
    pub fn last_available_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .entries()?
            .iter()
            .rev()
            .find(|entry| !matches!(entry.status, ListingStatus::SoldOut | ListingStatus::Unknown))
            .map(|entry| entry.timestamp))
    }

    fn entries(&self) -> Result<Vec<CheckLogEntry>> {
        match load_json::<Vec<CheckLogEntry>>(&self.json_path) {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(crate::AppError::Serialization(e)) => {
                warn!(path = %self.json_path.display(), error = %e, "Check history is corrupt, starting a new one");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn write_text_log(&self, entry: &CheckLogEntry) -> Result<()> {
        append_line(&self.text_path, &entry.summary_line())?;

        if !entry.status.is_sold_out() {
            let rule = "=".repeat(50);
            append_line(&self.text_path, &rule)?;
            append_line(
                &self.text_path,
                &format!("🎉 PARKING AVAILABLE at {}!", entry.human_time),
            )?;
            append_line(&self.text_path, &rule)?;
        }
        Ok(())
    }
}
