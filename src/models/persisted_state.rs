use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ListingStatus, StatusRecord};

/// Everything the monitor remembers between runs.
///
/// `last_record == None` means no check has ever succeeded (first run).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PersistedState {
    #[serde(default)]
    pub last_record: Option<StatusRecord>,
    #[serde(default)]
    pub error_count: u32,
    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_error: Option<DateTime<Utc>>,
}

impl PersistedState {
    pub fn is_first_run(&self) -> bool {
        self.last_record.is_none()
    }

    /// Last known status, `Unknown` before the first successful check.
    pub fn status(&self) -> ListingStatus {
        self.last_record
            .as_ref()
            .map(|record| record.status)
            .unwrap_or(ListingStatus::Unknown)
    }
}
