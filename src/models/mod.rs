use serde::{Deserialize, Serialize};
use std::fmt;

pub mod status_record;
pub mod persisted_state;
pub mod check_log;

// Re-exports for convenience
pub use status_record::*;
pub use persisted_state::*;
pub use check_log::*;

// Common enums used across models
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Available,
    SoldOut,
    Unknown,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::SoldOut => "sold_out",
            ListingStatus::Unknown => "unknown",
        }
    }

    pub fn is_sold_out(&self) -> bool {
        matches!(self, ListingStatus::SoldOut)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the proximity fallback reports when nothing near the listing
/// can be classified.
///
/// `SoldOut` is the default: availability notifications only fire when the
/// status leaves `sold_out`, so an ambiguous page must never read as
/// available.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    #[default]
    SoldOut,
    Unknown,
}

impl AmbiguityPolicy {
    pub fn fallback_status(&self) -> ListingStatus {
        match self {
            AmbiguityPolicy::SoldOut => ListingStatus::SoldOut,
            AmbiguityPolicy::Unknown => ListingStatus::Unknown,
        }
    }
}
