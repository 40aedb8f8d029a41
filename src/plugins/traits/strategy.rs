use serde::{Deserialize, Serialize};

use crate::models::ListingStatus;

/// A strategy's verdict for the monitored listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub status: ListingStatus,
    /// First currency amount found in the classified scope.
    pub price: Option<String>,
    /// The text the verdict was based on, kept for logging.
    pub scope: String,
}

/// Trait for implementing listing classifiers.
///
/// Strategies are tried in order by the extractor; `None` means "no
/// opinion" and hands the page to the next strategy.
pub trait ClassifierStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn classify(&self, rendered: &str, target_name: &str) -> Option<Classification>;
}
