use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{ListingStatus, PersistedState, StatusRecord};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransitionReason {
    /// No earlier record; state is only initialized.
    FirstRun,
    /// Left `sold_out`. The only reason that notifies.
    BecameAvailable { from: ListingStatus, to: ListingStatus },
    Unchanged(ListingStatus),
    /// Any other change, e.g. available -> sold_out.
    Changed { from: ListingStatus, to: ListingStatus },
}

impl fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionReason::FirstRun => write!(f, "first run"),
            TransitionReason::BecameAvailable { from, to } => {
                write!(f, "listing left {} (now {})", from, to)
            }
            TransitionReason::Unchanged(status) => write!(f, "still {}", status),
            TransitionReason::Changed { from, to } => write!(f, "changed from {} to {}", from, to),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Detection {
    pub should_notify: bool,
    pub reason: TransitionReason,
}

#[derive(Debug, Clone)]
pub struct TransitionDetector {
    error_threshold: u32,
}

impl TransitionDetector {
    pub fn new(error_threshold: u32) -> Self {
        Self { error_threshold }
    }

    pub fn error_threshold(&self) -> u32 {
        self.error_threshold
    }

    pub fn detect(&self, previous: &PersistedState, current: &StatusRecord) -> Detection {
        let Some(last) = &previous.last_record else {
            return Detection {
                should_notify: false,
                reason: TransitionReason::FirstRun,
            };
        };

        let (from, to) = (last.status, current.status);
        let reason = if from == to {
            TransitionReason::Unchanged(to)
        } else if from == ListingStatus::SoldOut {
            TransitionReason::BecameAvailable { from, to }
        } else {
            TransitionReason::Changed { from, to }
        };

        Detection {
            should_notify: matches!(reason, TransitionReason::BecameAvailable { .. }),
            reason,
        }
    }

    /// True exactly once per failure streak: when the consecutive error
    /// count reaches the threshold.
    pub fn should_escalate(&self, error_count: u32) -> bool {
        error_count == self.error_threshold
    }
}

impl Default for TransitionDetector {
    fn default() -> Self {
        Self::new(3)
    }
}
