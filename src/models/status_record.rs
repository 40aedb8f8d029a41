use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ListingStatus;

/// One observation of the monitored listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusRecord {
    pub name: String,
    pub status: ListingStatus,
    pub price: String,
    pub url: String,
    pub observed_at: DateTime<Utc>,
    pub purchasable: bool,
}

#[derive(Debug, Clone)]
pub struct NewStatusRecord {
    pub name: String,
    pub status: ListingStatus,
    pub price: String,
    pub url: String,
}

impl StatusRecord {
    pub fn new(new_record: NewStatusRecord) -> Self {
        Self {
            name: new_record.name,
            purchasable: new_record.status == ListingStatus::Available,
            status: new_record.status,
            price: new_record.price,
            url: new_record.url,
            observed_at: Utc::now(),
        }
    }

    /// Compares everything except the observation time.
    pub fn same_observation(&self, other: &StatusRecord) -> bool {
        self.name == other.name
            && self.status == other.status
            && self.price == other.price
            && self.url == other.url
            && self.purchasable == other.purchasable
    }
}
