pub mod check_logger;
pub mod config;
pub mod detector;
pub mod extractor;
pub mod inspect;
pub mod models;
pub mod monitor;
pub mod plugins;
pub mod scraper;
pub mod state_store;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use monitor::{CheckFailure, CheckOutcome, ParkingMonitor};
pub use utils::error::{AppError, Result};
