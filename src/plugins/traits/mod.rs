pub mod strategy;
pub mod notifier;

pub use strategy::{ClassifierStrategy, Classification};
pub use notifier::{NotifierPlugin, Notification, NotificationResult, EmbedField};
