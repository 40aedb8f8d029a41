pub mod traits;
pub mod strategies;
pub mod notifiers;

pub use traits::{ClassifierStrategy, NotifierPlugin};
