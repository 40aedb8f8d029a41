// Listing classifiers, tried in the order listed here
pub mod structural;
pub mod pattern;
pub mod proximity;

pub use structural::StructuralStrategy;
pub use pattern::PatternStrategy;
pub use proximity::ProximityStrategy;
