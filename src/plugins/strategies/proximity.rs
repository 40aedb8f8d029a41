use crate::extractor::{classify_phrases, find_price};
use crate::models::AmbiguityPolicy;
use crate::plugins::traits::{ClassifierStrategy, Classification};

/// Characters inspected after the first occurrence of the listing name.
pub const PROXIMITY_WINDOW: usize = 500;

/// Last resort: looks at the raw text right after the listing name.
///
/// Always returns a verdict. When the window holds no status phrase the
/// configured [`AmbiguityPolicy`] decides.
#[derive(Debug, Default)]
pub struct ProximityStrategy {
    policy: AmbiguityPolicy,
}

impl ProximityStrategy {
    pub fn new(policy: AmbiguityPolicy) -> Self {
        Self { policy }
    }
}

impl ClassifierStrategy for ProximityStrategy {
    fn name(&self) -> &str {
        "proximity"
    }

    fn classify(&self, rendered: &str, target_name: &str) -> Option<Classification> {
        let start = rendered.find(target_name)? + target_name.len();
        let window: String = rendered[start..].chars().take(PROXIMITY_WINDOW).collect();

        Some(Classification {
            status: classify_phrases(&window).unwrap_or_else(|| self.policy.fallback_status()),
            price: find_price(&window),
            scope: window,
        })
    }
}
