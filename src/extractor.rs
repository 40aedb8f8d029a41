//! Recovers a [`StatusRecord`] for one listing from a rendered page.
//!
//! The page layout is not ours, so no single selector is trusted. The
//! extractor runs an ordered list of [`ClassifierStrategy`] implementations,
//! from structure-aware to crude, and keeps the first confident verdict.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::models::{AmbiguityPolicy, ListingStatus, NewStatusRecord, StatusRecord};
use crate::plugins::strategies::{PatternStrategy, ProximityStrategy, StructuralStrategy};
use crate::plugins::traits::{Classification, ClassifierStrategy};

static RE_SOLD_OUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsold\s+out\b").expect("invalid regex: sold out"));
static RE_AVAILABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:available|add\s+to\s+cart)\b").expect("invalid regex: available")
});
static RE_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PRICE_PATTERN).expect("invalid regex: price"));
static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid regex: whitespace"));

/// `$` then digits, with optional thousands separators and decimals.
pub(crate) const PRICE_PATTERN: &str = r"\$\d{1,3}(?:,\d{3})+(?:\.\d+)?|\$\d+(?:\.\d+)?";

/// Status implied by the phrases in `scope`. "sold out" outranks
/// "available"/"add to cart" when both are present.
pub(crate) fn classify_phrases(scope: &str) -> Option<ListingStatus> {
    if RE_SOLD_OUT.is_match(scope) {
        Some(ListingStatus::SoldOut)
    } else if RE_AVAILABLE.is_match(scope) {
        Some(ListingStatus::Available)
    } else {
        None
    }
}

pub(crate) fn find_price(scope: &str) -> Option<String> {
    RE_PRICE.find(scope).map(|m| m.as_str().to_string())
}

pub(crate) fn has_price(scope: &str) -> bool {
    RE_PRICE.is_match(scope)
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

pub struct StatusExtractor {
    strategies: Vec<Box<dyn ClassifierStrategy>>,
    url: String,
    default_price: String,
}

impl StatusExtractor {
    /// Extractor with the standard strategy order: structural, pattern,
    /// proximity.
    pub fn new(url: &str, default_price: &str, policy: AmbiguityPolicy) -> Self {
        Self::with_strategies(
            url,
            default_price,
            vec![
                Box::new(StructuralStrategy::new()),
                Box::new(PatternStrategy::new()),
                Box::new(ProximityStrategy::new(policy)),
            ],
        )
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(&config.url, &config.default_price, config.ambiguous_status)
    }

    pub fn with_strategies(
        url: &str,
        default_price: &str,
        strategies: Vec<Box<dyn ClassifierStrategy>>,
    ) -> Self {
        Self {
            strategies,
            url: url.to_string(),
            default_price: default_price.to_string(),
        }
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Every strategy's verdict in order, without stopping at the first
    /// confident one and without the presence check done by [`extract`].
    ///
    /// [`extract`]: StatusExtractor::extract
    pub fn classify_each(&self, rendered: &str, target_name: &str) -> Vec<(&str, Option<Classification>)> {
        let target_name = target_name.trim();
        self.strategies
            .iter()
            .map(|strategy| (strategy.name(), strategy.classify(rendered, target_name)))
            .collect()
    }

    /// `None` when the listing is not on the page at all. The name is
    /// matched literally against the rendered markup.
    pub fn extract(&self, rendered: &str, target_name: &str) -> Option<StatusRecord> {
        let target_name = target_name.trim();
        if target_name.is_empty() || !rendered.contains(target_name) {
            debug!(target_name, "Listing name not present in rendered page");
            return None;
        }

        for strategy in &self.strategies {
            let Some(classification) = strategy.classify(rendered, target_name) else {
                debug!(strategy = strategy.name(), "Strategy had no opinion");
                continue;
            };

            info!(
                strategy = strategy.name(),
                status = %classification.status,
                scope = %preview(&classification.scope),
                "Listing classified"
            );

            return Some(StatusRecord::new(NewStatusRecord {
                name: target_name.to_string(),
                status: classification.status,
                price: classification
                    .price
                    .unwrap_or_else(|| self.default_price.clone()),
                url: self.url.clone(),
            }));
        }

        // Only reachable with a strategy list lacking a catch-all
        info!(target_name, "No strategy could classify the listing");
        Some(StatusRecord::new(NewStatusRecord {
            name: target_name.to_string(),
            status: ListingStatus::Unknown,
            price: self.default_price.clone(),
            url: self.url.clone(),
        }))
    }
}

fn preview(scope: &str) -> String {
    scope.chars().take(200).collect()
}
