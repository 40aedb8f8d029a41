use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::warn;

use crate::extractor::{classify_phrases, normalize_whitespace, PRICE_PATTERN};
use crate::plugins::traits::{ClassifierStrategy, Classification};

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("invalid regex: markup tag"));

/// Longest gap allowed between the name and the price, and between the
/// price and the status phrase.
const MAX_GAP: usize = 300;

/// Matches `<name> ... <price> ... <status phrase>` across the page text
/// with markup stripped.
#[derive(Debug, Default)]
pub struct PatternStrategy;

impl PatternStrategy {
    pub fn new() -> Self {
        Self
    }

    fn strip_markup(rendered: &str) -> String {
        normalize_whitespace(&RE_TAG.replace_all(rendered, " "))
    }

    fn listing_regex(target_name: &str) -> Option<Regex> {
        let pattern = format!(
            r"{name}.{{0,{gap}}}?(?P<price>{price}).{{0,{gap}}}?\b(?:sold\s+out|available|add\s+to\s+cart)\b",
            name = regex::escape(&normalize_whitespace(target_name)),
            gap = MAX_GAP,
            price = PRICE_PATTERN,
        );

        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| warn!(error = %e, "Could not build listing pattern"))
            .ok()
    }
}

impl ClassifierStrategy for PatternStrategy {
    fn name(&self) -> &str {
        "pattern"
    }

    fn classify(&self, rendered: &str, target_name: &str) -> Option<Classification> {
        let text = Self::strip_markup(rendered);
        let regex = Self::listing_regex(target_name)?;
        let captures = regex.captures(&text)?;

        let matched = captures.get(0)?.as_str();
        Some(Classification {
            status: classify_phrases(matched)?,
            price: captures.name("price").map(|m| m.as_str().to_string()),
            scope: matched.to_string(),
        })
    }
}
