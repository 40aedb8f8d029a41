//! Page inspection for when the reservation page changes layout.

use std::fmt::Write as _;

use crate::extractor::StatusExtractor;
use crate::models::StatusRecord;
use crate::plugins::traits::Classification;

/// Longest scope excerpt shown per strategy.
const SCOPE_PREVIEW: usize = 160;

#[derive(Debug, Clone)]
pub struct StrategyVerdict {
    pub strategy: String,
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone)]
pub struct PageInspection {
    pub url: String,
    pub listing_name: String,
    pub page_bytes: usize,
    pub name_present: bool,
    pub sold_out_present: bool,
    pub verdicts: Vec<StrategyVerdict>,
    /// What a regular check would record.
    pub record: Option<StatusRecord>,
}

impl PageInspection {
    pub fn new(extractor: &StatusExtractor, url: &str, rendered: &str, listing_name: &str) -> Self {
        let verdicts = extractor
            .classify_each(rendered, listing_name)
            .into_iter()
            .map(|(strategy, classification)| StrategyVerdict {
                strategy: strategy.to_string(),
                classification,
            })
            .collect();

        Self {
            url: url.to_string(),
            listing_name: listing_name.to_string(),
            page_bytes: rendered.len(),
            name_present: rendered.contains(listing_name.trim()),
            sold_out_present: rendered.to_lowercase().contains("sold out"),
            verdicts,
            record: extractor.extract(rendered, listing_name),
        }
    }

    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "URL:     {}", self.url);
        let _ = writeln!(out, "Page:    {} bytes", self.page_bytes);
        let _ = writeln!(
            out,
            "{} '{}' {} in page",
            mark(self.name_present),
            self.listing_name,
            if self.name_present { "found" } else { "NOT found" }
        );
        let _ = writeln!(
            out,
            "{} 'sold out' {} in page",
            mark(self.sold_out_present),
            if self.sold_out_present { "found" } else { "NOT found" }
        );

        let _ = writeln!(out, "\n=== STRATEGIES ===");
        for verdict in &self.verdicts {
            match &verdict.classification {
                Some(classification) => {
                    let _ = writeln!(
                        out,
                        "{:<11} {} (price: {})",
                        verdict.strategy,
                        classification.status,
                        classification.price.as_deref().unwrap_or("none")
                    );
                    let scope: String = classification.scope.chars().take(SCOPE_PREVIEW).collect();
                    let _ = writeln!(out, "            scope: {}", scope.replace('\n', " "));
                }
                None => {
                    let _ = writeln!(out, "{:<11} no opinion", verdict.strategy);
                }
            }
        }

        let _ = writeln!(out, "\n=== RESULT ===");
        match &self.record {
            Some(record) => {
                let _ = writeln!(out, "{} at {}", record.status, record.price);
            }
            None => {
                let _ = writeln!(out, "listing not found, a check would count an error");
            }
        }
        out
    }
}

fn mark(found: bool) -> &'static str {
    if found { "✅" } else { "❌" }
}
