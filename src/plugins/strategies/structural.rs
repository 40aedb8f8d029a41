use scraper::{ElementRef, Html};

use crate::extractor::{classify_phrases, find_price, has_price, normalize_whitespace};
use crate::plugins::traits::{ClassifierStrategy, Classification};

/// How many ancestors above the innermost match may be searched for a block
/// that also carries a price or status phrase.
const MAX_ANCESTOR_LEVELS: usize = 5;

const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

/// Classifies from the smallest DOM block that holds both the listing name
/// and a price or status phrase.
#[derive(Debug, Default)]
pub struct StructuralStrategy;

impl StructuralStrategy {
    pub fn new() -> Self {
        Self
    }

    fn innermost_containing<'a>(root: ElementRef<'a>, target: &str) -> Option<ElementRef<'a>> {
        if !visible_text(root).contains(target) {
            return None;
        }

        let mut current = root;
        'descend: loop {
            for child in current.children().filter_map(ElementRef::wrap) {
                if is_hidden(child) {
                    continue;
                }
                if visible_text(child).contains(target) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }
}

impl ClassifierStrategy for StructuralStrategy {
    fn name(&self) -> &str {
        "structural"
    }

    fn classify(&self, rendered: &str, target_name: &str) -> Option<Classification> {
        let target = normalize_whitespace(target_name);
        let document = Html::parse_document(rendered);
        let mut block = Self::innermost_containing(document.root_element(), &target)?;

        for _ in 0..=MAX_ANCESTOR_LEVELS {
            let text = visible_text(block);
            if has_price(&text) || classify_phrases(&text).is_some() {
                // A price alone is not enough to call the status
                let status = classify_phrases(&text)?;
                return Some(Classification {
                    status,
                    price: find_price(&text),
                    scope: text,
                });
            }

            block = block.parent().and_then(ElementRef::wrap)?;
        }

        None
    }
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    HIDDEN_ELEMENTS.contains(&element.value().name())
}

/// Whitespace-normalized text of `element`, skipping script and style
/// content.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|ancestor| ancestor.id() != element.id())
            .any(is_hidden);
        if !hidden {
            parts.push(text);
        }
    }
    normalize_whitespace(&parts.join(" "))
}
