//! Per-paper extraction strategies
//!
//! Different venues caption tables differently ("TABLE 3." vs "Table 3:"),
//! and some papers need a bespoke caption pattern. Strategies encapsulate
//! that variation behind a trait; a registry picks the first strategy that
//! recognizes the document and otherwise falls back to a generic one.

use once_cell::sync::Lazy;
use regex::Regex;

static GENERIC_CAPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^TABLE\s+\d+").unwrap_or_else(|e| panic!("invalid caption regex: {e}"))
});

/// Shared default caption pattern, anchored to the span start.
pub fn default_caption_pattern() -> &'static Regex {
    &GENERIC_CAPTION
}

/// One recognizable family of papers and the caption pattern that fits it.
pub trait ExtractionStrategy {
    /// Short name used in logs
    fn name(&self) -> &str;
    /// Whether this strategy applies, judged from the first page's text.
    fn recognizes(&self, first_page_text: &str) -> bool;
    /// Pattern a caption span must start with.
    fn caption_pattern(&self) -> &Regex;
}

/// Fallback strategy: numbered "TABLE n" captions, case-insensitive.
pub struct GenericStrategy;

impl ExtractionStrategy for GenericStrategy {
    fn name(&self) -> &str {
        "generic"
    }

    fn recognizes(&self, _first_page_text: &str) -> bool {
        true
    }

    fn caption_pattern(&self) -> &Regex {
        default_caption_pattern()
    }
}

/// Registry of strategies, checked in registration order with the generic
/// strategy as the final fallback.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    fallback: GenericStrategy,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
            fallback: GenericStrategy,
        }
    }

    pub fn register(&mut self, strategy: Box<dyn ExtractionStrategy>) {
        self.strategies.push(strategy);
    }

    /// Pick the first strategy recognizing the document. Never fails; the
    /// generic strategy recognizes everything.
    pub fn select(&self, first_page_text: &str) -> &dyn ExtractionStrategy {
        self.strategies
            .iter()
            .map(|s| s.as_ref())
            .find(|s| s.recognizes(first_page_text))
            .unwrap_or(&self.fallback)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AblationStudyStrategy {
        pattern: Regex,
    }

    impl AblationStudyStrategy {
        fn new() -> Self {
            Self {
                pattern: Regex::new(r"(?i)^Tab\.\s+\d+").unwrap(),
            }
        }
    }

    impl ExtractionStrategy for AblationStudyStrategy {
        fn name(&self) -> &str {
            "ablation-study"
        }
        fn recognizes(&self, first_page_text: &str) -> bool {
            first_page_text.contains("Ablation Study Conference")
        }
        fn caption_pattern(&self) -> &Regex {
            &self.pattern
        }
    }

    #[test]
    fn test_empty_registry_falls_back_to_generic() {
        let registry = StrategyRegistry::new();
        let strategy = registry.select("Any paper at all");
        assert_eq!(strategy.name(), "generic");
        assert!(strategy.caption_pattern().is_match("TABLE 3. Results"));
        assert!(strategy.caption_pattern().is_match("Table 12"));
        assert!(!strategy.caption_pattern().is_match("see Table 3"));
    }

    #[test]
    fn test_recognized_strategy_wins() {
        let mut registry = StrategyRegistry::new();
        registry.register(Box::new(AblationStudyStrategy::new()));

        let matched = registry.select("Proceedings of the Ablation Study Conference 2024");
        assert_eq!(matched.name(), "ablation-study");
        assert!(matched.caption_pattern().is_match("Tab. 4 Results"));

        let unmatched = registry.select("Some unrelated preprint");
        assert_eq!(unmatched.name(), "generic");
    }
}
