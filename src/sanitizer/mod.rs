pub mod catalogue;


pub use catalogue::{RuleCatalogue, RuleCategory, RuleSpec, SanitizationRule};

use crate::error::Result;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static BLANK_LINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("blank line pattern is valid"));
static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {3,}").expect("space run pattern is valid"));
static CONTROL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("control char pattern is valid")
});

/// Strips recurring boilerplate from extracted page text
///
/// Each pass runs every category of the catalogue in [`RuleCategory::ORDER`]
/// and then normalizes whitespace. Passes repeat until one changes nothing,
/// so `sanitize` is idempotent: its output is always a fixed point.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    catalogue: RuleCatalogue,
}

impl Sanitizer {
    pub fn new(catalogue: RuleCatalogue) -> Self {
        Self { catalogue }
    }

    /// Sanitizer over the built-in catalogue
    pub fn with_builtin_rules() -> Result<Self> {
        Ok(Self::new(RuleCatalogue::builtin()?))
    }

    pub fn catalogue(&self) -> &RuleCatalogue {
        &self.catalogue
    }

    /// Remove boilerplate from `text`. Never fails; empty input yields empty output.
    pub fn sanitize(&self, text: &str) -> String {
        let mut current = text.to_string();
        let mut passes = 0;

        // Every pass that changes the text makes it strictly shorter
        loop {
            passes += 1;
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }

        ::log::debug!(
            "Sanitized {} -> {} bytes in {} passes",
            text.len(),
            current.len(),
            passes
        );
        current
    }

    /// One application of all four category passes followed by normalization
    pub fn pass(&self, text: &str) -> String {
        let mut current = text.to_string();
        for category in RuleCategory::ORDER {
            let before = current.len();
            current = self.apply_category(&current, category);
            ::log::trace!(
                "{} pass removed {} bytes",
                category,
                before - current.len()
            );
        }
        normalize(&current)
    }

    /// Categories with at least one rule that would change `text`, in pass order
    pub fn matched_categories(&self, text: &str) -> Vec<RuleCategory> {
        RuleCategory::ORDER
            .into_iter()
            .filter(|category| self.apply_category(text, *category) != text)
            .collect()
    }

    /// Apply every rule of one category, in catalogue order, to the evolving text
    pub fn apply_category(&self, text: &str, category: RuleCategory) -> String {
        let mut current = text.to_string();
        for rule in self.catalogue.rules_in(category) {
            if let Cow::Owned(updated) = rule.apply(&current) {
                current = updated;
            }
        }
        current
    }
}

/// Generic cleanup: blank line runs, long space runs, control characters, outer whitespace
pub fn normalize(text: &str) -> String {
    let text = BLANK_LINE_RUNS.replace_all(text, "\n\n");
    let text = SPACE_RUNS.replace_all(&text, " ");
    let text = CONTROL_CHARS.replace_all(&text, "");
    text.trim().to_string()
}
