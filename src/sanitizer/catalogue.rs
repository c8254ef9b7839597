//! Categorized boilerplate-removal rules.
//!
//! A rule is a regex that marks a block of recurring site chrome. Most rules
//! carry their own end phrase; block rules with no stable end phrase instead
//! name a `stop_before` marker (usually the next heading) and delete up to,
//! but not including, that marker. A block whose stop marker never appears
//! is left alone.

use crate::error::{DigestError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Rule categories, applied in the order of [`RuleCategory::ORDER`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Menus, breadcrumbs, prev/next, share buttons
    Navigation,
    /// Report/block dialogs and their option lists
    Moderation,
    /// Product lists, contact forms, copyright, social links
    Footer,
    /// Paywalls, playlists, notification prompts, tracking pixels
    Ui,
}

impl RuleCategory {
    /// Pass order over the text. Later passes see the output of earlier ones.
    pub const ORDER: [RuleCategory; 4] = [
        RuleCategory::Navigation,
        RuleCategory::Moderation,
        RuleCategory::Footer,
        RuleCategory::Ui,
    ];

    /// Moderation dialogs vary in capitalisation between sites
    pub fn default_case_sensitive(self) -> bool {
        !matches!(self, RuleCategory::Moderation)
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleCategory::Navigation => "navigation",
            RuleCategory::Moderation => "moderation",
            RuleCategory::Footer => "footer",
            RuleCategory::Ui => "ui",
        };
        f.write_str(name)
    }
}

/// Declarative, uncompiled form of a rule (built-in table or operator config)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub category: RuleCategory,

    pub pattern: String,

    /// Delete up to (not including) the first match of this after `pattern`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_before: Option<String>,

    /// Defaults to the category's case sensitivity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,

    /// Whether `.` in `pattern` may cross line breaks
    #[serde(default)]
    pub spans_newlines: bool,
}

impl RuleSpec {
    /// A rule that ends at its own end phrase
    pub fn new(category: RuleCategory, pattern: &str) -> Self {
        Self {
            category,
            pattern: pattern.to_string(),
            stop_before: None,
            case_sensitive: None,
            spans_newlines: false,
        }
    }

    /// Let `.` match line breaks
    pub fn spanning(mut self) -> Self {
        self.spans_newlines = true;
        self
    }

    /// Consume forward until just before `stop`
    pub fn until(mut self, stop: &str) -> Self {
        self.stop_before = Some(stop.to_string());
        self.spans_newlines = true;
        self
    }
}

/// A compiled, immutable rule
#[derive(Debug, Clone)]
pub struct SanitizationRule {
    category: RuleCategory,
    case_sensitive: bool,
    spans_newlines: bool,
    pattern: Regex,
    stop_before: Option<Regex>,
}

impl SanitizationRule {
    pub fn compile(spec: &RuleSpec) -> Result<Self> {
        let case_sensitive = spec
            .case_sensitive
            .unwrap_or_else(|| spec.category.default_case_sensitive());
        let pattern = build_regex(&spec.pattern, case_sensitive, spec.spans_newlines)?;
        let stop_before = spec
            .stop_before
            .as_deref()
            .map(|stop| build_regex(stop, case_sensitive, false))
            .transpose()?;

        Ok(Self {
            category: spec.category,
            case_sensitive,
            spans_newlines: spec.spans_newlines,
            pattern,
            stop_before,
        })
    }

    pub fn category(&self) -> RuleCategory {
        self.category
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn spans_newlines(&self) -> bool {
        self.spans_newlines
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Delete every non-overlapping match of this rule from `text`
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.stop_before {
            None => self.pattern.replace_all(text, ""),
            Some(stop) => self.delete_until(stop, text),
        }
    }

    fn delete_until<'t>(&self, stop: &Regex, text: &'t str) -> Cow<'t, str> {
        let mut kept = String::new();
        let mut last = 0;
        let mut search_from = 0;

        while search_from <= text.len() {
            let Some(start) = self.pattern.find_at(text, search_from) else {
                break;
            };
            // No stop marker after this start means none after any later start either
            let Some(end) = stop.find_at(text, start.end()) else {
                break;
            };

            if end.start() > start.start() {
                kept.push_str(&text[last..start.start()]);
                last = end.start();
                search_from = end.start();
            } else {
                search_from = next_char_boundary(text, start.start());
            }
        }

        if last == 0 {
            return Cow::Borrowed(text);
        }
        kept.push_str(&text[last..]);
        Cow::Owned(kept)
    }
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| from + c.len_utf8())
}

fn build_regex(pattern: &str, case_sensitive: bool, spans_newlines: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .dot_matches_new_line(spans_newlines)
        .multi_line(true)
        .build()
        .map_err(|source| DigestError::InvalidRule {
            pattern: pattern.to_string(),
            source,
        })
}

/// Read-only, ordered set of compiled rules
#[derive(Debug, Clone, Default)]
pub struct RuleCatalogue {
    rules: Vec<SanitizationRule>,
}

impl RuleCatalogue {
    /// An empty catalogue
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in catalogue of common site boilerplate
    pub fn builtin() -> Result<Self> {
        Self::from_specs(&builtin_specs())
    }

    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(SanitizationRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Append operator rules; they run after existing rules of the same category
    pub fn with_rules(mut self, specs: &[RuleSpec]) -> Result<Self> {
        for spec in specs {
            self.rules.push(SanitizationRule::compile(spec)?);
        }
        Ok(self)
    }

    /// Rules of one category, in catalogue order
    pub fn rules_in(&self, category: RuleCategory) -> impl Iterator<Item = &SanitizationRule> {
        self.rules.iter().filter(move |rule| rule.category == category)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Stop marker for blocks that run until the next heading
const NEXT_HEADING: &str = r"\n##";
/// Stop marker for blocks that run until the next heading or a bare link line
const NEXT_HEADING_OR_LINK: &str = r"\n##|\n\[";

fn builtin_specs() -> Vec<RuleSpec> {
    use RuleCategory::{Footer, Moderation, Navigation, Ui};

    vec![
        // Site search plus its category menu
        RuleSpec::new(Navigation, r"Search:\s*\*\s*\[[^\]\n]*\]\([^)\n]*\)")
            .until(NEXT_HEADING_OR_LINK),
        // Main menu entries
        RuleSpec::new(
            Navigation,
            r"^[ \t]*\*[ \t]*\[\s*(?:Home|About|Contact|Menu|Login|Log In|Register|Sign Up|Join Now!)\s*\][^\n]*\n",
        ),
        RuleSpec::new(
            Navigation,
            r"^[ \t]*\*[ \t]*\[\s*(?:Tutorial Library Index|Tutorial Library Membership|Focused Flight Paths|Learn DaVinci Resolve|DaVinci Resolve Courses|The All-Access Accelerator|Grading Practice Projects)\s*\][^\n]*\n",
        ),
        // Breadcrumbs
        RuleSpec::new(
            Navigation,
            r"\[[^\]\n]*\]\([^)\n]*\) / \[[^\]\n]*\]\([^)\n]*\) / [^\n]*\n",
        ),
        RuleSpec::new(Navigation, r"^Home > [^\n]*\n"),
        // Between-article navigation
        RuleSpec::new(Navigation, r"## Post navigation").until(NEXT_HEADING_OR_LINK),
        RuleSpec::new(
            Navigation,
            r"\[\s*(?:Prev|Previous)\s*\]\([^)\n]*\)[^\n]*(?:\n[^\n]*?)?\[\s*Next\s*\]\([^)\n]*\)",
        ),
        // Header logo
        RuleSpec::new(
            Navigation,
            r"\[\s*!\[(?:[^\]\n]*(?i:logo)[^\]\n]*|Mixing Light)\]\([^)\n]*\)\s*\]\([^)\n]*\)",
        ),
        // Share buttons
        RuleSpec::new(
            Navigation,
            r"\*\s*\[\]\((?:https://www\.facebook\.com/sharer|https://x\.com/share|https://twitter\.com/share|mailto:)[^)\n]*\)\n",
        ),
        RuleSpec::new(Navigation, r"\*\s*\[\]\([^)\n]*(?:facebook|twitter)[^)\n]*\)\n"),
        // Report dialogs; headed variants first so the header goes with the body
        RuleSpec::new(
            Moderation,
            r"####\s*Report\s+You have already reported this\s*\.",
        ),
        RuleSpec::new(Moderation, r"####\s*Report\b.*?Report note.*?Report").spanning(),
        RuleSpec::new(
            Moderation,
            r"Report\s+There was a problem reporting this post\..*?Report note\s+Report",
        )
        .spanning(),
        RuleSpec::new(Moderation, r"You have already reported this\s*\."),
        // Block dialogs
        RuleSpec::new(Moderation, r"####\s*Block Member\?.*?Confirm").spanning(),
        RuleSpec::new(
            Moderation,
            r"Block Member\?.*?Please allow a few minutes for this process to complete\.\s*Confirm",
        )
        .spanning(),
        RuleSpec::new(
            Moderation,
            r"You will no longer be able to:\s*\*\s*See blocked member.*?\*\s*Mention this member[^\n]*",
        )
        .spanning(),
        // Report reasons
        RuleSpec::new(
            Moderation,
            r"Harassment\s+Harassment or bullying behavior.*?Other",
        )
        .spanning(),
        RuleSpec::new(
            Moderation,
            r"Inappropriate\s+Contains mature or sensitive content",
        ),
        RuleSpec::new(Moderation, r"Offensive\s+Contains abusive or derogatory content"),
        RuleSpec::new(
            Moderation,
            r"Suspicious\s+Contains spam, fake content or potential malware",
        ),
        // Product and contact blocks
        RuleSpec::new(Footer, r"##### Our Products").until(NEXT_HEADING),
        RuleSpec::new(
            Footer,
            r"##### (?:Contact|Stay In Touch).*?This field is for validation purposes[^\n]*",
        )
        .spanning(),
        RuleSpec::new(Footer, r"##### About.*?About [^\n]*\n").spanning(),
        RuleSpec::new(
            Footer,
            r"Mixing Light provides industry leading tutorials.*?Join our community![^\n]*\n",
        )
        .spanning(),
        RuleSpec::new(Footer, r"^[^\n]*Uptime Status[^\n]*\n"),
        // Social and press links
        RuleSpec::new(
            Footer,
            r"\*\s*\[\]\(https://(?:www\.facebook\.com|x\.com|twitter\.com|www\.linkedin\.com)/[^)\n]*\)[^\n]*\n",
        ),
        RuleSpec::new(Footer, r"\*\s*\[\]\(https://[^)\n]*/press/\)[^\n]*\n"),
        // Copyright
        RuleSpec::new(Footer, r"© \d{4}[^\n]*?Terms of Use[^\n]*\n"),
        RuleSpec::new(Footer, r"^Copyright (?:© ?)?\d{4}[^\n]*\n"),
        // Phone and street address
        RuleSpec::new(Footer, r"\*\s*\[\s*\(\d{3}\)\s*\d{3}-\d{4}\][^\n]*\n"),
        RuleSpec::new(Footer, r"\*\s*\[\s*\+\d[^\]\n]*\][^\n]*\n"),
        RuleSpec::new(
            Footer,
            r"\*\s*\[\s*\d+\s+[^\]\n]*(?:Street|Avenue|Road|Drive|Lane|Penny Farms)[^\]\n]*\][^\n]*\n",
        ),
        // Form furniture
        RuleSpec::new(Footer, r#""?\*"?\s*indicates required fields[^\n]*\n"#),
        RuleSpec::new(
            Footer,
            r"Email\*.*?First Name\*.*?Phone.*?This field is for validation[^\n]*\n",
        )
        .spanning(),
        // Member paywalls
        RuleSpec::new(
            Ui,
            r"### Member Content.*?Need more information about our memberships[^\n]*",
        )
        .spanning(),
        RuleSpec::new(
            Ui,
            r"Sorry\.\.\. the rest of this content is for members only\..*?Membership options[^\n]*\n",
        )
        .spanning(),
        RuleSpec::new(Ui, r"##### Member Login.*?Remember me[^\n]*\n").spanning(),
        RuleSpec::new(Ui, r"## Membership Required.*?Join Today.*?Close[^\n]*\n").spanning(),
        RuleSpec::new(Ui, r"\*\*Bonus\*\*\s*:.*?Join Today[^\n]*\n").spanning(),
        RuleSpec::new(
            Ui,
            r"Did you know\?.*?## Maintaining.*?Check out our membership options[^\n]*\n",
        )
        .spanning(),
        // Playlists
        RuleSpec::new(Ui, r"×\s*## Add to Playlist.*?Add to New Playlist[^\n]*\n").spanning(),
        RuleSpec::new(
            Ui,
            r"##### Adding to Playlist\.\.\..*?Add to New Playlist[^\n]*\n",
        )
        .spanning(),
        // Push notification prompts
        RuleSpec::new(
            Ui,
            r"Notifications.{0,200}?Subscribe to push notifications.{0,500}?Yes, please\.No Thanks",
        )
        .spanning(),
        RuleSpec::new(Ui, r"!\[notification icon\].*?Yes, please\.No Thanks").spanning(),
        // Tracking pixels and loaders
        RuleSpec::new(
            Ui,
            r"!\[\]\(https://(?:cdn\.usefathom\.com|app\.monstercampaigns\.com)[^)\n]*\)",
        ),
        RuleSpec::new(Ui, r"!\[\]\(https://[^)\n]*(?:analytics|tracking)[^)\n]*\)"),
        RuleSpec::new(Ui, r"!\[\]\(data:image/svg\+xml[^)\n]*\)\s*Loading\.\.\."),
        // Article metadata rows
        RuleSpec::new(Ui, r"Insight #\s*ML\s*\d+[^\n]*\n"),
        RuleSpec::new(Ui, r"^Type\s+(?:Article|Video)[^\n]*\n"),
        RuleSpec::new(Ui, r"^Duration\s+\d+:\d+[^\n]*\n"),
        RuleSpec::new(
            Ui,
            r"^Skill Level\s+(?:Beginner|Intermediate|Advanced)[^\n]*\n",
        ),
        RuleSpec::new(Ui, r"^Series\s*\|\s*\*\s*\[[^\]\n]*\][^\n]*\n"),
        RuleSpec::new(Ui, r"^(?:Categories|Skills)\s*\[[^\]\n]*\][^\n]*\n"),
        RuleSpec::new(Ui, r"Other [^\n]*in this Series.*?View All[^\n]*\n").spanning(),
        RuleSpec::new(
            Ui,
            r"Username\s*\|\s*---\s*\|\s*---.*?Password.*?\|[^\n]*\n",
        )
        .spanning(),
        // Cookie banners
        RuleSpec::new(Ui, r"This website uses cookies[^\n]*?Accept[^\n]*\n"),
        RuleSpec::new(Ui, r"We use cookies").until(r"\n\n|\n#"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogue_compiles() {
        let catalogue = RuleCatalogue::builtin().unwrap();
        assert!(!catalogue.is_empty());
        for category in RuleCategory::ORDER {
            assert!(
                catalogue.rules_in(category).count() > 0,
                "no built-in rules for {category}"
            );
        }
    }

    #[test]
    fn test_category_order() {
        assert_eq!(
            RuleCategory::ORDER,
            [
                RuleCategory::Navigation,
                RuleCategory::Moderation,
                RuleCategory::Footer,
                RuleCategory::Ui
            ]
        );
    }

    #[test]
    fn test_case_sensitivity_defaults() {
        let catalogue = RuleCatalogue::builtin().unwrap();
        assert!(catalogue
            .rules_in(RuleCategory::Moderation)
            .all(|rule| !rule.case_sensitive()));
        for category in [RuleCategory::Navigation, RuleCategory::Footer, RuleCategory::Ui] {
            assert!(catalogue.rules_in(category).all(SanitizationRule::case_sensitive));
        }
    }

    #[test]
    fn test_stop_before_keeps_marker() {
        let rule = SanitizationRule::compile(
            &RuleSpec::new(RuleCategory::Footer, r"##### Our Products").until(r"\n##"),
        )
        .unwrap();
        let text = "Intro\n##### Our Products\n* LUTs\n* Courses\n## Next\nBody";
        assert_eq!(rule.apply(text), "Intro\n\n## Next\nBody");
    }

    #[test]
    fn test_stop_before_missing_marker_keeps_block() {
        let rule = SanitizationRule::compile(
            &RuleSpec::new(RuleCategory::Footer, r"##### Our Products").until(r"\n##"),
        )
        .unwrap();
        let text = "Intro\n##### Our Products\n* LUTs\n* Courses";
        assert!(matches!(rule.apply(text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_stop_before_multiple_blocks() {
        let rule = SanitizationRule::compile(
            &RuleSpec::new(RuleCategory::Navigation, r"## Post navigation").until(r"\n##"),
        )
        .unwrap();
        let text = "A\n## Post navigation\nx\n## B\n## Post navigation\ny\n## C";
        assert_eq!(rule.apply(text), "A\n\n## B\n\n## C");
    }

    #[test]
    fn test_spans_newlines_flag() {
        let single = SanitizationRule::compile(&RuleSpec::new(RuleCategory::Ui, r"Start.*?End"))
            .unwrap();
        let spanning =
            SanitizationRule::compile(&RuleSpec::new(RuleCategory::Ui, r"Start.*?End").spanning())
                .unwrap();
        let text = "Start\nmiddle\nEnd";
        assert_eq!(single.apply(text), text);
        assert_eq!(spanning.apply(text), "");
    }

    #[test]
    fn test_operator_rule_from_json() {
        let json = r#"{"category": "moderation", "pattern": "flag this comment"}"#;
        let spec: RuleSpec = serde_json::from_str(json).unwrap();
        let rule = SanitizationRule::compile(&spec).unwrap();
        assert_eq!(rule.category(), RuleCategory::Moderation);
        assert!(!rule.case_sensitive());
        assert!(!rule.spans_newlines());
        assert_eq!(rule.apply("Nice! FLAG THIS COMMENT"), "Nice! ");
    }

    #[test]
    fn test_invalid_operator_rule() {
        let spec = RuleSpec::new(RuleCategory::Ui, r"[unclosed");
        assert!(matches!(
            RuleCatalogue::empty().with_rules(&[spec]),
            Err(DigestError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_operator_rules_run_after_builtin() {
        let extra = RuleSpec::new(RuleCategory::Navigation, r"custom nav");
        let catalogue = RuleCatalogue::builtin().unwrap().with_rules(&[extra]).unwrap();
        let last = catalogue.rules_in(RuleCategory::Navigation).last().unwrap();
        assert_eq!(last.pattern(), "custom nav");
    }
}
