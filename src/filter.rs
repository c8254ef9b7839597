use crate::error::{DigestError, Result};
use crate::results::Link;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for deciding which same-host links belong to the topic being digested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicFilterConfig {
    /// At least one of these must occur in the link URL or text (if empty, no keyword is required)
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Every one of these must occur in the link text
    #[serde(default)]
    pub text_keywords: Vec<String>,

    /// Regex patterns for URLs to include (if empty, all URLs are included unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        // Static assets are never part of a page series
        r"\.(jpg|jpeg|png|gif|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip)$".to_string(),
    ]
}

impl Default for TopicFilterConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            text_keywords: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// Predicate over resolved links that restricts frontier candidates to one topic
#[derive(Debug)]
pub struct TopicFilter {
    keywords: Vec<String>,
    text_keywords: Vec<String>,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl Default for TopicFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl TopicFilter {
    /// Create a new topic filter from configuration
    pub fn new(config: &TopicFilterConfig) -> Result<Self> {
        Ok(Self {
            keywords: lowercase_all(&config.keywords),
            text_keywords: lowercase_all(&config.text_keywords),
            include_regexes: compile_all(&config.include_patterns)?,
            exclude_regexes: compile_all(&config.exclude_patterns)?,
        })
    }

    /// A filter that accepts every link
    pub fn accept_all() -> Self {
        Self {
            keywords: Vec::new(),
            text_keywords: Vec::new(),
            include_regexes: Vec::new(),
            exclude_regexes: Vec::new(),
        }
    }

    /// Determine if a resolved link belongs to the topic
    pub fn matches(&self, link: &Link) -> bool {
        let url = link.href.as_str();

        // Exclusions take precedence
        if self.exclude_regexes.iter().any(|regex| regex.is_match(url)) {
            return false;
        }

        if !self.include_regexes.is_empty()
            && !self.include_regexes.iter().any(|regex| regex.is_match(url))
        {
            return false;
        }

        let url_lower = url.to_lowercase();
        let text_lower = link.text.to_lowercase();

        if !self.keywords.is_empty()
            && !self
                .keywords
                .iter()
                .any(|kw| url_lower.contains(kw) || text_lower.contains(kw))
        {
            return false;
        }

        self.text_keywords.iter().all(|kw| text_lower.contains(kw))
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| DigestError::InvalidTopicPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Resolve `href` against `base` into a canonical http(s) URL without fragment
///
/// Returns `None` for empty, unparseable and non-web links.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved)
}

/// Lowercased host of `url` with a leading `www.` removed
pub fn site_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(bare) if !bare.is_empty() => Some(bare.to_string()),
        _ => Some(host),
    }
}

/// Whether two URLs belong to the same site, treating `www.` as the bare host
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (site_host(a), site_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
