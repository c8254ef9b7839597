use serde::{Deserialize, Serialize};

/// A hyperlink found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link target (may be relative as extracted, absolute once resolved)
    #[serde(default)]
    pub href: String,

    /// Visible link text
    #[serde(default)]
    pub text: String,
}

impl Link {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// An image referenced by a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub src: String,

    #[serde(default)]
    pub alt: String,
}

impl Image {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
        }
    }
}

/// Links on a page split by whether they stay on the page's host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub internal: Vec<Link>,

    #[serde(default)]
    pub external: Vec<Link>,
}

/// Media referenced by a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub images: Vec<Image>,
}

/// What a fetcher hands back for one URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Raw page source (not read by the digest core)
    #[serde(default)]
    pub html: String,

    /// Document title, if the fetcher could find one
    #[serde(default)]
    pub title: Option<String>,

    /// Text extracted from the page, sanitizer input
    #[serde(default)]
    pub extracted_text: String,

    #[serde(default)]
    pub links: Links,

    #[serde(default)]
    pub media: Media,

    /// Where the browser ended up after redirects, when it differs from the request
    #[serde(default)]
    pub final_url: Option<String>,
}

/// One fetched and sanitized unit of the digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Canonical URL of the page
    pub url: String,

    /// Title of the page (possibly empty)
    pub title: String,

    /// Text as extracted by the fetcher
    pub raw_content: String,

    /// Text after boilerplate removal
    pub sanitized_content: String,

    /// 0 for the seed, 1 for candidates
    pub depth: usize,

    /// Links in order of first appearance on the page
    pub links: Links,

    /// Images in order of appearance on the page
    pub images: Vec<Image>,
}

impl Page {
    /// Create a page from a fetch result and its already-sanitized text
    pub fn new(
        url: String,
        title: String,
        depth: usize,
        fetched: FetchedPage,
        sanitized_content: String,
    ) -> Self {
        Self {
            url,
            title,
            raw_content: fetched.extracted_text,
            sanitized_content,
            depth,
            links: fetched.links,
            images: fetched.media.images,
        }
    }
}

/// First `# ` heading in markdown-ish text, used when a page has no title
pub fn first_heading(text: &str) -> Option<&str> {
    text.lines().find_map(|line| {
        line.strip_prefix("# ")
            .map(str::trim)
            .filter(|title| !title.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_heading() {
        assert_eq!(first_heading("intro\n# Part 1 \nbody"), Some("Part 1"));
        assert_eq!(first_heading("## Not top level\nbody"), None);
        assert_eq!(first_heading("# \n# Real"), Some("Real"));
    }

    #[test]
    fn test_fetched_page_from_partial_json() {
        let json = r#"{"extracted_text": "Hello", "links": {"external": [{"href": "https://x.org"}]}}"#;
        let fetched: FetchedPage = serde_json::from_str(json).unwrap();
        assert_eq!(fetched.extracted_text, "Hello");
        assert!(fetched.links.internal.is_empty());
        assert_eq!(fetched.links.external[0].text, "");
        assert!(fetched.media.images.is_empty());
        assert!(fetched.final_url.is_none());
    }
}
