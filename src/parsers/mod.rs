pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

use crate::results::{FetchedPage, Image, Links, Media};
use url::Url;

/// Enum to represent different types of page sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserType {
    /// HTML document, converted to markdown-style text
    Html,
    /// Plain text or markdown served as-is
    Text,
    /// Images, stylesheets, scripts and other assets; nothing to extract
    Other,
}

impl ParserType {
    /// Determines the parser type based on the URL path
    pub fn from_url(url: &str) -> Self {
        let path = Url::parse(url)
            .map(|u| u.path().to_ascii_lowercase())
            .unwrap_or_else(|_| url.to_ascii_lowercase());

        if path.ends_with(".txt") || path.ends_with(".md") {
            ::log::debug!("Classifying as Text: {}", url);
            ParserType::Text
        } else if [
            ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".css", ".js", ".pdf", ".zip",
        ]
        .iter()
        .any(|ext| path.ends_with(ext))
        {
            ::log::debug!("Classifying as Other: {}", url);
            ParserType::Other
        } else {
            ParserType::Html
        }
    }
}

/// Result of parsing one page source
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Document title, if one was found
    pub title: Option<String>,
    /// Markdown-style text
    pub content: String,
    /// Links split by host
    pub links: Links,
    /// Images in document order
    pub images: Vec<Image>,
}

impl ParseResult {
    /// Creates a new parse result with content only (no links)
    pub fn content_only(content: String) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// Package the result, together with its source, as a fetch result
    pub fn into_fetched(self, html: String) -> FetchedPage {
        FetchedPage {
            html,
            title: self.title,
            extracted_text: self.content,
            links: self.links,
            media: Media {
                images: self.images,
            },
            final_url: None,
        }
    }
}

/// Main parser that delegates to specific format parsers
pub struct Parser;

impl Parser {
    /// Parse `content` fetched from `base` with the given parser
    pub fn parse(content: &str, parser_type: ParserType, base: &Url) -> ParseResult {
        match parser_type {
            ParserType::Html => html::parse(content, base),
            ParserType::Text => text::parse(content),
            ParserType::Other => ParseResult::default(),
        }
    }

    /// Determine parser type from URL and then parse content
    pub fn parse_from_url(content: &str, url: &Url) -> ParseResult {
        let parser_type = ParserType::from_url(url.as_str());
        Self::parse(content, parser_type, url)
    }
}
