use crate::parsers::{ParseResult, Parser, ParserType};
use url::Url;

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<html><head><title>Hello</title></head><body><p>Hello, world!</p><a href="https://example.com/next">Next</a></body></html>"#;

    #[test]
    fn test_parse_with_parser_type() {
        let base = Url::parse("https://example.com/").unwrap();

        let result = Parser::parse(HTML, ParserType::Html, &base);
        assert!(result.content.starts_with("Hello, world!"));
        assert!(result.content.contains("[Next](https://example.com/next)"));
        assert_eq!(result.links.internal.len(), 1);

        let result = Parser::parse("Line 1\nLine 2", ParserType::Text, &base);
        assert_eq!(result.content, "Line 1\nLine 2");
        assert!(result.links.internal.is_empty());

        let result = Parser::parse("\u{89}PNG", ParserType::Other, &base);
        assert_eq!(result.content, "");
    }

    #[test]
    fn test_parse_from_url() {
        let page = Url::parse("https://example.org/page").unwrap();
        let result = Parser::parse_from_url(HTML, &page);
        assert_eq!(result.title.as_deref(), Some("Hello"));
        // Different host from the page, so the link is external
        assert_eq!(result.links.external.len(), 1);

        let notes = Url::parse("https://example.org/notes.md").unwrap();
        let result = Parser::parse_from_url(HTML, &notes);
        assert!(result.content.starts_with("<html>"));
        assert!(result.links.external.is_empty());
    }

    #[test]
    fn test_different_file_extensions() {
        let types = [
            ("https://example.org/file.txt", ParserType::Text),
            ("https://example.org/README.MD", ParserType::Text),
            ("https://example.org/file.html", ParserType::Html),
            ("https://example.org/logo.png?v=2", ParserType::Other),
            ("https://example.org/style.css", ParserType::Other),
            ("https://example.org/page", ParserType::Html),
        ];

        for (url, expected_type) in types {
            assert_eq!(
                ParserType::from_url(url),
                expected_type,
                "URL '{}' should be parsed as {:?}",
                url,
                expected_type
            );
        }
    }

    #[test]
    fn test_into_fetched() {
        let base = Url::parse("https://example.com/").unwrap();
        let fetched = Parser::parse(HTML, ParserType::Html, &base).into_fetched(HTML.to_string());
        assert_eq!(fetched.title.as_deref(), Some("Hello"));
        assert_eq!(fetched.html, HTML);
        assert!(fetched.extracted_text.starts_with("Hello, world!"));
        assert_eq!(fetched.links.internal[0].text, "Next");

        let empty = ParseResult::content_only(String::new()).into_fetched(String::new());
        assert!(empty.media.images.is_empty());
    }
}
