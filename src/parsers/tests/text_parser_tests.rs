use crate::parsers::text;

#[cfg(test)]
mod basic_tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        let result = text::parse("");
        assert_eq!(result.content, "");
        assert!(result.title.is_none());
        assert!(result.links.internal.is_empty());
    }

    #[test]
    fn test_whitespace_only() {
        let result = text::parse("   \n   \t   \r\n   ");
        assert_eq!(result.content, "");
    }

    #[test]
    fn test_line_breaks_kept() {
        let result = text::parse("Line 1\nLine 2\nLine 3");
        assert_eq!(result.content, "Line 1\nLine 2\nLine 3");
    }

    #[test]
    fn test_mixed_whitespace() {
        let input = "  Line 1  \n\n  Line 2  \t\r\n  Line 3  ";
        let result = text::parse(input);
        assert_eq!(result.content, "Line 1\n\nLine 2\nLine 3");
    }

    #[test]
    fn test_multiple_spaces_between_words() {
        let input = "Hello    world!    This    is    a    test.";
        let result = text::parse(input);
        assert_eq!(result.content, "Hello world! This is a test.");
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        let input = "Paragraph 1.\n\n\n\nParagraph 2.\n \n\t\nParagraph 3.";
        let result = text::parse(input);
        assert_eq!(result.content, "Paragraph 1.\n\nParagraph 2.\n\nParagraph 3.");
    }

    #[test]
    fn test_title_from_first_heading() {
        let input = "intro\n\n# Creative Coding With DCTL: Part 2\n\n## Setup";
        let result = text::parse(input);
        assert_eq!(
            result.title.as_deref(),
            Some("Creative Coding With DCTL: Part 2")
        );
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_split_into_paragraphs() {
        assert!(text::split_into_paragraphs("").is_empty());

        let result = text::split_into_paragraphs("Line 1a\nLine 1b\n\nLine 2a\nLine 2b");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], vec!["Line 1a", "Line 1b"]);
        assert_eq!(result[1], vec!["Line 2a", "Line 2b"]);

        let result = text::split_into_paragraphs("\n\nParagraph 1.\n\n\n\nParagraph 2.\n\n");
        assert_eq!(result, vec![vec!["Paragraph 1."], vec!["Paragraph 2."]]);
    }

    #[test]
    fn test_process_paragraph() {
        assert_eq!(text::process_paragraph(&[]), "");
        assert_eq!(
            text::process_paragraph(&["* [Login](x)", "a   b"]),
            "* [Login](x)\na b"
        );
    }

    #[test]
    fn test_normalize_whitespace_in_segment() {
        assert_eq!(text::normalize_whitespace_in_segment(" a \t b  "), "a b");
    }
}
