use crate::parsers::ParseResult;
use crate::results::first_heading;

/// Parses a plain text or markdown document (no links)
///
/// Line structure is kept; each paragraph's lines are trimmed and
/// whitespace-normalized, and paragraphs are separated by one blank line.
/// The first `# ` heading becomes the title.
pub fn parse(text: &str) -> ParseResult {
    // Handle empty input
    if text.trim().is_empty() {
        return ParseResult::content_only(String::new());
    }

    let content = split_into_paragraphs(text)
        .iter()
        .map(|paragraph| process_paragraph(paragraph))
        .collect::<Vec<_>>()
        .join("\n\n");

    ParseResult {
        title: first_heading(&content).map(str::to_string),
        ..ParseResult::content_only(content)
    }
}

/// Splits text into paragraphs based on empty lines
pub fn split_into_paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current_paragraph: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // Found an empty line, which marks a paragraph boundary
            if !current_paragraph.is_empty() {
                paragraphs.push(std::mem::take(&mut current_paragraph));
            }
        } else {
            current_paragraph.push(trimmed);
        }
    }

    if !current_paragraph.is_empty() {
        paragraphs.push(current_paragraph);
    }

    paragraphs
}

/// Joins a paragraph's lines, normalizing whitespace within each line
pub fn process_paragraph(paragraph: &[&str]) -> String {
    paragraph
        .iter()
        .map(|line| normalize_whitespace_in_segment(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalizes whitespace within a single line or paragraph
pub fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}
