//! Assembles sanitized pages into one navigable document.
//!
//! [`ReportBuilder`] collects immutable section and appendix records; the
//! text is produced once by the [`Report`] `Display` impl, so a document is
//! either absent or complete.

use crate::results::{Image, Link, Page};
use chrono::{Local, NaiveDateTime};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// Title used when a page has none
pub const UNTITLED: &str = "Untitled";
/// Images kept in the appendix after deduplication
pub const MAX_IMAGES: usize = 10;
/// External links kept in the appendix after deduplication
pub const MAX_EXTERNAL_LINKS: usize = 15;
/// Body of the document when no page was collected
pub const EMPTY_REPORT: &str = "No data available to generate a report.";

const BASE_HEADING_LEVEL: usize = 2;
const EMPTY_BODY: &str = "*No content available*";
const DIVIDER: &str = "---";

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static EDGE_SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\w\s]+|[^\w\s]+$").expect("edge pattern is valid"));
static NON_ANCHOR_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("anchor pattern is valid"));
static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("separator pattern is valid"));

/// Trim, collapse inner whitespace and strip leading/trailing symbols
pub fn clean_title(title: &str) -> String {
    let collapsed = WHITESPACE_RUNS.replace_all(title.trim(), " ");
    let stripped = EDGE_SYMBOLS.replace_all(&collapsed, "");
    let cleaned = stripped.trim();
    if cleaned.is_empty() {
        UNTITLED.to_string()
    } else {
        cleaned.to_string()
    }
}

/// URL-fragment-safe slug for a cleaned title
pub fn create_anchor(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = NON_ANCHOR_CHARS.replace_all(&lower, "");
    let joined = SEPARATOR_RUNS.replace_all(&stripped, "-");
    let anchor = joined.trim_matches('-');
    if anchor.is_empty() {
        "section".to_string()
    } else {
        anchor.to_string()
    }
}

/// One page's part of the document; also its table of contents entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub index: usize,
    pub title: String,
    pub anchor: String,
    pub url: String,
    pub depth: usize,
    pub content: String,
}

impl Section {
    fn heading_level(&self) -> usize {
        (BASE_HEADING_LEVEL + self.depth).min(6)
    }
}

/// A finished, immutable document
#[derive(Debug, Clone)]
pub struct Report {
    title: String,
    source_url: String,
    source_label: String,
    generated_at: NaiveDateTime,
    sections: Vec<Section>,
    images: Vec<Image>,
    external_links: Vec<Link>,
}

impl Report {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn external_links(&self) -> &[Link] {
        &self.external_links
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Serialize the document
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn write_toc(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Table of Contents\n")?;
        for section in &self.sections {
            writeln!(
                f,
                "{}- [{}. {}](#{})",
                "  ".repeat(section.depth),
                section.index,
                section.title,
                section.anchor
            )?;
        }
        writeln!(f, "\n{DIVIDER}\n")
    }

    fn write_appendix(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Resources\n")?;

        if self.images.is_empty() && self.external_links.is_empty() {
            return writeln!(f, "*No images or external links found*");
        }

        if !self.images.is_empty() {
            writeln!(f, "### Images\n")?;
            for image in &self.images {
                let alt = if image.alt.trim().is_empty() {
                    "Image"
                } else {
                    image.alt.trim()
                };
                writeln!(f, "- ![{}]({})", alt, image.src)?;
            }
            writeln!(f)?;
        }

        if !self.external_links.is_empty() {
            writeln!(f, "### External Links\n")?;
            for link in &self.external_links {
                let text = if link.text.trim().is_empty() {
                    link.href.as_str()
                } else {
                    link.text.trim()
                };
                writeln!(f, "- [{}]({})", text, link.href)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}\n", self.title)?;
        writeln!(
            f,
            "*Generated: {}*\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(f, "**Source:** [{}]({})\n", self.source_label, self.source_url)?;
        writeln!(f, "{DIVIDER}\n")?;

        if self.sections.is_empty() {
            return writeln!(f, "{EMPTY_REPORT}");
        }

        self.write_toc(f)?;
        for section in &self.sections {
            write!(f, "{section}")?;
        }
        self.write_appendix(f)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<a id=\"{}\"></a>", self.anchor)?;
        writeln!(
            f,
            "{} {}. {}\n",
            "#".repeat(self.heading_level()),
            self.index,
            self.title
        )?;
        writeln!(f, "**URL:** {}\n", self.url)?;
        if self.content.trim().is_empty() {
            writeln!(f, "{EMPTY_BODY}")?;
        } else {
            writeln!(f, "{}", self.content)?;
        }
        writeln!(f, "\n{DIVIDER}\n")
    }
}

/// Collects pages in visit order and produces a [`Report`]
#[derive(Debug)]
pub struct ReportBuilder {
    seed_url: String,
    title: Option<String>,
    generated_at: NaiveDateTime,
    sections: Vec<Section>,
    anchors: HashSet<String>,
    images: Vec<Image>,
    image_keys: HashSet<String>,
    external_links: Vec<Link>,
    link_keys: HashSet<String>,
}

impl ReportBuilder {
    pub fn new(seed_url: &str) -> Self {
        Self {
            seed_url: seed_url.to_string(),
            title: None,
            generated_at: Local::now().naive_local(),
            sections: Vec::new(),
            anchors: HashSet::new(),
            images: Vec::new(),
            image_keys: HashSet::new(),
            external_links: Vec::new(),
            link_keys: HashSet::new(),
        }
    }

    /// Override the document title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Override the generation timestamp
    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = at;
        self
    }

    /// Append the next page in visit order
    pub fn add_page(mut self, page: &Page) -> Self {
        let title = clean_title(&page.title);
        let anchor = self.unique_anchor(create_anchor(&title));

        self.sections.push(Section {
            index: self.sections.len() + 1,
            title,
            anchor,
            url: page.url.clone(),
            depth: page.depth,
            content: page.sanitized_content.clone(),
        });

        for image in &page.images {
            if !image.src.trim().is_empty() && self.image_keys.insert(image.src.clone()) {
                self.images.push(image.clone());
            }
        }
        for link in &page.links.external {
            if !link.href.trim().is_empty() && self.link_keys.insert(link.href.clone()) {
                self.external_links.push(link.clone());
            }
        }
        self
    }

    fn unique_anchor(&mut self, base: String) -> String {
        let mut anchor = base.clone();
        let mut suffix = 2;
        while self.anchors.contains(&anchor) {
            anchor = format!("{base}-{suffix}");
            suffix += 1;
        }
        self.anchors.insert(anchor.clone());
        anchor
    }

    pub fn build(mut self) -> Report {
        self.images.truncate(MAX_IMAGES);
        self.external_links.truncate(MAX_EXTERNAL_LINKS);

        let host = Url::parse(&self.seed_url)
            .ok()
            .and_then(|url| url.host_str().map(|h| h.trim_start_matches("www.").to_string()));
        let source_label = host.unwrap_or_else(|| self.seed_url.clone());
        let title = self
            .title
            .unwrap_or_else(|| format!("Site Digest - {source_label}"));

        Report {
            title,
            source_url: self.seed_url,
            source_label,
            generated_at: self.generated_at,
            sections: self.sections,
            images: self.images,
            external_links: self.external_links,
        }
    }
}

/// Build the document for `pages` (in visit order) crawled from `seed_url`
pub fn assemble(pages: &[Page], seed_url: &str) -> String {
    pages
        .iter()
        .fold(ReportBuilder::new(seed_url), ReportBuilder::add_page)
        .build()
        .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Links;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    fn page(url: &str, title: &str, depth: usize, content: &str) -> Page {
        Page {
            url: url.to_string(),
            title: title.to_string(),
            raw_content: content.to_string(),
            sanitized_content: content.to_string(),
            depth,
            links: Links::default(),
            images: Vec::new(),
        }
    }

    fn build(pages: &[Page]) -> Report {
        pages
            .iter()
            .fold(
                ReportBuilder::new("https://www.example.com/part-1/").generated_at(at()),
                ReportBuilder::add_page,
            )
            .build()
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("  Creative   Coding\n Part 1  "), "Creative Coding Part 1");
        assert_eq!(clean_title("»» Part 2: Loops!"), "Part 2: Loops");
        assert_eq!(clean_title("Part 3: Arrays! »"), "Part 3: Arrays!");
        assert_eq!(clean_title(""), UNTITLED);
        assert_eq!(clean_title("   "), UNTITLED);
        assert_eq!(clean_title("!!!"), UNTITLED);
    }

    #[test]
    fn test_create_anchor() {
        assert_eq!(
            create_anchor("Creative Coding With DCTL: Part 1"),
            "creative-coding-with-dctl-part-1"
        );
        assert_eq!(create_anchor("A -- B  - C"), "a-b-c");
        assert_eq!(create_anchor("- Leading and trailing -"), "leading-and-trailing");
        assert_eq!(create_anchor("???"), "section");
    }

    #[test]
    fn test_duplicate_titles_get_suffixes() {
        let report = build(&[
            page("https://example.com/a", "Part", 0, "a"),
            page("https://example.com/b", "Part", 1, "b"),
            page("https://example.com/c", "Part!", 1, "c"),
            page("https://example.com/d", "Part 2", 1, "d"),
        ]);
        let anchors: Vec<_> = report.sections().iter().map(|s| s.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["part", "part-2", "part-3", "part-2-2"]);
    }

    #[test]
    fn test_toc_follows_page_order_and_depth() {
        let report = build(&[
            page("https://example.com/seed", "Seed", 0, "s"),
            page("https://example.com/b", "Beta", 1, "b"),
            page("https://example.com/a", "Alpha", 1, "a"),
        ]);
        let text = report.render();

        let toc = "## Table of Contents\n\n\
                   - [1. Seed](#seed)\n  \
                   - [2. Beta](#beta)\n  \
                   - [3. Alpha](#alpha)\n";
        assert!(text.contains(toc), "unexpected TOC in:\n{text}");

        let seed = text.find("## 1. Seed").unwrap();
        let beta = text.find("### 2. Beta").unwrap();
        let alpha = text.find("### 3. Alpha").unwrap();
        assert!(seed < beta && beta < alpha);
    }

    #[test]
    fn test_section_layout() {
        let report = build(&[page("https://example.com/seed", "Seed", 0, "Hello\n\nWorld")]);
        let text = report.render();
        assert!(text.starts_with("# Site Digest - example.com\n\n*Generated: 2024-03-01 12:30:00*\n"));
        assert!(text.contains("**Source:** [example.com](https://www.example.com/part-1/)"));
        assert!(text.contains(
            "<a id=\"seed\"></a>\n## 1. Seed\n\n**URL:** https://example.com/seed\n\nHello\n\nWorld\n\n---\n"
        ));
    }

    #[test]
    fn test_display_matches_render() {
        let report = build(&[
            page("https://example.com/seed", "Seed", 0, "Hello"),
            page("https://example.com/b", "Beta", 1, ""),
        ]);
        assert_eq!(format!("{report}"), report.render());

        let section = &report.sections()[1];
        assert_eq!(
            section.to_string(),
            "<a id=\"beta\"></a>\n### 2. Beta\n\n**URL:** https://example.com/b\n\n*No content available*\n\n---\n\n"
        );
    }

    #[test]
    fn test_empty_content_placeholder() {
        let text = build(&[page("https://example.com/seed", "", 0, "")]).render();
        assert!(text.contains("## 1. Untitled"));
        assert!(text.contains(EMPTY_BODY));
    }

    #[test]
    fn test_no_pages_placeholder() {
        let text = assemble(&[], "https://example.com/");
        assert!(text.contains(EMPTY_REPORT));
        assert!(!text.contains("Table of Contents"));
    }

    #[test]
    fn test_external_links_deduplicated_first_seen_wins() {
        let mut first = page("https://example.com/a", "A", 0, "a");
        first.links.external = vec![Link::new("https://docs.rs/", "Docs first")];
        let mut second = page("https://example.com/b", "B", 1, "b");
        second.links.external = vec![
            Link::new("https://docs.rs/", "Docs again"),
            Link::new("", "No href"),
        ];

        let report = build(&[first, second]);
        assert_eq!(report.external_links().len(), 1);
        assert_eq!(report.external_links()[0].text, "Docs first");

        let text = report.render();
        assert!(text.contains("- [Docs first](https://docs.rs/)"));
        assert!(!text.contains("Docs again"));
    }

    #[test]
    fn test_resources_capped_after_dedup() {
        let mut first = page("https://example.com/a", "A", 0, "a");
        first.images = (0..8)
            .map(|i| Image::new(format!("https://cdn.example.com/{i}.png"), ""))
            .collect();
        first.links.external = (0..10)
            .map(|i| Link::new(format!("https://ext{i}.org/"), format!("Ext {i}")))
            .collect();

        let mut second = page("https://example.com/b", "B", 1, "b");
        // Repeats of the first page's resources do not count against the cap
        second.images = (0..12)
            .map(|i| Image::new(format!("https://cdn.example.com/{i}.png"), "again"))
            .collect();
        second.links.external = (5..20)
            .map(|i| Link::new(format!("https://ext{i}.org/"), format!("Ext {i}")))
            .collect();

        let report = build(&[first, second]);

        let srcs: Vec<_> = report.images().iter().map(|i| i.src.clone()).collect();
        let expected: Vec<_> = (0..10)
            .map(|i| format!("https://cdn.example.com/{i}.png"))
            .collect();
        assert_eq!(srcs, expected);
        assert_eq!(report.images()[8].alt, "again");
        assert_eq!(report.images()[0].alt, "");

        let hrefs: Vec<_> = report.external_links().iter().map(|l| l.href.clone()).collect();
        let expected: Vec<_> = (0..15).map(|i| format!("https://ext{i}.org/")).collect();
        assert_eq!(hrefs, expected);
    }

    #[test]
    fn test_title_override_and_deep_heading_cap() {
        let report = ReportBuilder::new("not a url")
            .with_title("DCTL Guide")
            .generated_at(at())
            .add_page(&page("https://example.com/deep", "Deep", 7, "x"))
            .build();
        let text = report.render();
        assert!(text.starts_with("# DCTL Guide\n"));
        assert!(text.contains("**Source:** [not a url](not a url)"));
        assert!(text.contains("\n###### 1. Deep\n"));
    }
}
