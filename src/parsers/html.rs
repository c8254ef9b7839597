use crate::parsers::ParseResult;
use crate::results::{Image, Link, Links};
use htmd::HtmlToMarkdown;
use htmd::options::{BulletListMarker, Options};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));
static IMAGES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("image selector is valid"));

/// Elements whose content never reaches the text
const SKIPPED: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe", "canvas",
];

/// Builds the HTML to markdown converter
///
/// List items use `* ` so navigation menus come out as `* [Login](...)` lines,
/// which is the shape the navigation rules look for.
fn create_converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .skip_tags(SKIPPED.to_vec())
        .options(Options {
            bullet_list_marker: BulletListMarker::Asterisk,
            ul_bullet_spacing: 1,
            ..Default::default()
        })
        .build()
}

/// Parses an HTML document into markdown plus its title, links and images
///
/// Links and image sources are resolved against `base`; the markdown keeps
/// hrefs as the page wrote them.
pub fn parse(html: &str, base: &Url) -> ParseResult {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&TITLE)
        .next()
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let content = match create_converter().convert(html) {
        Ok(markdown) => tidy_lines(&markdown),
        Err(e) => {
            ::log::warn!("Markdown conversion failed for {}: {}", base, e);
            String::new()
        }
    };

    let result = ParseResult {
        title,
        content,
        links: extract_links(&doc, base),
        images: extract_images(&doc, base),
    };

    ::log::debug!(
        "HTML parser found {} internal links, {} external links, {} images",
        result.links.internal.len(),
        result.links.external.len(),
        result.images.len()
    );
    result
}

/// Collects http(s) anchors in document order, first occurrence of a target wins
fn extract_links(doc: &Html, base: &Url) -> Links {
    let mut links = Links::default();
    let mut seen = HashSet::new();

    for anchor in doc.select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        let Some(url) = base
            .join(href)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
        else {
            continue;
        };

        let target = url.to_string();
        if !seen.insert(target.clone()) {
            continue;
        }
        let link = Link::new(target, collapse_whitespace(&anchor.text().collect::<String>()));
        if url.host_str() == base.host_str() {
            links.internal.push(link);
        } else {
            links.external.push(link);
        }
    }
    links
}

fn extract_images(doc: &Html, base: &Url) -> Vec<Image> {
    doc.select(&IMAGES)
        .filter_map(|img| {
            let attrs = img.value();
            let src = attrs
                .attr("src")
                .or_else(|| attrs.attr("data-src"))
                .map(str::trim)
                .filter(|s| !s.is_empty())?;
            let src = base
                .join(src)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| src.to_string());
            let alt = collapse_whitespace(attrs.attr("alt").unwrap_or_default());
            Some(Image::new(src, alt))
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim trailing spaces and keep at most one blank line between blocks
fn tidy_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() && lines.last().is_none_or(|last| last.is_empty()) {
            continue;
        }
        lines.push(if line.trim().is_empty() { "" } else { line });
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
