use std::path::{Path, PathBuf};
use url::Url;

/// Default document filename for a seed URL: `<host without www., dots as _>_content.md`
pub fn output_filename(seed_url: &str) -> String {
    let stem = match Url::parse(seed_url.trim()) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => {
            let host = url.host_str().unwrap_or_default().trim_start_matches("www.");
            match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            }
        }
        _ => seed_url.to_string(),
    };
    format!("{}_content.md", sanitize_filename(&stem.replace('.', "_")))
}

/// Where a re-sanitized copy of `path` goes: `<stem>_cleaned.md` next to it
///
/// A `_content` suffix from a generated document is replaced, so
/// `example_com_content.md` becomes `example_com_cleaned.md`.
pub fn cleaned_filename(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem.strip_suffix("_content").unwrap_or(&stem);
    let name = if stem.is_empty() {
        "cleaned.md".to_string()
    } else {
        format!("{stem}_cleaned.md")
    };
    path.with_file_name(name)
}

/// Convert a string to a sanitized filename
pub fn sanitize_filename(url: &str) -> String {
    // Remove protocol and replace invalid filename characters
    let mut name = url.replace("http://", "").replace("https://", "");
    name = name.replace(['/', '\\', ':', '?', '&', '=', '#', '%', ' '], "_");

    // Limit filename length
    if name.len() > 100 {
        name.chars().take(100).collect()
    } else {
        name
    }
}
