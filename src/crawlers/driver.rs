//! The crawl loop: seed first, then the selected candidates one at a time.

use crate::crawlers::crawler::Fetcher;
use crate::error::{CandidateFetchFailure, DigestError, Result};
use crate::frontier::{CrawlTarget, Frontier};
use crate::results::{FetchedPage, Link, Page, first_heading};
use crate::sanitizer::Sanitizer;

/// Pages collected by one run, in visit order, plus the candidates that failed
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub pages: Vec<Page>,
    pub failures: Vec<CandidateFetchFailure>,
}

/// Fetch and sanitize the seed, then up to `max_fanout` topic-matching candidates
///
/// Candidates come from the seed page only. A failing seed aborts the run with
/// [`DigestError::SeedFetchFailure`]; a failing candidate is recorded in
/// [`CrawlOutcome::failures`] and the loop moves on.
pub async fn crawl<F, P>(
    fetcher: &F,
    sanitizer: &Sanitizer,
    seed_url: &str,
    max_fanout: usize,
    topic_filter: P,
) -> Result<CrawlOutcome>
where
    F: Fetcher + ?Sized,
    P: Fn(&Link) -> bool,
{
    let mut frontier = Frontier::new();
    let seed = frontier.seed(seed_url)?;
    ::log::info!("Fetching seed page: {}", seed.url);

    let fetched = fetcher.fetch(&seed.url).await.map_err(|source| {
        ::log::error!("Seed page {} could not be fetched: {}", seed.url, source);
        DigestError::SeedFetchFailure {
            url: seed.url.clone(),
            source,
        }
    })?;

    if let Some(final_url) = fetched.final_url.as_deref() {
        frontier.accept_redirect(final_url);
    }
    let seed_page = build_page(sanitizer, &seed, fetched);
    let discovered = frontier.discover_candidates(&seed_page, &topic_filter);
    ::log::info!(
        "Found {} candidate pages on the seed; visiting up to {}",
        discovered.len(),
        max_fanout
    );

    let mut outcome = CrawlOutcome {
        pages: vec![seed_page],
        failures: Vec::new(),
    };

    let total = discovered.len().min(max_fanout);
    let mut remaining = max_fanout;
    let mut visited = 0;
    while remaining > 0 {
        let batch = frontier.select_next(remaining);
        if batch.is_empty() {
            break;
        }
        remaining -= batch.len();

        for target in batch {
            visited += 1;
            ::log::info!("[{}/{}] Fetching {}", visited, total, target.url);

            match fetcher.fetch(&target.url).await {
                Ok(fetched) => outcome.pages.push(build_page(sanitizer, &target, fetched)),
                Err(error) => {
                    ::log::warn!("Skipping {}: {}", target.url, error);
                    outcome.failures.push(CandidateFetchFailure {
                        url: target.url,
                        error,
                    });
                }
            }
        }
    }

    ::log::info!(
        "Crawl finished: {} pages collected, {} candidates failed",
        outcome.pages.len(),
        outcome.failures.len()
    );
    Ok(outcome)
}

fn build_page(sanitizer: &Sanitizer, target: &CrawlTarget, fetched: FetchedPage) -> Page {
    let title = page_title(target, &fetched);
    let sanitized = sanitizer.sanitize(&fetched.extracted_text);
    ::log::debug!(
        "{}: {} bytes extracted, {} after sanitizing",
        target.url,
        fetched.extracted_text.len(),
        sanitized.len()
    );
    Page::new(target.url.clone(), title, target.depth, fetched, sanitized)
}

/// Link text for candidates, then the fetched title, then the first `# ` heading
fn page_title(target: &CrawlTarget, fetched: &FetchedPage) -> String {
    let link_text = Some(target.text.trim()).filter(|t| !t.is_empty());
    let fetched_title = fetched
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    link_text
        .or(fetched_title)
        .or_else(|| first_heading(&fetched.extracted_text))
        .unwrap_or_default()
        .to_string()
}
