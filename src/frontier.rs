//! Decides which pages beyond the seed get visited, in what order, and when to stop.

use crate::error::{DigestError, Result};
use crate::filter::{resolve_link, site_host};
use crate::results::{Link, Page};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Fan-out cap used when none is configured
pub const DEFAULT_MAX_FANOUT: usize = 5;

/// Lifecycle of a frontier within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierState {
    /// Created, no seed yet
    Idle,
    /// Seed handed out, candidates may still be discovered
    Seeded,
    /// At least one batch of candidates has been selected
    Expanding,
    /// Selection came back empty; the run is over
    Exhausted,
}

/// One unit of work handed to the crawl driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Canonical URL to fetch
    pub url: String,
    /// Text of the link that led here (empty for the seed)
    pub text: String,
    /// 0 for the seed, 1 for candidates
    pub depth: usize,
}

/// Visited set plus the ordered queue of discovered candidates
#[derive(Debug)]
pub struct Frontier {
    state: FrontierState,
    seed: Option<Url>,
    /// Site hosts that count as the seed's own, `www.` removed
    hosts: HashSet<String>,
    visited: HashSet<String>,
    discovered: VecDeque<Link>,
    queued: HashSet<String>,
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            state: FrontierState::Idle,
            seed: None,
            hosts: HashSet::new(),
            visited: HashSet::new(),
            discovered: VecDeque::new(),
            queued: HashSet::new(),
        }
    }

    pub fn state(&self) -> FrontierState {
        self.state
    }

    /// The canonical seed URL, once seeded
    pub fn seed_url(&self) -> Option<&Url> {
        self.seed.as_ref()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Candidates discovered but not yet selected, in discovery order
    pub fn pending(&self) -> impl Iterator<Item = &Link> {
        self.discovered.iter()
    }

    /// Mark `url` visited and return it as the first unit of work
    pub fn seed(&mut self, url: &str) -> Result<CrawlTarget> {
        let invalid = |reason: &str| DigestError::InvalidSeed {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        if self.state != FrontierState::Idle {
            return Err(invalid("frontier is already seeded"));
        }

        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(invalid("URL is empty"));
        }

        let mut parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("URL scheme must be http or https"));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(invalid("URL has no host"));
        }
        parsed.set_fragment(None);

        let canonical = parsed.to_string();
        self.visited.insert(canonical.clone());
        self.hosts.extend(site_host(&parsed));
        self.seed = Some(parsed);
        self.state = FrontierState::Seeded;
        ::log::debug!("Frontier seeded with {}", canonical);

        Ok(CrawlTarget {
            url: canonical,
            text: String::new(),
            depth: 0,
        })
    }

    /// Record where the seed request actually landed
    ///
    /// The final URL is marked visited and its host is treated as the seed's own,
    /// so a seed that redirects to another host still finds candidates.
    pub fn accept_redirect(&mut self, final_url: &str) {
        if self.seed.is_none() {
            ::log::warn!("Redirect reported to an unseeded frontier; ignoring");
            return;
        }
        let Some(mut resolved) = Url::parse(final_url.trim())
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
        else {
            ::log::warn!("Ignoring unusable redirect target: {:?}", final_url);
            return;
        };
        resolved.set_fragment(None);

        if let Some(host) = site_host(&resolved) {
            if self.hosts.insert(host.clone()) {
                ::log::info!("Seed redirected to {}; treating it as the same site", host);
            }
        }
        self.visited.insert(resolved.to_string());
    }

    /// Queue the topic-matching same-site links of `page` that were not seen before
    ///
    /// Links are resolved against the page URL. Returns the newly queued links in
    /// page order; links that are malformed, off-site, visited or already queued
    /// are skipped silently.
    pub fn discover_candidates<F>(&mut self, page: &Page, topic_filter: F) -> Vec<Link>
    where
        F: Fn(&Link) -> bool,
    {
        if self.seed.is_none() {
            ::log::warn!("Candidates offered to an unseeded frontier; ignoring");
            return Vec::new();
        }
        let Ok(base) = Url::parse(&page.url) else {
            ::log::warn!("Page URL {} is not absolute; ignoring its links", page.url);
            return Vec::new();
        };

        let mut added = Vec::new();
        for link in &page.links.internal {
            let Some(resolved) = resolve_link(&base, &link.href) else {
                ::log::trace!("Skipping malformed link: {:?}", link.href);
                continue;
            };
            if !site_host(&resolved).is_some_and(|host| self.hosts.contains(&host)) {
                ::log::trace!("Skipping off-host link: {}", resolved);
                continue;
            }

            let candidate = Link::new(resolved.to_string(), link.text.trim());
            if self.visited.contains(&candidate.href) || self.queued.contains(&candidate.href) {
                continue;
            }
            if !topic_filter(&candidate) {
                ::log::trace!("Topic filter rejected: {}", candidate.href);
                continue;
            }

            self.queued.insert(candidate.href.clone());
            self.discovered.push_back(candidate.clone());
            added.push(candidate);
        }

        ::log::debug!(
            "Discovered {} new candidates on {} ({} pending)",
            added.len(),
            page.url,
            self.discovered.len()
        );
        added
    }

    /// Take up to `max_fanout` candidates in discovery order, marking each visited
    pub fn select_next(&mut self, max_fanout: usize) -> Vec<CrawlTarget> {
        let mut selected = Vec::new();

        while selected.len() < max_fanout {
            let Some(link) = self.discovered.pop_front() else {
                break;
            };
            self.queued.remove(&link.href);
            if !self.visited.insert(link.href.clone()) {
                continue;
            }
            selected.push(CrawlTarget {
                url: link.href,
                text: link.text,
                depth: 1,
            });
        }

        self.state = match (self.state, selected.is_empty()) {
            (FrontierState::Idle, _) => FrontierState::Idle,
            (_, true) => FrontierState::Exhausted,
            (_, false) => FrontierState::Expanding,
        };
        selected
    }
}
