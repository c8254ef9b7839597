// Re-export modules
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod frontier;
pub mod parsers;
pub mod report;
pub mod results;
pub mod sanitizer;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::DigestConfig;
pub use error::{CandidateFetchFailure, DigestError, FetchError, Result};
pub use results::{FetchedPage, Image, Link, Page};

use chrono::NaiveDateTime;
use crawlers::crawler::Fetcher;
use crawlers::web::WebDriverFetcher;
use filter::{TopicFilter, TopicFilterConfig};
use report::ReportBuilder;
use sanitizer::{RuleCatalogue, RuleCategory, RuleSpec, Sanitizer};
use std::path::{Path, PathBuf};

/// The result of a successful run
#[derive(Debug)]
pub struct DigestOutput {
    /// The assembled document
    pub document: String,
    /// Where the document should be written
    pub filename: String,
    /// Pages in visit order
    pub pages: Vec<Page>,
    /// Candidates that could not be fetched
    pub failures: Vec<CandidateFetchFailure>,
}

/// The result of re-sanitizing a saved document
#[derive(Debug)]
pub struct CleanOutput {
    /// The cleaned document
    pub document: String,
    /// Where the cleaned copy should be written
    pub path: PathBuf,
    /// Characters in the input
    pub original_chars: usize,
    /// Characters left after sanitizing
    pub cleaned_chars: usize,
    /// Rule categories that found something to remove
    pub matched: Vec<RuleCategory>,
}

impl CleanOutput {
    pub fn removed_chars(&self) -> usize {
        self.original_chars.saturating_sub(self.cleaned_chars)
    }

    /// Share of the input removed, in percent
    pub fn removed_percent(&self) -> f64 {
        if self.original_chars == 0 {
            return 0.0;
        }
        self.removed_chars() as f64 / self.original_chars as f64 * 100.0
    }
}

/// Main builder for producing a digest of a seed page and its topic neighbours
pub struct Digest {
    config: DigestConfig,
    generated_at: Option<NaiveDateTime>,
}

impl Digest {
    /// Create a new Digest builder for the given seed URL
    pub fn new(seed_url: &str) -> Self {
        Self::from_config(DigestConfig::new(seed_url))
    }

    /// Create a builder from a complete configuration
    pub fn from_config(config: DigestConfig) -> Self {
        Self {
            config,
            generated_at: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_config(DigestConfig::from_file(path)?))
    }

    /// Set the maximum number of candidate pages visited beyond the seed
    pub fn with_max_fanout(mut self, max_fanout: usize) -> Self {
        self.config.max_fanout = max_fanout;
        self
    }

    /// Set which links count as candidates
    pub fn with_topic(mut self, topic: TopicFilterConfig) -> Self {
        self.config.topic = topic;
        self
    }

    /// Add operator rules after the built-in ones
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = RuleSpec>) -> Self {
        self.config.rules.extend(rules);
        self
    }

    /// Apply only operator rules
    pub fn without_builtin_rules(mut self) -> Self {
        self.config.use_builtin_rules = false;
        self
    }

    /// Set the report title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// Set the output path
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.config.output = Some(output.into());
        self
    }

    /// Fix the report timestamp instead of using the current local time
    pub fn with_generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Compile the configured rule catalogue
    pub fn sanitizer(&self) -> Result<Sanitizer> {
        let catalogue = if self.config.use_builtin_rules {
            RuleCatalogue::builtin()?
        } else {
            RuleCatalogue::empty()
        };
        Ok(Sanitizer::new(catalogue.with_rules(&self.config.rules)?))
    }

    /// Compile the configured topic filter
    pub fn topic_filter(&self) -> Result<TopicFilter> {
        TopicFilter::new(&self.config.topic)
    }

    /// Run the digest with the given fetcher
    pub async fn run<F>(&self, fetcher: &F) -> Result<DigestOutput>
    where
        F: Fetcher + ?Sized,
    {
        // Rules and filters are checked before anything is fetched
        let sanitizer = self.sanitizer()?;
        let topic_filter = self.topic_filter()?;
        ::log::debug!(
            "Using {} sanitization rules",
            sanitizer.catalogue().len()
        );

        let outcome = crawlers::driver::crawl(
            fetcher,
            &sanitizer,
            &self.config.seed_url,
            self.config.max_fanout,
            |link: &Link| topic_filter.matches(link),
        )
        .await?;

        let mut builder = ReportBuilder::new(&self.config.seed_url);
        if let Some(title) = &self.config.title {
            builder = builder.with_title(title.clone());
        }
        if let Some(at) = self.generated_at {
            builder = builder.generated_at(at);
        }
        let document = outcome
            .pages
            .iter()
            .fold(builder, ReportBuilder::add_page)
            .build()
            .render();

        let filename = self
            .config
            .output
            .clone()
            .unwrap_or_else(|| utils::output_filename(&self.config.seed_url));

        Ok(DigestOutput {
            document,
            filename,
            pages: outcome.pages,
            failures: outcome.failures,
        })
    }

    /// Re-sanitize an already saved document without fetching anything
    ///
    /// Uses the configured rules. The cleaned copy goes to the configured output,
    /// or to `<stem>_cleaned.md` next to `path`.
    pub fn clean_file(&self, path: impl AsRef<Path>) -> Result<CleanOutput> {
        let path = path.as_ref();
        let sanitizer = self.sanitizer()?;
        let original = std::fs::read_to_string(path)?;
        ::log::info!("Cleaning {} ({} bytes)", path.display(), original.len());

        let document = sanitizer.sanitize(&original);
        let target = match &self.config.output {
            Some(output) => PathBuf::from(output),
            None => utils::cleaned_filename(path),
        };

        Ok(CleanOutput {
            original_chars: original.chars().count(),
            cleaned_chars: document.chars().count(),
            matched: sanitizer.matched_categories(&original),
            document,
            path: target,
        })
    }

    /// Run the digest through a WebDriver-controlled browser
    pub async fn generate(&self) -> Result<DigestOutput> {
        let fetcher = WebDriverFetcher::from_config(&self.config);
        let result = self.run(&fetcher).await;
        fetcher.close().await;
        result
    }
}
