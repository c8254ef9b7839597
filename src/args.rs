use clap::Parser;
use page_digest::DigestConfig;
use page_digest::error::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "page-digest")]
#[command(about = "Crawls a seed page and its same-site topic pages into one cleaned-up document")]
#[command(version)]
pub struct Args {
    /// Seed page URL (optional when --config names one)
    pub seed: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of pages visited beyond the seed
    #[arg(short, long)]
    pub fanout: Option<usize>,

    /// Keyword that must appear in a candidate's URL or link text (repeatable; any one matches)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// Keyword that must appear in a candidate's link text (repeatable; all must match)
    #[arg(long = "text-keyword")]
    pub text_keywords: Vec<String>,

    /// Document title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Output file (defaults to <host>_content.md)
    #[arg(short, long)]
    pub output: Option<String>,

    /// URL for the WebDriver instance (overrides WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Per-page fetch timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Apply only the rules from the configuration file
    #[arg(long)]
    pub no_builtin_rules: bool,

    /// Re-sanitize a saved markdown file instead of crawling
    #[arg(long, value_name = "FILE", conflicts_with = "seed")]
    pub clean: Option<PathBuf>,
}

impl Args {
    /// Rules and output settings for `--clean`; no seed is needed
    pub fn clean_config(&self) -> Result<DigestConfig> {
        let mut config = match &self.config {
            Some(path) => DigestConfig::from_file(path)?,
            None => DigestConfig::new(""),
        };
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if self.no_builtin_rules {
            config.use_builtin_rules = false;
        }
        Ok(config)
    }

    /// Merge the configuration file (if any) with the command-line overrides
    pub fn into_config(self) -> Result<DigestConfig> {
        let mut config = match (&self.config, &self.seed) {
            (Some(path), _) => DigestConfig::from_file(path)?,
            (None, Some(seed)) => DigestConfig::new(seed),
            (None, None) => {
                return Err(page_digest::DigestError::Config(
                    "a seed URL or a --config file is required".to_string(),
                ));
            }
        };

        if let Some(seed) = self.seed {
            config.seed_url = seed;
        }
        if let Some(fanout) = self.fanout {
            config.max_fanout = fanout;
        }
        if !self.keywords.is_empty() {
            config.topic.keywords = self.keywords;
        }
        if !self.text_keywords.is_empty() {
            config.topic.text_keywords = self.text_keywords;
        }
        if let Some(title) = self.title {
            config.title = Some(title);
        }
        if let Some(output) = self.output {
            config.output = Some(output);
        }
        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                config.webdriver_url = webdriver_url;
            }
        }
        if let Some(url) = self.webdriver_url.filter(|u| !u.is_empty()) {
            config.webdriver_url = url;
        }
        if let Some(secs) = self.timeout {
            config.fetch_timeout_secs = secs;
        }
        if self.no_builtin_rules {
            config.use_builtin_rules = false;
        }
        Ok(config)
    }
}
