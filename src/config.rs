use crate::error::Result;
use crate::filter::TopicFilterConfig;
use crate::frontier::DEFAULT_MAX_FANOUT;
use crate::sanitizer::RuleSpec;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for one digest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// URL to start from
    pub seed_url: String,

    /// Maximum number of candidate pages visited beyond the seed
    #[serde(default = "default_max_fanout")]
    pub max_fanout: usize,

    /// Which same-host links count as candidates
    #[serde(default)]
    pub topic: TopicFilterConfig,

    /// Whether the built-in boilerplate rules are applied
    #[serde(default = "default_use_builtin_rules")]
    pub use_builtin_rules: bool,

    /// Extra rules, applied after the built-in rules of their category
    #[serde(default)]
    pub rules: Vec<RuleSpec>,

    /// Report title; defaults to one derived from the seed host
    #[serde(default)]
    pub title: Option<String>,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Upper bound for a single page fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Where to write the document; defaults to a name derived from the seed host
    #[serde(default)]
    pub output: Option<String>,
}

/// Default value for max_fanout
fn default_max_fanout() -> usize {
    DEFAULT_MAX_FANOUT
}

fn default_use_builtin_rules() -> bool {
    true
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    45
}

impl DigestConfig {
    /// Create a new configuration with default values
    pub fn new(seed_url: &str) -> Self {
        Self {
            seed_url: seed_url.to_string(),
            max_fanout: default_max_fanout(),
            topic: TopicFilterConfig::default(),
            use_builtin_rules: default_use_builtin_rules(),
            rules: Vec::new(),
            title: None,
            webdriver_url: default_webdriver_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            output: None,
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
