use crate::config::DigestConfig;
use crate::crawlers::crawler::Fetcher;
use crate::error::FetchError;
use crate::parsers::Parser;
use crate::results::FetchedPage;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::timeout;
use url::Url;

/// Message WebDriver servers send when the browser session went away
const SESSION_LOST: &str = "Unable to find session";

/// Endpoints tried when the configured WebDriver URL does not answer
const FALLBACK_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Fetches pages through a WebDriver-controlled browser
///
/// The session is opened lazily on the first fetch and reused for every
/// following one. A lost session is reconnected once per fetch.
pub struct WebDriverFetcher {
    webdriver_url: String,
    fetch_timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: impl Into<String>, fetch_timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            fetch_timeout,
            client: Mutex::new(None),
        }
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        Self::new(config.webdriver_url.clone(), config.fetch_timeout())
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }
}

#[async_trait]
impl Fetcher for WebDriverFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut client_opt = self.client.lock().await;

        // Lazily initialize the WebDriver client if we don't have one yet
        if client_opt.is_none() {
            *client_opt = Some(connect_to_webdriver(&self.webdriver_url).await?);
        }

        let mut reconnected = false;
        loop {
            let Some(client) = client_opt.as_ref() else {
                return Err(FetchError::Connect("WebDriver session closed".to_string()));
            };

            match scrape(client, url, self.fetch_timeout).await {
                Err(e) if !reconnected && is_session_lost(&e) => {
                    ::log::warn!("Lost WebDriver session while fetching {}; reconnecting", url);
                    *client_opt = Some(attempt_reconnect(&self.webdriver_url).await?);
                    reconnected = true;
                }
                result => return result,
            }
        }
    }

    async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver client: {}", e);
            }
        }
    }
}

/// Connects to the WebDriver instance, falling back to common local endpoints
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, FetchError> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    for url in FALLBACK_URLS.iter().filter(|url| **url != webdriver_url) {
        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(FetchError::Connect(format!(
        "no WebDriver server answered at {webdriver_url} or any fallback"
    )))
}

/// Opens a fresh session on the configured WebDriver URL
async fn attempt_reconnect(webdriver_url: &str) -> Result<Client, FetchError> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::info!("Successfully reconnected to WebDriver");
            Ok(client)
        }
        Err(e) => {
            ::log::error!("Failed to reconnect to WebDriver: {}", e);
            Err(FetchError::Connect(e.to_string()))
        }
    }
}

fn is_session_lost(error: &FetchError) -> bool {
    matches!(error, FetchError::Navigation { message, .. } if message.contains(SESSION_LOST))
}

/// Loads `url`, bounded by `limit`, and parses its source
async fn scrape(client: &Client, url: &str, limit: Duration) -> Result<FetchedPage, FetchError> {
    let started = Instant::now();
    ::log::debug!("SCRAPE: {}", url);

    let page = timeout(limit, scrape_page(client, url))
        .await
        .map_err(|_| {
            ::log::error!("Timeout scraping: {}", url);
            FetchError::Timeout {
                url: url.to_string(),
                secs: limit.as_secs(),
            }
        })??;

    ::log::debug!(
        "Processed {} in {:.2} seconds",
        url,
        started.elapsed().as_secs_f64()
    );
    Ok(page)
}

async fn scrape_page(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    client
        .goto(url)
        .await
        .map_err(|e| handle_navigation_error(e, "access", url))?;

    let source = client
        .source()
        .await
        .map_err(|e| handle_navigation_error(e, "get source for", url))?;

    if source.trim().is_empty() {
        return Err(FetchError::Unsuccessful {
            url: url.to_string(),
            message: "browser returned an empty page source".to_string(),
        });
    }

    // Redirects change the base that relative links resolve against
    let base = match client.current_url().await {
        Ok(current) => current,
        Err(_) => Url::parse(url).map_err(|e| FetchError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?,
    };

    let parsed = Parser::parse_from_url(&source, &base);
    ::log::info!(
        "Found {} internal and {} external links in {}",
        parsed.links.internal.len(),
        parsed.links.external.len(),
        url
    );
    let mut fetched = parsed.into_fetched(source);
    if base.as_str() != url {
        ::log::debug!("{} redirected to {}", url, base);
        fetched.final_url = Some(base.to_string());
    }
    Ok(fetched)
}

/// Converts a WebDriver command error into a navigation failure
fn handle_navigation_error(
    error: fantoccini::error::CmdError,
    context: &str,
    url: &str,
) -> FetchError {
    let message = error.to_string();
    if message.contains(SESSION_LOST) {
        ::log::warn!("Lost session while trying to {} {}", context, url);
    } else {
        ::log::error!("Failed to {} {}: {}", context, url, message);
    }
    FetchError::Navigation {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_loss_detection() {
        let lost = FetchError::Navigation {
            url: "https://example.com".to_string(),
            message: "invalid session id: Unable to find session with ID abc".to_string(),
        };
        let other = FetchError::Navigation {
            url: "https://example.com".to_string(),
            message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        };
        let timeout = FetchError::Timeout {
            url: "https://example.com".to_string(),
            secs: 45,
        };

        assert!(is_session_lost(&lost));
        assert!(!is_session_lost(&other));
        assert!(!is_session_lost(&timeout));
    }

    #[test]
    fn test_from_config() {
        let mut config = DigestConfig::new("https://example.com/");
        config.webdriver_url = "http://localhost:9515".to_string();
        config.fetch_timeout_secs = 10;

        let fetcher = WebDriverFetcher::from_config(&config);
        assert_eq!(fetcher.webdriver_url(), "http://localhost:9515");
        assert_eq!(fetcher.fetch_timeout, Duration::from_secs(10));
    }
}
