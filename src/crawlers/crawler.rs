use crate::error::FetchError;
use crate::results::FetchedPage;
use async_trait::async_trait;

/// Retrieves one page for the crawl driver
///
/// Implementations own every I/O concern (sessions, retries, timeouts). The
/// driver calls `fetch` once per URL, sequentially, and treats any error as a
/// failure of that URL only.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return its extracted text, links and media
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Release any resources held by the fetcher
    async fn close(&self) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory fetcher serving canned pages and recording every request
    #[derive(Default)]
    pub struct StaticFetcher {
        pages: HashMap<String, Result<FetchedPage, FetchError>>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, page: FetchedPage) -> Self {
            self.pages.insert(url.to_string(), Ok(page));
            self
        }

        pub fn failing(mut self, url: &str, message: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                Err(FetchError::Unsuccessful {
                    url: url.to_string(),
                    message: message.to_string(),
                }),
            );
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().unwrap_or_else(|| {
                Err(FetchError::Navigation {
                    url: url.to_string(),
                    message: "404 Not Found".to_string(),
                })
            })
        }
    }
}
