pub mod crawler;
pub mod driver;
pub mod web;

pub use crawler::Fetcher;
pub use driver::{CrawlOutcome, crawl};
pub use web::WebDriverFetcher;
