pub mod batch;
pub mod http_fetcher;
pub mod retry;

use async_trait::async_trait;

use crate::app::Result;

pub use batch::{BatchConfig, BatchScheduler};
pub use http_fetcher::{HttpConfig, HttpFetcher};
pub use retry::{retry, RetryPolicy};

/// Fetches static catalog pages.
#[async_trait]
pub trait Fetcher {
    /// GET `url` and return the response body as text.
    async fn fetch(&self, url: &str) -> Result<String>;
}
