//! Headless browser driving for the catalog's live search form.
//!
//! The search UI is rendered client-side, so section lookups go through a
//! real browser. Catalog logic only sees the narrow [`CatalogPage`] interface;
//! [`ChromeLauncher`] provides it with chromiumoxide.
//!
//! # Session discipline
//!
//! Each lookup launches its own browser through a [`BrowserLauncher`] and
//! must call [`BrowserSession::close`] on every exit path. Sessions are never
//! pooled or shared between lookups.
//!
//! ```rust,ignore
//! let mut session = launcher.launch().await?;
//! let result = run_search(session.page()).await;
//! session.close().await;
//! ```

mod chrome;
mod config;
pub mod script;

pub use chrome::ChromeLauncher;
pub use config::{BrowserConfig, LaunchEnvironment};

use crate::app::Result;
use async_trait::async_trait;

/// Operations the catalog flows need from a browser tab
#[async_trait]
pub trait CatalogPage: Send + Sync {
    /// Navigate and wait for the load to finish
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until an element matching `selector` exists, or time out
    async fn wait_for_selector(&self, selector: &str) -> Result<()>;

    /// Choose `value` in the `<select>` matching `selector`
    async fn select(&self, selector: &str, value: &str) -> Result<()>;

    /// Focus the input matching `selector` and type `text`
    async fn type_text(&self, selector: &str, text: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Evaluate a JavaScript expression and return its JSON value
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Serialized HTML of the current DOM
    async fn content(&self) -> Result<String>;
}

/// One live browser process with a single page
#[async_trait]
pub trait BrowserSession: Send + Sync {
    fn page(&self) -> &dyn CatalogPage;

    /// Terminate the browser process. Failures are logged, not returned.
    async fn close(&mut self);
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}
