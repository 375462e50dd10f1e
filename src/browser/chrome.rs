use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::app::{CatalogError, Result};
use crate::browser::config::BrowserConfig;
use crate::browser::script;
use crate::browser::{BrowserLauncher, BrowserSession, CatalogPage};

/// Launches a fresh Chrome process per session using chromiumoxide
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn chrome_config(&self) -> Result<ChromeConfig> {
        let mut builder = ChromeConfig::builder().request_timeout(self.config.timeout());

        for arg in self.config.launch_args() {
            builder = builder.arg(arg);
        }

        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref executable) = self.config.executable {
            builder = builder.chrome_executable(executable);
        }

        builder
            .build()
            .map_err(|e| CatalogError::Browser(format!("Failed to build browser config: {}", e)))
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let (browser, mut handler) = Browser::launch(self.chrome_config()?)
            .await
            .map_err(|e| {
                CatalogError::Browser(format!(
                    "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                    e
                ))
            })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {:?}", e);
                }
            }
        });

        tracing::debug!("Browser launched ({:?})", self.config.environment);

        // From here on the session owns the process, so any early return
        // drops it and kills the browser
        let mut session = ChromeSession {
            browser,
            handler,
            page: None,
        };

        let page = session
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| CatalogError::Browser(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| CatalogError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        session.page = Some(ChromePage {
            page,
            config: self.config.clone(),
        });

        Ok(Box::new(session))
    }
}

struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<ChromePage>,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    fn page(&self) -> &dyn CatalogPage {
        match self.page {
            Some(ref page) => page,
            None => &DetachedPage,
        }
    }

    async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.page.close().await {
                tracing::debug!("Failed to close page: {}", e);
            }
        }

        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed to wait for browser exit: {}", e);
        }

        self.handler.abort();
        tracing::debug!("Browser closed");
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        // Browser's own Drop kills the child process if close() never ran
        self.handler.abort();
    }
}

struct ChromePage {
    page: Page,
    config: BrowserConfig,
}

impl ChromePage {
    async fn expect_true(&self, script: &str, what: &str) -> Result<()> {
        match self.evaluate(script).await? {
            serde_json::Value::Bool(true) => Ok(()),
            _ => Err(CatalogError::Selector(what.to_string())),
        }
    }
}

#[async_trait]
impl CatalogPage for ChromePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| CatalogError::Browser(format!("Navigation to {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<()> {
        let deadline = Instant::now() + self.config.timeout();

        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(CatalogError::Selector(format!(
                    "{} (waited {:?})",
                    selector,
                    self.config.timeout()
                )));
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    async fn select(&self, selector: &str, value: &str) -> Result<()> {
        self.expect_true(
            &script::select_option(selector, value),
            &format!("{} has no option {}", selector, value),
        )
        .await
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| CatalogError::Selector(selector.to_string()))?;

        element
            .click()
            .await
            .map_err(|e| CatalogError::Browser(format!("Failed to focus {}: {}", selector, e)))?;
        element
            .type_str(text)
            .await
            .map_err(|e| CatalogError::Browser(format!("Failed to type into {}: {}", selector, e)))?;

        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| CatalogError::Selector(selector.to_string()))?;

        element
            .click()
            .await
            .map_err(|e| CatalogError::Browser(format!("Failed to click {}: {}", selector, e)))?;

        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.page
            .evaluate(script.to_string())
            .await
            .map_err(|e| CatalogError::Browser(format!("Script execution failed: {}", e)))?
            .into_value()
            .map_err(|e| CatalogError::Browser(format!("Failed to parse result: {:?}", e)))
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| CatalogError::Browser(format!("Failed to read page content: {}", e)))
    }
}

/// Stand-in returned after the real page has been closed
struct DetachedPage;

#[async_trait]
impl CatalogPage for DetachedPage {
    async fn goto(&self, _url: &str) -> Result<()> {
        Err(detached())
    }

    async fn wait_for_selector(&self, _selector: &str) -> Result<()> {
        Err(detached())
    }

    async fn select(&self, _selector: &str, _value: &str) -> Result<()> {
        Err(detached())
    }

    async fn type_text(&self, _selector: &str, _text: &str) -> Result<()> {
        Err(detached())
    }

    async fn click(&self, _selector: &str) -> Result<()> {
        Err(detached())
    }

    async fn evaluate(&self, _script: &str) -> Result<serde_json::Value> {
        Err(detached())
    }

    async fn content(&self) -> Result<String> {
        Err(detached())
    }
}

fn detached() -> CatalogError {
    CatalogError::Browser("Page already closed".to_string())
}
