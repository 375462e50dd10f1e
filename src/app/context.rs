use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{CatalogError, Result};
use crate::browser::{BrowserLauncher, ChromeLauncher};
use crate::cache::CourseCache;
use crate::catalog::CatalogScraper;
use crate::config::Config;
use crate::fetcher::{BatchScheduler, Fetcher, HttpFetcher};
use crate::service::{CatalogService, CatalogSource};
use crate::store::SqliteStore;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub service: CatalogService<SqliteStore>,
}

impl AppContext {
    /// Open the configured database (or the default one) and wire the live
    /// scraper behind the cache.
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match config.cache.database {
            Some(ref p) => p.clone(),
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let source = Self::live_source(&config)?;
        Ok(Self::with_source(config, store, source))
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let source = Self::live_source(&config)?;
        Ok(Self::with_source(config, store, source))
    }

    pub fn with_source(
        config: Config,
        store: Arc<SqliteStore>,
        source: Arc<dyn CatalogSource>,
    ) -> Self {
        let cache = CourseCache::new(store.clone());
        let service = CatalogService::new(source, cache, config.cache.clone());

        Self {
            config,
            store,
            service,
        }
    }

    fn live_source(config: &Config) -> Result<Arc<dyn CatalogSource>> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.http)?);
        let launcher: Arc<dyn BrowserLauncher> =
            Arc::new(ChromeLauncher::new(config.browser.clone()));

        Ok(Arc::new(CatalogScraper::new(
            fetcher,
            launcher,
            config.catalog.clone(),
            config.retry.clone(),
            BatchScheduler::new(config.batch.clone()),
        )))
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| CatalogError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("coursecache");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("coursecache.db"))
    }
}
