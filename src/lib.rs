//! # coursecache
//!
//! Scrapes a CourseLeaf-style university course catalog and caches the
//! results in SQLite.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Catalog extractors ─┐
//! Browser → Search parser ──────┴→ Cache ← Service → CLI
//!                                     Normalizer → Schedule store
//! ```
//!
//! - [`fetcher`]: HTTP client, retry with backoff, batch scheduling
//! - [`catalog`]: subject, course, term and section extraction
//! - [`browser`]: headless Chrome driving for the live search form
//! - [`cache`]: timestamped entries with a freshness window
//! - [`service`]: cache-aside access returning where data came from
//!
//! ## Quick Start
//!
//! ```bash
//! # All courses (cached for a week)
//! coursecache courses
//!
//! # Sections of one course, searched live when the cache is stale
//! coursecache sections "CSE 2050"
//!
//! # Build a personal schedule
//! coursecache schedule add "CSE 2050" 001
//! coursecache schedule list
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires the store, the live scraper and the
/// cache-aside service together.
pub mod app;

/// Headless browser access.
///
/// - [`CatalogPage`](browser::CatalogPage): the page operations the search flow needs
/// - [`ChromeLauncher`](browser::ChromeLauncher): chromiumoxide implementation
pub mod browser;

/// Cache entries, freshness and the typed [`CourseCache`](cache::CourseCache).
pub mod cache;

/// Catalog scraping: static listing pages and the live class search.
pub mod catalog;

/// Command-line interface using clap.
///
/// - `courses [--refresh]`
/// - `sections <code> [--refresh]`
/// - `location <code> <section>`
/// - `schedule add|list|remove`
pub mod cli;

/// Configuration loaded from `~/.config/coursecache/config.toml`.
pub mod config;

/// Core domain models.
pub mod domain;

/// Static page fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for page fetching
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`retry`](fetcher::retry()): exponential backoff
/// - [`BatchScheduler`](fetcher::BatchScheduler): bounded concurrent batches
pub mod fetcher;

/// Meets-string parsing and schedule record construction.
pub mod normalizer;

pub mod service;

/// SQLite persistence for the cache and the personal schedule.
///
/// - [`Store`](store::Store): schedule operations on top of [`CacheStore`](cache::CacheStore)
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
