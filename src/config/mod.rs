//! Configuration management for coursecache.
//!
//! Configuration is read from `~/.config/coursecache/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::browser::BrowserConfig;
use crate::cache::CacheConfig;
use crate::catalog::CatalogConfig;
use crate::fetcher::{BatchConfig, HttpConfig, RetryPolicy};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub http: HttpConfig,
    pub retry: RetryPolicy,
    pub batch: BatchConfig,
    pub browser: BrowserConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path()?)
    }

    /// Load configuration from `path`, creating the commented default there
    /// if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/coursecache/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("coursecache").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> &'static str {
        r##"# coursecache configuration
#
# Every key is optional; removed keys fall back to the values shown here.

[catalog]
base_url = "https://catalog.uconn.edu"
sitemap_path = "/course-descriptions/"
search_path = "/course-search/"

# Campus submitted with every section search
campus = "STORR"

# Terms whose label contains this text are never searched (case-insensitive)
excluded_term = "winter"

# Prefixes stripped from section fields
label_prefixes = ["Section Number:", "Section:", "Meets:", "Instructor:"]

[catalog.selectors]
# Static pages
subject_link = "#atozindex a"
course_block = ".courseblock"
course_code = ".detail-code"
course_title = ".detail-title"

# Search form
search_form = "#search-form"
term_select = "#crit-srcdb"
campus_select = "#crit-camp"
keyword_input = "#crit-keyword"
search_button = "#search-button"

# Result list (group_start_class is a class name, not a selector)
result_row = ".panel--kind-results .result"
group_start_class = "result--group-start"
result_code = ".result__code"
result_title = ".result__title"
section_number = ".result__flex--3"
section_meets = ".flex--grow"
section_instructor = ".result__flex--9"

# Detail panel
detail_panel = ".panel--kind-details"
detail_section = ".course-section"
detail_section_number = ".course-section-section"
section_location = ".panel--kind-details .meet"

[http]
# Per-request timeout for static catalog pages
timeout_secs = 10

[retry]
retries = 3
initial_delay_ms = 100
multiplier = 1.5

[batch]
# Subject pages fetched concurrently per batch
size = 62
delay_ms = 100

[browser]
headless = true

# "local" or "serverless"
environment = "local"

# Chrome/Chromium binary; searched on PATH when unset
# executable = "/opt/chromium/chrome"

# Navigation and element wait timeout
timeout_secs = 30
poll_interval_ms = 250

[cache]
courses_max_age_hours = 168
sections_max_age_hours = 24

# SQLite database; defaults to the user data directory
# database = "/var/lib/coursecache/cache.db"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
