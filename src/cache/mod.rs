//! Cache-aside storage for scraped catalog data.
//!
//! Two namespaces share one key space: the global course list under
//! `courses` and per-course section results under `sections/{code}`.
//! Entries are overwritten on every successful live fetch and never deleted;
//! stale entries are ignored on read until the next write replaces them.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::{CourseSections, CourseSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Freshness window for the full course list (default: 168 hours)
    pub courses_max_age_hours: u64,

    /// Freshness window for a course's sections (default: 24 hours)
    pub sections_max_age_hours: u64,

    /// SQLite database path; defaults to the user data directory
    pub database: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            courses_max_age_hours: 168,
            sections_max_age_hours: 24,
            database: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Courses,
    Sections(String),
}

impl CacheKey {
    pub fn sections(course_code: &str) -> Self {
        CacheKey::Sections(course_code.to_string())
    }

    pub fn as_key(&self) -> String {
        match self {
            CacheKey::Courses => "courses".to_string(),
            CacheKey::Sections(code) => format!("sections/{}", code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub data: T,
    pub last_updated: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, last_updated: DateTime<Utc>) -> Self {
        Self { data, last_updated }
    }

    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.last_updated
    }

    /// An entry is fresh iff `now - last_updated < max_age`.
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age_hours: u64) -> bool {
        let max_age = i64::try_from(max_age_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .unwrap_or(TimeDelta::MAX);
        self.age(now) < max_age
    }
}

/// Key-value persistence for serialized cache entries.
pub trait CacheStore {
    fn read_entry(&self, key: &str) -> Result<Option<CacheEntry<String>>>;

    /// Unconditionally replace the entry stored under `key`.
    fn write_entry(&self, key: &str, entry: &CacheEntry<String>) -> Result<()>;
}

/// Typed view over a [`CacheStore`] with the staleness policy applied.
pub struct CourseCache<S> {
    store: Arc<S>,
}

impl<S> Clone for CourseCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: CacheStore> CourseCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn put<T: Serialize>(&self, key: &CacheKey, data: &T) -> Result<()> {
        self.put_at(key, data, Utc::now())
    }

    pub fn put_at<T: Serialize>(&self, key: &CacheKey, data: &T, now: DateTime<Utc>) -> Result<()> {
        let entry = CacheEntry::new(serde_json::to_string(data)?, now);
        self.store.write_entry(&key.as_key(), &entry)
    }

    /// Read a fresh entry. Absent, stale and unreadable entries are all misses.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey, max_age_hours: u64) -> Option<T> {
        self.get_at(key, max_age_hours, Utc::now())
    }

    pub fn get_at<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
        max_age_hours: u64,
        now: DateTime<Utc>,
    ) -> Option<T> {
        let key = key.as_key();
        let entry = match self.store.read_entry(&key) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                tracing::debug!("Cache miss for {}", key);
                return None;
            }
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        if !entry.is_fresh(now, max_age_hours) {
            tracing::debug!(
                "Cache entry for {} is stale ({}h old, max {}h)",
                key,
                entry.age(now).num_hours(),
                max_age_hours
            );
            return None;
        }

        match serde_json::from_str(&entry.data) {
            Ok(data) => {
                tracing::debug!("Cache hit for {}", key);
                Some(data)
            }
            Err(e) => {
                tracing::warn!("Cache entry for {} could not be decoded: {}", key, e);
                None
            }
        }
    }

    pub fn put_global_courses(&self, courses: &[CourseSummary]) -> Result<()> {
        self.put(&CacheKey::Courses, &courses)
    }

    pub fn get_global_courses(&self, max_age_hours: u64) -> Option<Vec<CourseSummary>> {
        self.get(&CacheKey::Courses, max_age_hours)
    }

    pub fn put_sections(&self, course_code: &str, sections: &[CourseSections]) -> Result<()> {
        self.put(&CacheKey::sections(course_code), &sections)
    }

    pub fn get_sections(&self, course_code: &str, max_age_hours: u64) -> Option<Vec<CourseSections>> {
        self.get(&CacheKey::sections(course_code), max_age_hours)
    }
}
