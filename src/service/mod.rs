//! Cache-aside access to the catalog.
//!
//! Reads go to the cache first; a miss (absent, stale or unreadable entry)
//! falls through to a live scrape whose result is written back. Write-back
//! failures are logged and never fail the request.

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::Result;
use crate::cache::{CacheConfig, CacheStore, CourseCache};
use crate::catalog::CatalogScraper;
use crate::domain::{CourseSections, CourseSummary, Sourced};

/// Live catalog data behind the cache
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn scrape_all_courses(&self) -> Result<Vec<CourseSummary>>;
    async fn fetch_course_sections(&self, course_code: &str) -> Vec<CourseSections>;
    async fn fetch_section_location(&self, course_code: &str, section_number: &str)
        -> Option<String>;
}

#[async_trait]
impl CatalogSource for CatalogScraper {
    async fn scrape_all_courses(&self) -> Result<Vec<CourseSummary>> {
        CatalogScraper::scrape_all_courses(self).await
    }

    async fn fetch_course_sections(&self, course_code: &str) -> Vec<CourseSections> {
        CatalogScraper::fetch_course_sections(self, course_code).await
    }

    async fn fetch_section_location(
        &self,
        course_code: &str,
        section_number: &str,
    ) -> Option<String> {
        CatalogScraper::fetch_section_location(self, course_code, section_number).await
    }
}

pub struct CatalogService<S> {
    source: Arc<dyn CatalogSource>,
    cache: CourseCache<S>,
    config: CacheConfig,
}

impl<S: CacheStore> CatalogService<S> {
    pub fn new(source: Arc<dyn CatalogSource>, cache: CourseCache<S>, config: CacheConfig) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    /// The full course list. `refresh` skips the cache read.
    pub async fn courses(&self, refresh: bool) -> Result<Sourced<Vec<CourseSummary>>> {
        if !refresh {
            if let Some(courses) = self
                .cache
                .get_global_courses(self.config.courses_max_age_hours)
            {
                return Ok(Sourced::cache(courses));
            }
        }

        let courses = self.source.scrape_all_courses().await?;
        if let Err(e) = self.cache.put_global_courses(&courses) {
            tracing::warn!("Failed to cache course list: {}", e);
        }

        Ok(Sourced::live(courses))
    }

    /// Sections of one course. Empty live results are cached too.
    pub async fn sections(&self, course_code: &str, refresh: bool) -> Sourced<Vec<CourseSections>> {
        let course_code = course_code.trim();

        if !refresh {
            if let Some(sections) = self
                .cache
                .get_sections(course_code, self.config.sections_max_age_hours)
            {
                return Sourced::cache(sections);
            }
        }

        let sections = self.source.fetch_course_sections(course_code).await;
        if let Err(e) = self.cache.put_sections(course_code, &sections) {
            tracing::warn!("Failed to cache sections for {}: {}", course_code, e);
        }

        Sourced::live(sections)
    }

    /// Room of one section; always live.
    pub async fn location(&self, course_code: &str, section_number: &str) -> Option<String> {
        self.source
            .fetch_section_location(course_code.trim(), section_number.trim())
            .await
    }
}
