use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::Result;

/// Where the catalog lives and how its pages are laid out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root of the catalog site; relative subject links resolve against it
    pub base_url: String,

    /// Page listing every subject (default: "/course-descriptions/")
    pub sitemap_path: String,

    /// Live class search UI (default: "/course-search/")
    pub search_path: String,

    /// Campus code submitted with every search
    pub campus: String,

    /// Terms whose label contains this text are never selected (case-insensitive)
    pub excluded_term: String,

    /// Prefixes stripped from section fields, e.g. "Section Number:"
    pub label_prefixes: Vec<String>,

    pub selectors: CatalogSelectors,
}

/// CSS selectors for the static listing pages and the live search UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSelectors {
    // Static pages
    pub subject_link: String,
    pub course_block: String,
    pub course_code: String,
    pub course_title: String,

    // Search form
    pub search_form: String,
    pub term_select: String,
    pub campus_select: String,
    pub keyword_input: String,
    pub search_button: String,

    // Result list
    pub result_row: String,
    /// Class (not selector) marking the first row of a course's group
    pub group_start_class: String,
    pub result_code: String,
    pub result_title: String,
    pub section_number: String,
    pub section_meets: String,
    pub section_instructor: String,

    // Detail panel
    pub detail_panel: String,
    pub detail_section: String,
    pub detail_section_number: String,
    pub section_location: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://catalog.uconn.edu".to_string(),
            sitemap_path: "/course-descriptions/".to_string(),
            search_path: "/course-search/".to_string(),
            campus: "STORR".to_string(),
            excluded_term: "winter".to_string(),
            label_prefixes: vec![
                "Section Number:".to_string(),
                "Section:".to_string(),
                "Meets:".to_string(),
                "Instructor:".to_string(),
            ],
            selectors: CatalogSelectors::default(),
        }
    }
}

impl Default for CatalogSelectors {
    fn default() -> Self {
        Self {
            subject_link: "#atozindex a".to_string(),
            course_block: ".courseblock".to_string(),
            course_code: ".detail-code".to_string(),
            course_title: ".detail-title".to_string(),

            search_form: "#search-form".to_string(),
            term_select: "#crit-srcdb".to_string(),
            campus_select: "#crit-camp".to_string(),
            keyword_input: "#crit-keyword".to_string(),
            search_button: "#search-button".to_string(),

            result_row: ".panel--kind-results .result".to_string(),
            group_start_class: "result--group-start".to_string(),
            result_code: ".result__code".to_string(),
            result_title: ".result__title".to_string(),
            section_number: ".result__flex--3".to_string(),
            section_meets: ".flex--grow".to_string(),
            section_instructor: ".result__flex--9".to_string(),

            detail_panel: ".panel--kind-details".to_string(),
            detail_section: ".course-section".to_string(),
            detail_section_number: ".course-section-section".to_string(),
            section_location: ".panel--kind-details .meet".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Resolve a possibly relative catalog link against `base_url`
    pub fn resolve(&self, href: &str) -> Result<String> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(href)?.to_string())
    }

    pub fn sitemap_url(&self) -> Result<String> {
        self.resolve(&self.sitemap_path)
    }

    pub fn search_url(&self) -> Result<String> {
        self.resolve(&self.search_path)
    }

    /// Remove the first matching label prefix and surrounding whitespace
    pub fn strip_label<'a>(&self, text: &'a str) -> &'a str {
        let text = text.trim();
        self.label_prefixes
            .iter()
            .find_map(|prefix| text.strip_prefix(prefix.as_str()))
            .map(str::trim)
            .unwrap_or(text)
    }
}
