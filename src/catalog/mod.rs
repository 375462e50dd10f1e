//! Catalog scraping.
//!
//! Static pages (the subject sitemap and one page per subject) are fetched
//! over plain HTTP. Sections only exist in the client-rendered search UI, so
//! those lookups drive a browser and parse the rendered DOM.
//!
//! # Architecture
//!
//! ```text
//! sitemap → subject URLs → (batched) course lists       → Vec<CourseSummary>
//! search form → term → submit → grouped result rows     → Vec<CourseSections>
//!                             → detail panel → section  → location
//! ```

mod config;
mod listing;
mod search;

pub use config::{CatalogConfig, CatalogSelectors};
pub use listing::{parse_course_list, parse_subject_links};
pub use search::{
    group_sections, parse_course_sections, parse_location, parse_result_rows, parse_terms,
    select_term, ResultRow,
};

use std::sync::Arc;

use scraper::{ElementRef, Selector};

use crate::app::{CatalogError, Result};
use crate::browser::{script, BrowserLauncher, CatalogPage};
use crate::domain::{CourseSections, CourseSummary};
use crate::fetcher::{retry, BatchScheduler, Fetcher, RetryPolicy};

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CatalogError::Selector(format!("invalid selector {}: {}", css, e)))
}

/// Text content with whitespace runs (including `&nbsp;`) collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Entry points for scraping the catalog
pub struct CatalogScraper {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    launcher: Arc<dyn BrowserLauncher>,
    config: CatalogConfig,
    retry: RetryPolicy,
    scheduler: BatchScheduler,
}

impl CatalogScraper {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        launcher: Arc<dyn BrowserLauncher>,
        config: CatalogConfig,
        retry: RetryPolicy,
        scheduler: BatchScheduler,
    ) -> Self {
        Self {
            fetcher,
            launcher,
            config,
            retry,
            scheduler,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        retry(&self.retry, || self.fetcher.fetch(url)).await
    }

    /// Subject page links from the sitemap; empty on failure.
    pub async fn fetch_subject_urls(&self) -> Vec<String> {
        let result: Result<Vec<String>> = async {
            let url = self.config.sitemap_url()?;
            let html = self.fetch_page(&url).await?;
            parse_subject_links(&html, &self.config.selectors)
        }
        .await;

        match result {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Failed to fetch subject list: {}", e);
                Vec::new()
            }
        }
    }

    /// Courses listed on one subject page; empty on failure.
    pub async fn fetch_subject_courses(&self, subject: &str) -> Vec<CourseSummary> {
        let result: Result<Vec<CourseSummary>> = async {
            let url = self.config.resolve(subject)?;
            let html = self.fetch_page(&url).await?;
            parse_course_list(&html, &self.config.selectors)
        }
        .await;

        match result {
            Ok(courses) => {
                tracing::debug!("{}: {} courses", subject, courses.len());
                courses
            }
            Err(e) => {
                tracing::warn!("Failed to fetch courses for {}: {}", subject, e);
                Vec::new()
            }
        }
    }

    /// Every course in the catalog, subject pages fetched in batches.
    ///
    /// Fails only when the sitemap yields no subjects; individual subject
    /// failures leave their courses out.
    pub async fn scrape_all_courses(&self) -> Result<Vec<CourseSummary>> {
        let subjects = self.fetch_subject_urls().await;
        if subjects.is_empty() {
            return Err(CatalogError::NoSubjects);
        }

        tracing::info!(
            "Scraping {} subjects in {} batches",
            subjects.len(),
            self.scheduler.batch_count(subjects.len())
        );

        let courses = self
            .scheduler
            .run(&subjects, |subject| {
                let subject = subject.clone();
                async move { self.fetch_subject_courses(&subject).await }
            })
            .await;

        tracing::info!("Scraped {} courses", courses.len());
        Ok(courses)
    }

    /// Sections of `course_code` in the most recent non-excluded term.
    ///
    /// Errors are logged and reported as no sections.
    pub async fn fetch_course_sections(&self, course_code: &str) -> Vec<CourseSections> {
        match self.search_sections(course_code).await {
            Ok(courses) => courses,
            Err(e) => {
                tracing::error!("Failed to fetch sections for {}: {}", course_code, e);
                Vec::new()
            }
        }
    }

    /// Like [`fetch_course_sections`](Self::fetch_course_sections) but
    /// returns the failure, including [`CatalogError::NoTerm`].
    pub async fn search_sections(&self, course_code: &str) -> Result<Vec<CourseSections>> {
        let mut session = self.launcher.launch().await?;

        let result: Result<Vec<CourseSections>> = async {
            let page = session.page();
            self.submit_search(page, course_code).await?;
            let html = page.content().await?;
            parse_course_sections(&html, course_code, &self.config)
        }
        .await;

        session.close().await;
        result
    }

    /// Room of one section, read from the search detail panel.
    pub async fn fetch_section_location(
        &self,
        course_code: &str,
        section_number: &str,
    ) -> Option<String> {
        let result: Result<Option<String>> = async {
            let mut session = self.launcher.launch().await?;
            let result = self
                .open_section_detail(session.page(), course_code, section_number)
                .await;
            session.close().await;
            result
        }
        .await;

        match result {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch location for {} section {}: {}",
                    course_code,
                    section_number,
                    e
                );
                None
            }
        }
    }

    async fn open_section_detail(
        &self,
        page: &dyn CatalogPage,
        course_code: &str,
        section_number: &str,
    ) -> Result<Option<String>> {
        let selectors = &self.config.selectors;
        self.submit_search(page, course_code).await?;

        let group_row = format!("{}.{}", selectors.result_row, selectors.group_start_class);
        click_script(
            page,
            &script::click_where_text(&group_row, &selectors.result_code, course_code),
            course_code,
        )
        .await?;
        page.wait_for_selector(&selectors.detail_panel).await?;

        click_script(
            page,
            &script::click_where_text(
                &selectors.detail_section,
                &selectors.detail_section_number,
                section_number,
            ),
            section_number,
        )
        .await?;
        page.wait_for_selector(&selectors.section_location).await?;

        parse_location(&page.content().await?, &self.config)
    }

    /// Open the search UI, pick the term and submit `course_code`.
    ///
    /// Returns once result rows from this submission are rendered.
    async fn submit_search(&self, page: &dyn CatalogPage, course_code: &str) -> Result<()> {
        let selectors = &self.config.selectors;

        page.goto(&self.config.search_url()?).await?;
        // The term dropdown is filled in by script after the form appears
        page.wait_for_selector(&selectors.search_form).await?;
        page.wait_for_selector(&selectors.term_select).await?;

        let terms = parse_terms(&page.content().await?, &self.config)?;
        let term = select_term(&terms, &self.config.excluded_term).ok_or(CatalogError::NoTerm)?;
        tracing::debug!("Searching {} in term {} ({})", course_code, term.value, term.label);

        page.select(&selectors.term_select, &term.value).await?;
        page.select(&selectors.campus_select, &self.config.campus).await?;
        page.type_text(&selectors.keyword_input, course_code).await?;

        page.evaluate(&script::remove_matching(&selectors.result_row)).await?;
        page.click(&selectors.search_button).await?;
        page.wait_for_selector(&selectors.result_row).await
    }
}

async fn click_script(page: &dyn CatalogPage, script: &str, target: &str) -> Result<()> {
    match page.evaluate(script).await? {
        serde_json::Value::Bool(true) => Ok(()),
        _ => Err(CatalogError::Selector(format!("no row for {}", target))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserSession;
    use crate::fetcher::BatchConfig;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const BASE: &str = "https://catalog.uconn.edu";

    struct FakeFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(path, html)| (format!("{}{}", BASE, path), html.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| {
                    CatalogError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, url.to_string()))
                })
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Stage {
        Blank,
        Form,
        Results,
        Detail,
    }

    #[derive(Default)]
    struct Counters {
        launches: AtomicUsize,
        closes: AtomicUsize,
    }

    struct FakeSite {
        form: String,
        results: String,
        detail: String,
        fail_launch: bool,
    }

    struct FakeLauncher {
        site: Arc<FakeSite>,
        counters: Arc<Counters>,
    }

    struct FakeSession {
        page: FakePage,
        counters: Arc<Counters>,
    }

    struct FakePage {
        site: Arc<FakeSite>,
        stage: Mutex<Stage>,
        typed: Mutex<Vec<String>>,
    }

    impl FakePage {
        fn stage(&self) -> Stage {
            *self.stage.lock().unwrap()
        }

        fn set_stage(&self, stage: Stage) {
            *self.stage.lock().unwrap() = stage;
        }

        fn html(&self) -> String {
            match self.stage() {
                Stage::Blank => String::new(),
                Stage::Form => self.site.form.clone(),
                Stage::Results => self.site.results.clone(),
                Stage::Detail => self.site.detail.clone(),
            }
        }
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
            if self.site.fail_launch {
                return Err(CatalogError::Browser("no chrome".into()));
            }
            self.counters.launches.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeSession {
                page: FakePage {
                    site: self.site.clone(),
                    stage: Mutex::new(Stage::Blank),
                    typed: Mutex::new(Vec::new()),
                },
                counters: self.counters.clone(),
            }))
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        fn page(&self) -> &dyn CatalogPage {
            &self.page
        }

        async fn close(&mut self) {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CatalogPage for FakePage {
        async fn goto(&self, url: &str) -> Result<()> {
            assert_eq!(url, format!("{}/course-search/", BASE));
            self.set_stage(Stage::Form);
            Ok(())
        }

        async fn wait_for_selector(&self, css: &str) -> Result<()> {
            let document = scraper::Html::parse_document(&self.html());
            if document.select(&selector(css)?).next().is_some() {
                Ok(())
            } else {
                Err(CatalogError::Selector(css.to_string()))
            }
        }

        async fn select(&self, _selector: &str, _value: &str) -> Result<()> {
            Ok(())
        }

        async fn type_text(&self, _selector: &str, text: &str) -> Result<()> {
            self.typed.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn click(&self, css: &str) -> Result<()> {
            if css == "#search-button" && self.stage() == Stage::Form {
                self.set_stage(Stage::Results);
            }
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
            if !script.contains("target.click()") {
                return Ok(serde_json::Value::Bool(true));
            }
            // Clicking a result opens the detail panel only if the row exists
            let found = match self.stage() {
                Stage::Results => {
                    let found = self.site.results.contains("CSE 2050");
                    if found {
                        self.set_stage(Stage::Detail);
                    }
                    found
                }
                Stage::Detail => true,
                _ => false,
            };
            Ok(serde_json::Value::Bool(found))
        }

        async fn content(&self) -> Result<String> {
            Ok(self.html())
        }
    }

    const SITEMAP: &str = r##"
<div id="atozindex">
  <a href="#A">A</a>
  <a href="/course-descriptions/acct/">ACCT</a>
  <a href="/course-descriptions/cse/">CSE</a>
  <a href="/course-descriptions/gone/">GONE</a>
</div>"##;

    const ACCT: &str = r#"
<div class="courseblock"><span class="detail-code">ACCT&#160;2001.</span><span class="detail-title">Principles of Financial Accounting</span></div>"#;

    const CSE: &str = r#"
<div class="courseblock"><span class="detail-code">CSE&#160;1010.</span><span class="detail-title">Introduction to Computing for Engineers</span></div>
<div class="courseblock"><span class="detail-code">CSE&#160;2050.</span><span class="detail-title">Data Structures and Object-Oriented Design</span></div>"#;

    const FORM: &str = r#"
<form id="search-form">
  <select id="crit-srcdb">
    <option value="1249">Winter 2025</option>
    <option value="1251">Spring 2025</option>
    <option value="1248">Fall 2024</option>
  </select>
</form>"#;

    const WINTER_ONLY_FORM: &str = r#"
<form id="search-form">
  <select id="crit-srcdb"><option value="1249">Winter 2025</option></select>
</form>"#;

    const RESULTS: &str = r#"
<div class="panel--kind-results">
  <div class="result result--group-start"><span class="result__code">CSE 2050</span><span class="result__title">Data Structures</span></div>
  <div class="result"><span class="result__flex--3">Section Number: 001</span><span class="flex--grow">Meets: MWF 10:10-11:00am</span><span class="result__flex--9">Instructor: Smith</span></div>
  <div class="result"><span class="result__flex--3">Section Number: 002</span><span class="flex--grow">Meets: TTh 2:00-3:15pm</span><span class="result__flex--9">Instructor: Lee</span></div>
  <div class="result result--group-start"><span class="result__code">CSE 2050W</span><span class="result__title">Data Structures Writing</span></div>
  <div class="result"><span class="result__flex--3">Section Number: 001</span><span class="flex--grow">Meets: F 1:00-2:00pm</span><span class="result__flex--9">Instructor: Doe</span></div>
</div>"#;

    const DUPLICATE_RESULTS: &str = r#"
<div class="panel--kind-results">
  <div class="result result--group-start"><span class="result__code">CSE 2050</span><span class="result__title">Data Structures</span></div>
  <div class="result"><span class="result__flex--3">001</span></div>
  <div class="result result--group-start"><span class="result__code">CSE 2050</span><span class="result__title">Data Structures</span></div>
  <div class="result"><span class="result__flex--3">002</span></div>
</div>"#;

    const DETAIL: &str = r#"
<div class="panel--kind-details">
  <div class="course-section"><span class="course-section-section">001</span></div>
  <div class="meet">in ITE C80</div>
</div>"#;

    fn site(form: &str, results: &str) -> FakeSite {
        FakeSite {
            form: form.into(),
            results: results.into(),
            detail: DETAIL.into(),
            fail_launch: false,
        }
    }

    fn scraper_with(fetcher: FakeFetcher, site: FakeSite) -> (CatalogScraper, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let launcher = FakeLauncher {
            site: Arc::new(site),
            counters: counters.clone(),
        };
        let scraper = CatalogScraper::new(
            Arc::new(fetcher),
            Arc::new(launcher),
            CatalogConfig::default(),
            RetryPolicy {
                retries: 0,
                ..Default::default()
            },
            BatchScheduler::new(BatchConfig {
                size: 2,
                delay_ms: 0,
            }),
        );
        (scraper, counters)
    }

    fn full_fetcher() -> FakeFetcher {
        FakeFetcher::new(&[
            ("/course-descriptions/", SITEMAP),
            ("/course-descriptions/acct/", ACCT),
            ("/course-descriptions/cse/", CSE),
        ])
    }

    #[tokio::test]
    async fn test_scrape_all_courses_isolates_subject_failures() {
        let (scraper, _) = scraper_with(full_fetcher(), site(FORM, RESULTS));

        let courses = scraper.scrape_all_courses().await.unwrap();
        let codes: Vec<_> = courses.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["ACCT 2001", "CSE 1010", "CSE 2050"]);
    }

    #[tokio::test]
    async fn test_scrape_all_courses_without_subjects() {
        let fetcher = FakeFetcher::new(&[("/course-descriptions/", "<html></html>")]);
        let (scraper, _) = scraper_with(fetcher, site(FORM, RESULTS));
        assert!(matches!(
            scraper.scrape_all_courses().await,
            Err(CatalogError::NoSubjects)
        ));

        // Unreachable sitemap is reported the same way
        let (scraper, _) = scraper_with(FakeFetcher::new(&[]), site(FORM, RESULTS));
        assert!(matches!(
            scraper.scrape_all_courses().await,
            Err(CatalogError::NoSubjects)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_page_retries() {
        let fetcher = Arc::new(FakeFetcher::new(&[]));
        let counters = Arc::new(Counters::default());
        let scraper = CatalogScraper::new(
            fetcher.clone(),
            Arc::new(FakeLauncher {
                site: Arc::new(site(FORM, RESULTS)),
                counters,
            }),
            CatalogConfig::default(),
            RetryPolicy::default(),
            BatchScheduler::new(BatchConfig::default()),
        );

        assert!(scraper.fetch_subject_urls().await.is_empty());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_fetch_course_sections() {
        let (scraper, counters) = scraper_with(full_fetcher(), site(FORM, RESULTS));

        let courses = scraper.fetch_course_sections("CSE 2050").await;
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "Data Structures");
        assert_eq!(courses[0].sections.len(), 2);
        assert_eq!(courses[0].sections[1].instructor, "Lee");

        assert_eq!(counters.launches.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_term_closes_browser() {
        let (scraper, counters) = scraper_with(full_fetcher(), site(WINTER_ONLY_FORM, RESULTS));

        assert!(matches!(
            scraper.search_sections("CSE 2050").await,
            Err(CatalogError::NoTerm)
        ));
        assert!(scraper.fetch_course_sections("CSE 2050").await.is_empty());

        assert_eq!(counters.launches.load(Ordering::SeqCst), 2);
        assert_eq!(counters.closes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_results_closes_browser() {
        let (scraper, counters) = scraper_with(full_fetcher(), site(FORM, "<div></div>"));

        assert!(scraper.fetch_course_sections("CSE 2050").await.is_empty());
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_duplicate_group_yields_no_sections() {
        let (scraper, counters) = scraper_with(full_fetcher(), site(FORM, DUPLICATE_RESULTS));

        assert!(matches!(
            scraper.search_sections("CSE 2050").await,
            Err(CatalogError::DuplicateGroup(_))
        ));
        assert!(scraper.fetch_course_sections("CSE 2050").await.is_empty());
        assert_eq!(counters.closes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_launch_failure_yields_no_sections() {
        let mut failing = site(FORM, RESULTS);
        failing.fail_launch = true;
        let (scraper, counters) = scraper_with(full_fetcher(), failing);

        assert!(scraper.fetch_course_sections("CSE 2050").await.is_empty());
        assert_eq!(scraper.fetch_section_location("CSE 2050", "001").await, None);
        assert_eq!(counters.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_section_location() {
        let (scraper, counters) = scraper_with(full_fetcher(), site(FORM, RESULTS));

        let location = scraper.fetch_section_location("CSE 2050", "001").await;
        assert_eq!(location.as_deref(), Some("ITE C80"));
        assert_eq!(counters.launches.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_section_location_unknown_course() {
        let results = RESULTS.replace("CSE 2050", "MATH 1131");
        let (scraper, counters) = scraper_with(full_fetcher(), site(FORM, &results));

        assert_eq!(scraper.fetch_section_location("CSE 2050", "001").await, None);
        assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = scraper::Html::parse_fragment("<p> CSE&#160;2050\n  <b>Data</b>   Structures </p>");
        let p = selector("p").unwrap();
        let el = html.select(&p).next().unwrap();
        assert_eq!(element_text(el), "CSE 2050 Data Structures");
    }
}
