use scraper::Html;

use crate::app::Result;
use crate::catalog::config::CatalogSelectors;
use crate::catalog::{element_text, selector};
use crate::domain::CourseSummary;

/// Subject page links from the catalog sitemap, in document order.
///
/// In-page anchors (`#A`, `#B`, ...) are dropped.
pub fn parse_subject_links(html: &str, selectors: &CatalogSelectors) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let link_sel = selector(&selectors.subject_link)?;

    let links = document
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .map(String::from)
        .collect();

    Ok(links)
}

/// Course summaries from one subject page. Blocks lacking a code or a
/// title are skipped.
pub fn parse_course_list(html: &str, selectors: &CatalogSelectors) -> Result<Vec<CourseSummary>> {
    let document = Html::parse_document(html);
    let block_sel = selector(&selectors.course_block)?;
    let code_sel = selector(&selectors.course_code)?;
    let title_sel = selector(&selectors.course_title)?;

    let courses = document
        .select(&block_sel)
        .filter_map(|block| {
            let code = block.select(&code_sel).next().map(element_text)?;
            let title = block.select(&title_sel).next().map(element_text)?;
            if code.is_empty() || title.is_empty() {
                return None;
            }
            Some(CourseSummary::new(&code, &title))
        })
        .collect();

    Ok(courses)
}
