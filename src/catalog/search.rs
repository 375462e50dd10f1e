//! Parsing for the live class search: the term dropdown, the grouped result
//! list and the section detail panel.

use scraper::{CaseSensitivity, Html, Selector};

use crate::app::{CatalogError, Result};
use crate::catalog::config::CatalogConfig;
use crate::catalog::{element_text, selector};
use crate::domain::{CourseSections, Section, Term};

/// Options of the term dropdown, in document order.
pub fn parse_terms(html: &str, config: &CatalogConfig) -> Result<Vec<Term>> {
    let document = Html::parse_document(html);
    let option_sel = selector(&format!("{} option", config.selectors.term_select))?;

    let terms = document
        .select(&option_sel)
        .map(|option| {
            let value = option.value().attr("value").unwrap_or("").trim();
            Term::new(value, element_text(option))
        })
        .collect();

    Ok(terms)
}

/// Pick the most recent term whose label does not mention `excluded`.
///
/// Ties keep the earliest option.
pub fn select_term<'a>(terms: &'a [Term], excluded: &str) -> Option<&'a Term> {
    let excluded = excluded.to_lowercase();

    terms
        .iter()
        .filter(|t| excluded.is_empty() || !t.label.to_lowercase().contains(&excluded))
        .fold(None, |best: Option<&Term>, t| match best {
            Some(b) if b.sort_key() >= t.sort_key() => Some(b),
            _ => Some(t),
        })
}

/// One row of the rendered result list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRow {
    pub group_start: bool,
    pub code: String,
    pub title: String,
    pub section: Section,
}

/// Read every result row with its fields, label prefixes removed.
pub fn parse_result_rows(html: &str, config: &CatalogConfig) -> Result<Vec<ResultRow>> {
    let selectors = &config.selectors;
    let document = Html::parse_document(html);
    let row_sel = selector(&selectors.result_row)?;
    let code_sel = selector(&selectors.result_code)?;
    let title_sel = selector(&selectors.result_title)?;
    let number_sel = selector(&selectors.section_number)?;
    let meets_sel = selector(&selectors.section_meets)?;
    let instructor_sel = selector(&selectors.section_instructor)?;

    let rows = document
        .select(&row_sel)
        .map(|row| {
            let field = |sel: &Selector| {
                row.select(sel)
                    .next()
                    .map(element_text)
                    .map(|text| config.strip_label(&text).to_string())
                    .unwrap_or_default()
            };

            ResultRow {
                group_start: row
                    .value()
                    .has_class(&selectors.group_start_class, CaseSensitivity::CaseSensitive),
                code: field(&code_sel),
                title: field(&title_sel),
                section: Section {
                    section_number: field(&number_sel),
                    meets: field(&meets_sel),
                    instructor: field(&instructor_sel),
                },
            }
        })
        .collect();

    Ok(rows)
}

/// Group rows into the sections of `course_code`.
///
/// A group starts at a group-start row whose code equals `course_code` and
/// runs, including that row, up to the next group-start row. Rows with no
/// section data are dropped. A code heading two groups on one page is an
/// error, since its sections would otherwise be counted twice.
pub fn group_sections(rows: &[ResultRow], course_code: &str) -> Result<Vec<CourseSections>> {
    let course_code = course_code.trim();
    let mut courses = Vec::new();

    for (start, row) in rows.iter().enumerate() {
        if !row.group_start || row.code.trim() != course_code {
            continue;
        }
        if !courses.is_empty() {
            return Err(CatalogError::DuplicateGroup(course_code.to_string()));
        }

        let sections = std::iter::once(row)
            .chain(rows[start + 1..].iter().take_while(|r| !r.group_start))
            .map(|r| r.section.clone())
            .filter(|s| !s.is_empty())
            .collect();

        courses.push(CourseSections {
            course_code: course_code.to_string(),
            title: row.title.clone(),
            sections,
        });
    }

    Ok(courses)
}

/// Parse the rendered result list for `course_code`.
pub fn parse_course_sections(
    html: &str,
    course_code: &str,
    config: &CatalogConfig,
) -> Result<Vec<CourseSections>> {
    let rows = parse_result_rows(html, config)?;
    group_sections(&rows, course_code)
}

/// Room text of the opened section, without its leading "in ".
pub fn parse_location(html: &str, config: &CatalogConfig) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let location_sel = selector(&config.selectors.section_location)?;

    let location = document
        .select(&location_sel)
        .map(element_text)
        .find(|text| !text.is_empty())
        .map(|text| match text.strip_prefix("in ") {
            Some(room) => room.trim().to_string(),
            None => text,
        })
        .filter(|room| !room.is_empty());

    Ok(location)
}
