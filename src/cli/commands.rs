use serde::Serialize;

use crate::app::{AppContext, CatalogError, Result};
use crate::domain::ScheduleCourse;
use crate::normalizer;
use crate::store::Store;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn list_courses(ctx: &AppContext, refresh: bool) -> Result<()> {
    let courses = ctx.service.courses(refresh).await?;
    tracing::info!("{} courses from {:?}", courses.data.len(), courses.source);
    print_json(&courses)
}

pub async fn show_sections(ctx: &AppContext, code: &str, refresh: bool) -> Result<()> {
    let sections = ctx.service.sections(code, refresh).await;
    print_json(&sections)
}

pub async fn show_location(ctx: &AppContext, code: &str, section: &str) -> Result<()> {
    let location = ctx.service.location(code, section).await;
    print_json(&location)
}

/// Build the schedule record for one section and store it.
pub async fn add_to_schedule(
    ctx: &AppContext,
    code: &str,
    section_number: &str,
    with_location: bool,
) -> Result<ScheduleCourse> {
    let code = code.trim();
    let section_number = section_number.trim();

    // Checked up front so a repeat add never launches a browser
    let id = ScheduleCourse::make_id(code, section_number);
    if ctx.store.get_schedule_course(&id)?.is_some() {
        return Err(CatalogError::DuplicateScheduleCourse(id));
    }

    let sections = ctx.service.sections(code, false).await.data;
    let section = sections
        .iter()
        .find_map(|course| course.find_section(section_number))
        .ok_or_else(|| CatalogError::SectionNotFound(id.clone()))?;

    let location = if with_location {
        ctx.service.location(code, section_number).await
    } else {
        None
    };

    let used = ctx.store.used_colors()?;
    let course = normalizer::to_schedule_course(code, section, &used, location);
    ctx.store.add_schedule_course(&course)?;

    Ok(course)
}

pub async fn schedule_add(
    ctx: &AppContext,
    code: &str,
    section_number: &str,
    with_location: bool,
) -> Result<()> {
    let course = add_to_schedule(ctx, code, section_number, with_location).await?;
    print_json(&course)
}

pub fn schedule_list(ctx: &AppContext) -> Result<()> {
    print_json(&ctx.store.list_schedule_courses()?)
}

pub fn schedule_remove(ctx: &AppContext, id: &str) -> Result<()> {
    if !ctx.store.remove_schedule_course(id)? {
        return Err(CatalogError::SectionNotFound(id.to_string()));
    }
    eprintln!("Removed {}", id);
    Ok(())
}
