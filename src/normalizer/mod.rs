//! Converts scraped section strings into schedule records.
//!
//! Meets strings look like `"MWF10:00-10:50am"`, `"TTh 2:00-3:15pm"`,
//! `"11:00am-12:15pm"`, `"TBA"` or `"Does Not Meet"`. Everything here is pure.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{ScheduleCourse, Section, Weekday};

/// Schedule colors, assigned in order.
pub const PALETTE: [&str; 10] = [
    "#4F46E5", "#059669", "#DC2626", "#D97706", "#7C3AED", "#0891B2", "#DB2777", "#65A30D",
    "#EA580C", "#2563EB",
];

const TWO_LETTER_DAYS: [(&str, Weekday); 2] = [("Th", Weekday::Thu), ("Su", Weekday::Sun)];

static TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*([ap])?\.?m?\.?\s*-\s*(\d{1,2})(?::(\d{2}))?\s*([ap])?\.?m?")
        .expect("time range pattern is valid")
});

static MERIDIEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)[ap]\.?m\.?").expect("meridiem pattern is valid"));

fn single_letter_day(c: char) -> Option<Weekday> {
    match c {
        'M' => Some(Weekday::Mon),
        'T' => Some(Weekday::Tue),
        'W' => Some(Weekday::Wed),
        'F' => Some(Weekday::Fri),
        'S' => Some(Weekday::Sat),
        _ => None,
    }
}

/// Extract meeting days, scanning left to right.
///
/// Two-letter codes win over their single-letter prefix, so `"TTh"` is
/// Tuesday and Thursday rather than two Tuesdays.
pub fn parse_days(meets: &str) -> Vec<Weekday> {
    let mut days = Vec::new();
    let mut rest = meets;

    while let Some(c) = rest.chars().next() {
        // "AM"/"PM" would otherwise read as Monday
        if let Some(m) = MERIDIEM.find(rest) {
            rest = &rest[m.end()..];
            continue;
        }

        if let Some((token, day)) = TWO_LETTER_DAYS.iter().find(|(t, _)| rest.starts_with(t)) {
            days.push(*day);
            rest = &rest[token.len()..];
            continue;
        }

        if let Some(day) = single_letter_day(c) {
            days.push(day);
        }
        rest = &rest[c.len_utf8()..];
    }

    days
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start_time: String,
    pub end_time: String,
}

impl TimeRange {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_empty() && self.end_time.is_empty()
    }
}

fn to_minutes(hour: u32, minute: u32, pm: bool) -> u32 {
    let hour = match (hour % 12, pm) {
        (h, true) => h + 12,
        (h, false) => h,
    };
    hour * 60 + minute
}

fn format_minutes(total: u32) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Extract the start and end times as zero-padded 24-hour `"HH:MM"`.
///
/// At least one meridiem is required. A side without one takes the other's,
/// unless that would put the start after the end: `"11:00-12:15pm"` starts
/// in the morning and `"11:00am-12:15"` ends in the afternoon.
/// Returns an empty range when the string carries no time.
pub fn parse_time(meets: &str) -> TimeRange {
    let Some(caps) = TIME_RANGE.captures(meets) else {
        return TimeRange::default();
    };

    let number = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };
    let is_pm = |i: usize| caps.get(i).map(|m| m.as_str().eq_ignore_ascii_case("p"));

    let (start_hour, start_minute) = (number(1), number(2));
    let (end_hour, end_minute) = (number(4), number(5));
    if start_hour > 12 || end_hour > 12 || start_minute > 59 || end_minute > 59 {
        return TimeRange::default();
    }

    let (start, end) = match (is_pm(3), is_pm(6)) {
        (None, None) => return TimeRange::default(),
        (Some(start_pm), Some(end_pm)) => (
            to_minutes(start_hour, start_minute, start_pm),
            to_minutes(end_hour, end_minute, end_pm),
        ),
        (None, Some(end_pm)) => {
            let end = to_minutes(end_hour, end_minute, end_pm);
            let mut start = to_minutes(start_hour, start_minute, end_pm);
            if end_pm && start > end {
                start = to_minutes(start_hour, start_minute, false);
            }
            (start, end)
        }
        (Some(start_pm), None) => {
            let start = to_minutes(start_hour, start_minute, start_pm);
            let mut end = to_minutes(end_hour, end_minute, start_pm);
            if !start_pm && end < start {
                end = to_minutes(end_hour, end_minute, true);
            }
            (start, end)
        }
    };

    TimeRange {
        start_time: format_minutes(start),
        end_time: format_minutes(end),
    }
}

/// First palette color not in `used`; cycles once the palette is exhausted.
pub fn next_color<S: AsRef<str>>(used: &[S]) -> &'static str {
    PALETTE
        .iter()
        .find(|color| !used.iter().any(|u| u.as_ref().eq_ignore_ascii_case(color)))
        .copied()
        .unwrap_or(PALETTE[used.len() % PALETTE.len()])
}

/// Build a schedule record for `section` of `course_code`.
pub fn to_schedule_course<S: AsRef<str>>(
    course_code: &str,
    section: &Section,
    used_colors: &[S],
    location: Option<String>,
) -> ScheduleCourse {
    let times = parse_time(&section.meets);
    // Unscheduled sections ("TBA") get no days, even if the text has capitals
    let days = if times.is_empty() {
        Vec::new()
    } else {
        parse_days(&section.meets)
    };

    let instructor = Some(section.instructor.trim())
        .filter(|s| !s.is_empty())
        .map(String::from);

    ScheduleCourse {
        id: ScheduleCourse::make_id(course_code, &section.section_number),
        name: course_code.to_string(),
        section: section.section_number.clone(),
        days,
        start_time: times.start_time,
        end_time: times.end_time,
        color: next_color(used_colors).to_string(),
        instructor,
        location,
    }
}
