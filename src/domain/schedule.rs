use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
            Weekday::Sun => "SUN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MON" => Some(Weekday::Mon),
            "TUE" => Some(Weekday::Tue),
            "WED" => Some(Weekday::Wed),
            "THU" => Some(Weekday::Thu),
            "FRI" => Some(Weekday::Fri),
            "SAT" => Some(Weekday::Sat),
            "SUN" => Some(Weekday::Sun),
            _ => None,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A section placed on a personal schedule.
///
/// `id` is `"{course_code}-{section_number}"` and is unique per schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCourse {
    pub id: String,
    pub name: String,
    pub section: String,
    pub days: Vec<Weekday>,
    /// `"HH:MM"` in 24-hour time, empty when unscheduled.
    pub start_time: String,
    pub end_time: String,
    pub color: String,
    pub instructor: Option<String>,
    pub location: Option<String>,
}

impl ScheduleCourse {
    pub fn make_id(course_code: &str, section_number: &str) -> String {
        format!("{}-{}", course_code, section_number)
    }

    pub fn is_scheduled(&self) -> bool {
        !self.start_time.is_empty() && !self.end_time.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Live,
}

/// Data tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub source: Source,
    pub data: T,
}

impl<T> Sourced<T> {
    pub fn cache(data: T) -> Self {
        Self {
            source: Source::Cache,
            data,
        }
    }

    pub fn live(data: T) -> Self {
        Self {
            source: Source::Live,
            data,
        }
    }
}
