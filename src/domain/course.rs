use serde::{Deserialize, Serialize};

/// One course from a subject's catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub code: String,
    pub name: String,
}

impl CourseSummary {
    /// Build a summary from raw catalog text, stripping one trailing period
    /// from the code ("CSE 2050." becomes "CSE 2050").
    pub fn new(code: &str, name: &str) -> Self {
        let code = code.trim();
        let code = code.strip_suffix('.').unwrap_or(code);
        Self {
            code: code.trim_end().to_string(),
            name: name.trim().to_string(),
        }
    }
}

/// An option from the live search form's term dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub value: String,
    pub label: String,
}

impl Term {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Numeric ordering key; non-numeric values sort last.
    pub fn sort_key(&self) -> i64 {
        self.value.trim().parse().unwrap_or(-1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_number: String,
    pub meets: String,
    pub instructor: String,
}

impl Section {
    /// Placeholder rows in the result list carry no data at all.
    pub fn is_empty(&self) -> bool {
        self.section_number.is_empty() && self.meets.is_empty() && self.instructor.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSections {
    pub course_code: String,
    pub title: String,
    pub sections: Vec<Section>,
}

impl CourseSections {
    pub fn find_section(&self, section_number: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.section_number == section_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_summary_strips_trailing_period() {
        let course = CourseSummary::new("CSE 2050.", "Data Structures and Object-Oriented Design");
        assert_eq!(course.code, "CSE 2050");
        assert_eq!(course.name, "Data Structures and Object-Oriented Design");
    }

    #[test]
    fn test_course_summary_strips_only_one_period() {
        let course = CourseSummary::new("MATH 1131Q..", "Calculus I");
        assert_eq!(course.code, "MATH 1131Q.");
    }

    #[test]
    fn test_course_summary_without_period() {
        let course = CourseSummary::new("  PHYS 1601Q ", " Fundamentals of Physics I ");
        assert_eq!(course.code, "PHYS 1601Q");
        assert_eq!(course.name, "Fundamentals of Physics I");
    }

    #[test]
    fn test_term_sort_key() {
        assert_eq!(Term::new("1251", "Spring 2025").sort_key(), 1251);
        assert_eq!(Term::new("", "Select a term").sort_key(), -1);
        assert_eq!(Term::new("latest", "Latest").sort_key(), -1);
    }

    #[test]
    fn test_section_is_empty() {
        assert!(Section::default().is_empty());

        let section = Section {
            instructor: "Staff".into(),
            ..Default::default()
        };
        assert!(!section.is_empty());
    }

    #[test]
    fn test_section_serializes_camel_case() {
        let section = Section {
            section_number: "001".into(),
            meets: "MWF 10:00-10:50am".into(),
            instructor: "Smith".into(),
        };
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["sectionNumber"], "001");
        assert_eq!(json["meets"], "MWF 10:00-10:50am");
    }
}
