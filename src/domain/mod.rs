pub mod course;
pub mod schedule;

pub use course::{CourseSections, CourseSummary, Section, Term};
pub use schedule::{ScheduleCourse, Sourced, Source, Weekday};
