pub mod sqlite;

use crate::app::Result;
use crate::cache::CacheStore;
use crate::domain::ScheduleCourse;

pub use sqlite::SqliteStore;

pub trait Store: CacheStore {
    // Personal schedule operations
    /// Fails with `DuplicateScheduleCourse` if the id is already present.
    fn add_schedule_course(&self, course: &ScheduleCourse) -> Result<()>;
    fn get_schedule_course(&self, id: &str) -> Result<Option<ScheduleCourse>>;
    fn list_schedule_courses(&self) -> Result<Vec<ScheduleCourse>>;
    fn remove_schedule_course(&self, id: &str) -> Result<bool>;
    fn used_colors(&self) -> Result<Vec<String>>;
}
