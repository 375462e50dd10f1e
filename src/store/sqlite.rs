use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{CatalogError, Result};
use crate::cache::{CacheEntry, CacheStore};
use crate::domain::{ScheduleCourse, Weekday};
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;

        migrations
            .to_latest(&mut conn)
            .map_err(|_| CatalogError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            CatalogError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn encode_days(days: &[Weekday]) -> String {
        days.iter()
            .map(Weekday::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn decode_days(s: &str) -> Vec<Weekday> {
        s.split(',').filter_map(Weekday::parse).collect()
    }

    fn schedule_course_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduleCourse> {
        Ok(ScheduleCourse {
            id: row.get(0)?,
            name: row.get(1)?,
            section: row.get(2)?,
            days: Self::decode_days(&row.get::<_, String>(3)?),
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            color: row.get(6)?,
            instructor: row.get(7)?,
            location: row.get(8)?,
        })
    }
}

impl CacheStore for SqliteStore {
    fn read_entry(&self, key: &str) -> Result<Option<CacheEntry<String>>> {
        let conn = self.lock()?;

        let row = conn
            .query_row(
                "SELECT data, last_updated FROM cache_entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        Ok(row.and_then(|(data, last_updated)| {
            // An unparseable timestamp makes the entry unusable, same as absent
            Self::parse_datetime(&last_updated).map(|at| CacheEntry::new(data, at))
        }))
    }

    fn write_entry(&self, key: &str, entry: &CacheEntry<String>) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO cache_entries (key, data, last_updated) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data, last_updated = excluded.last_updated",
            params![key, entry.data, entry.last_updated.to_rfc3339()],
        )?;

        Ok(())
    }
}

impl Store for SqliteStore {
    fn add_schedule_course(&self, course: &ScheduleCourse) -> Result<()> {
        let conn = self.lock()?;

        let result = conn.execute(
            "INSERT INTO schedule_courses
             (id, name, section, days, start_time, end_time, color, instructor, location, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                course.id,
                course.name,
                course.section,
                Self::encode_days(&course.days),
                course.start_time,
                course.end_time,
                course.color,
                course.instructor,
                course.location,
                Utc::now().to_rfc3339()
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(CatalogError::DuplicateScheduleCourse(course.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_schedule_course(&self, id: &str) -> Result<Option<ScheduleCourse>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT id, name, section, days, start_time, end_time, color, instructor, location
                 FROM schedule_courses WHERE id = ?1",
                params![id],
                Self::schedule_course_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn list_schedule_courses(&self) -> Result<Vec<ScheduleCourse>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, section, days, start_time, end_time, color, instructor, location
             FROM schedule_courses ORDER BY added_at, id",
        )?;

        let courses = stmt
            .query_map([], Self::schedule_course_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(courses)
    }

    fn remove_schedule_course(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM schedule_courses WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn used_colors(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT DISTINCT color FROM schedule_courses")?;
        let colors = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn course(id: &str, color: &str) -> ScheduleCourse {
        ScheduleCourse {
            id: id.into(),
            name: "CSE 2050".into(),
            section: "001".into(),
            days: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
            start_time: "10:00".into(),
            end_time: "10:50".into(),
            color: color.into(),
            instructor: Some("Smith".into()),
            location: None,
        }
    }

    #[test]
    fn test_cache_entry_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        let at = Utc::now();
        store
            .write_entry("courses", &CacheEntry::new("[]".into(), at))
            .unwrap();

        let entry = store.read_entry("courses").unwrap().unwrap();
        assert_eq!(entry.data, "[]");
        assert_eq!(entry.last_updated, at);
    }

    #[test]
    fn test_cache_entry_overwrite() {
        let store = SqliteStore::in_memory().unwrap();
        let old = Utc::now() - TimeDelta::hours(30);
        store
            .write_entry("sections/CSE 2050", &CacheEntry::new("old".into(), old))
            .unwrap();

        let new = Utc::now();
        store
            .write_entry("sections/CSE 2050", &CacheEntry::new("new".into(), new))
            .unwrap();

        let entry = store.read_entry("sections/CSE 2050").unwrap().unwrap();
        assert_eq!(entry.data, "new");
        assert_eq!(entry.last_updated, new);
    }

    #[test]
    fn test_read_missing_entry() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.read_entry("sections/NOPE 0000").unwrap().is_none());
    }

    #[test]
    fn test_add_and_get_schedule_course() {
        let store = SqliteStore::in_memory().unwrap();
        let c = course("CSE 2050-001", "#4F46E5");
        store.add_schedule_course(&c).unwrap();

        let retrieved = store.get_schedule_course("CSE 2050-001").unwrap().unwrap();
        assert_eq!(retrieved, c);
    }

    #[test]
    fn test_duplicate_schedule_course_fails() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .add_schedule_course(&course("CSE 2050-001", "#4F46E5"))
            .unwrap();

        let err = store
            .add_schedule_course(&course("CSE 2050-001", "#059669"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateScheduleCourse(id) if id == "CSE 2050-001"));

        // Original row untouched
        let retrieved = store.get_schedule_course("CSE 2050-001").unwrap().unwrap();
        assert_eq!(retrieved.color, "#4F46E5");
    }

    #[test]
    fn test_unscheduled_course_keeps_empty_days() {
        let store = SqliteStore::in_memory().unwrap();
        let mut c = course("CSE 4939W-001", "#DC2626");
        c.days = Vec::new();
        c.start_time = String::new();
        c.end_time = String::new();
        store.add_schedule_course(&c).unwrap();

        let retrieved = store.get_schedule_course("CSE 4939W-001").unwrap().unwrap();
        assert!(retrieved.days.is_empty());
        assert!(!retrieved.is_scheduled());
    }

    #[test]
    fn test_list_remove_and_used_colors() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .add_schedule_course(&course("CSE 2050-001", "#4F46E5"))
            .unwrap();
        store
            .add_schedule_course(&course("CSE 2100-002", "#059669"))
            .unwrap();

        assert_eq!(store.list_schedule_courses().unwrap().len(), 2);

        let mut colors = store.used_colors().unwrap();
        colors.sort();
        assert_eq!(colors, vec!["#059669", "#4F46E5"]);

        assert!(store.remove_schedule_course("CSE 2050-001").unwrap());
        assert!(!store.remove_schedule_course("CSE 2050-001").unwrap());
        assert_eq!(store.used_colors().unwrap(), vec!["#059669"]);
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coursecache.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store
                .write_entry("courses", &CacheEntry::new("[]".into(), Utc::now()))
                .unwrap();
        }

        let reopened = SqliteStore::new(&path).unwrap();
        assert!(reopened.read_entry("courses").unwrap().is_some());
    }
}
