use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Element not found: {0}")]
    Selector(String),

    #[error("No subjects found in catalog sitemap")]
    NoSubjects,

    #[error("No term found in search form")]
    NoTerm,

    #[error("Course {0} appears in more than one result group")]
    DuplicateGroup(String),

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Course already in schedule: {0}")]
    DuplicateScheduleCourse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
