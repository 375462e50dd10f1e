pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "coursecache")]
#[command(about = "Scrape and cache a university course catalog", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/coursecache/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every course in the catalog
    Courses {
        /// Ignore the cached list and scrape the catalog again
        #[arg(long)]
        refresh: bool,
    },
    /// Show the sections of one course, e.g. "CSE 2050"
    Sections {
        code: String,

        /// Ignore cached sections and run a live search
        #[arg(long)]
        refresh: bool,
    },
    /// Look up the room of one section
    Location { code: String, section: String },
    /// Manage the personal schedule
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
}

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Add a section to the schedule
    Add {
        code: String,
        section: String,

        /// Also look up the room (launches a browser)
        #[arg(long)]
        location: bool,
    },
    /// List scheduled sections
    List,
    /// Remove a scheduled section by id, e.g. "CSE 2050-001"
    Remove { id: String },
}
