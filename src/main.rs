use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coursecache::app::AppContext;
use coursecache::cli::{commands, Cli, Commands, ScheduleAction};
use coursecache::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Courses { refresh } => {
            commands::list_courses(&ctx, refresh).await?;
        }
        Commands::Sections { code, refresh } => {
            commands::show_sections(&ctx, &code, refresh).await?;
        }
        Commands::Location { code, section } => {
            commands::show_location(&ctx, &code, &section).await?;
        }
        Commands::Schedule { action } => match action {
            ScheduleAction::Add {
                code,
                section,
                location,
            } => {
                commands::schedule_add(&ctx, &code, &section, location).await?;
            }
            ScheduleAction::List => {
                commands::schedule_list(&ctx)?;
            }
            ScheduleAction::Remove { id } => {
                commands::schedule_remove(&ctx, &id)?;
            }
        },
    }

    Ok(())
}
