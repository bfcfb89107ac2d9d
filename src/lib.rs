pub mod client;
pub mod config;
pub mod error;
pub mod ics;
pub mod model;
pub mod output;
pub mod parsing;
pub mod translate;
pub mod week;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

pub use client::{Digi1, Session};
pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use model::{Calendar, CalendarEvent, LessonRecord, Timetable};

/// Reads the config through `lookup` and runs a full sync. Nothing touches the network
/// unless the config is complete.
pub async fn sync<F>(lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config::from_lookup(lookup)?;
    sync_with_config(&config, Utc::now()).await
}

/// Logs in, fetches this and next week's lessons as of `now`, and rewrites the
/// calendar file. The file is only touched once everything before it succeeded.
pub async fn sync_with_config(config: &Config, now: DateTime<Utc>) -> Result<PathBuf> {
    let client = Digi1::new(&config.base_url)?;

    info!("fetching timetable");
    let timetable = client.fetch_timetable(&config.credentials, now).await?;

    info!("converting to ICS");
    let calendar = translate::convert(&timetable)?;
    info!(events = calendar.len(), "converted timetable");

    info!("saving calendar");
    let path = output::save_calendar(config, &calendar)?;
    info!(path = %path.display(), "calendar saved");

    Ok(path)
}
