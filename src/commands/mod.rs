mod config_cmd;
mod goals;
mod meal;
mod summary;

pub use config_cmd::ConfigCommand;
pub use goals::GoalsCommand;
pub use meal::MealCommand;
pub use summary::SummaryCommand;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use clap::ValueEnum;
use uuid::Uuid;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses a YYYY-MM-DD date.
pub(crate) fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", date))
}

/// Parses a local date and time: "YYYY-MM-DD HH:MM", "YYYY-MM-DDTHH:MM" or RFC 3339.
pub(crate) fn parse_local_datetime(value: &str) -> Result<DateTime<Local>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Local));
    }

    let naive = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| {
            format!(
                "Invalid date/time '{}'. Use 'YYYY-MM-DD HH:MM' or RFC 3339.",
                value
            )
        })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("'{}' does not exist in the local time zone", value))
}

pub(crate) fn parse_id(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid meal ID: {}", id))
}

/// Renders a percentage as a fixed-width bar, e.g. "[#####     ]".
pub(crate) fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(width - filled))
}
