//! `feed` -- print the historical feed log.

use chrono::Utc;
use tabled::Tabled;

use allertrack_core::timefmt;
use allertrack_core::{FeedEntry, Tracker};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct FeedRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Foods")]
    foods: String,
}

impl From<&FeedEntry> for FeedRow {
    fn from(e: &FeedEntry) -> Self {
        Self {
            when: timefmt::format_relative(e.timestamp, Utc::now()),
            time: e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            foods: e.foods.join(", "),
        }
    }
}

pub async fn handle(tracker: &Tracker, global: &GlobalOpts) -> Result<(), CliError> {
    let entries = tracker.feed_log().await?;

    let out = output::render(global.output, &entries, |entries| {
        entries.iter().map(FeedRow::from).collect()
    })?;
    output::print(&out);
    Ok(())
}
