//! `refresh` -- trigger a server-side recompute, then show the result.

use chrono::Utc;

use allertrack_core::Tracker;
use allertrack_core::timefmt;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::show::snapshot_rows;

pub async fn handle(tracker: &Tracker, global: &GlobalOpts) -> Result<(), CliError> {
    output::note("Recomputing...", global.quiet);
    let snapshot = tracker.refresh().await?;

    let out = output::render(global.output, snapshot.as_ref(), snapshot_rows)?;
    output::print(&out);
    output::note(
        &format!(
            "Computed {}",
            timefmt::format_relative(snapshot.computed_at, Utc::now())
        ),
        global.quiet,
    );
    Ok(())
}
