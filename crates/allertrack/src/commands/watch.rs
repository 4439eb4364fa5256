//! `watch` -- follow live updates until interrupted.

use chrono::Utc;
use owo_colors::OwoColorize;
use tokio::signal;

use allertrack_core::timefmt;
use allertrack_core::{ExposureSnapshot, LinkState, Tracker};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::show::snapshot_rows;

pub async fn handle(tracker: &Tracker, global: &GlobalOpts) -> Result<(), CliError> {
    let mut snapshots = tracker.snapshot();
    let mut links = tracker.link_state();

    tracker.start().await;

    // Show whatever the initial fetch produced before following changes.
    let initial = snapshots.borrow_and_update().clone();
    if let Some(snapshot) = initial {
        print_snapshot(&snapshot, global)?;
    }
    output::note("Watching for live updates (ctrl-c to stop)", global.quiet);

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            changed = links.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *links.borrow_and_update();
                print_link_state(state, global.quiet);
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    print_snapshot(&snapshot, global)?;
                }
            }
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &ExposureSnapshot, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render(global.output, snapshot, snapshot_rows)?;
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

fn print_link_state(state: LinkState, quiet: bool) {
    if quiet {
        return;
    }
    let label = match state {
        LinkState::Connecting => "connecting".yellow().to_string(),
        LinkState::Connected => "connected".green().to_string(),
        LinkState::Disconnected => "disconnected".red().to_string(),
    };
    eprintln!("[link] {label}");
}
