//! Command dispatch: bridges CLI args -> tracker operations -> output.

pub mod feed;
pub mod refresh;
pub mod show;
pub mod suggestions;
pub mod watch;

use allertrack_core::Tracker;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(cmd: Command, tracker: &Tracker, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Show => show::handle(tracker, global).await,
        Command::Refresh => refresh::handle(tracker, global).await,
        Command::Feed => feed::handle(tracker, global).await,
        Command::Watch => watch::handle(tracker, global).await,
        Command::Suggestions => suggestions::handle(tracker, global).await,
    }
}
