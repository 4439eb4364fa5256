//! Output formatting shared by all commands.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Render a value either as a table (from per-row projections) or as
/// pretty JSON of the domain value itself.
pub fn render<T, R>(
    format: OutputFormat,
    value: &T,
    rows: impl FnOnce(&T) -> Vec<R>,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows = rows(value);
            if rows.is_empty() {
                return Ok("(no entries)".to_owned());
            }
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            Ok(table.to_string())
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
    }
}

/// Print rendered output to stdout.
pub fn print(out: &str) {
    println!("{out}");
}

/// Print a status note to stderr unless quiet.
pub fn note(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}
