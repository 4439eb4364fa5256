//! `show` -- print the current allergen exposure snapshot.

use chrono::Utc;
use tabled::Tabled;

use allertrack_core::timefmt;
use allertrack_core::{AllergenExposure, ExposureAge, ExposureSnapshot, Tracker};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ────────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct ExposureRow {
    #[tabled(rename = "Allergen")]
    name: String,
    #[tabled(rename = "Days since")]
    days: String,
    #[tabled(rename = "Last exposure")]
    last_exposure: String,
    #[tabled(rename = "Foods")]
    foods: String,
}

impl From<&AllergenExposure> for ExposureRow {
    fn from(a: &AllergenExposure) -> Self {
        let (days, last_exposure) = match a.age {
            ExposureAge::Known {
                days,
                last_exposure,
            } => (days.to_string(), timefmt::short_date(last_exposure)),
            ExposureAge::Unknown => ("-".into(), "never".into()),
        };
        Self {
            name: a.name.clone(),
            days,
            last_exposure,
            foods: a.foods.join(", "),
        }
    }
}

pub(super) fn snapshot_rows(snapshot: &ExposureSnapshot) -> Vec<ExposureRow> {
    snapshot.allergens.iter().map(ExposureRow::from).collect()
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(tracker: &Tracker, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = tracker.fetch_once().await?;

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
